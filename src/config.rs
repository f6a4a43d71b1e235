pub mod migration;
pub mod repository;

pub use repository::{
    ChecksumPolicy, Repository, RepositoryConfiguration, RepositoryType, UpdatePolicy,
    DEFAULT_REPOSITORY_ID,
};
