pub mod coordinates;
pub mod metadata_xml;
pub mod paths;
pub mod pom;
pub mod version;

pub use coordinates::{Artifact, DEFAULT_EXTENSION};
pub use version::VersionFilter;
