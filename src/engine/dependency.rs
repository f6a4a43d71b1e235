//! Dependency scopes and the filters applied when a resolution walks the
//! direct dependencies of a descriptor.

use crate::maven::pom::PomDependency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Compile,
    Provided,
    Runtime,
    Test,
    System,
}

impl Scope {
    /// An absent or unknown scope element means `compile`.
    pub fn parse(raw: Option<&str>) -> Scope {
        match raw {
            Some("provided") => Scope::Provided,
            Some("runtime") => Scope::Runtime,
            Some("test") => Scope::Test,
            Some("system") => Scope::System,
            _ => Scope::Compile,
        }
    }
}

pub trait DependencyFilter: Send + Sync {
    fn accept(&self, dependency: &PomDependency, depth: usize) -> bool;
}

/// Accepts only the direct dependencies of the root descriptor.
pub struct ExcludeTransitiveFilter;

impl DependencyFilter for ExcludeTransitiveFilter {
    fn accept(&self, _dependency: &PomDependency, depth: usize) -> bool {
        depth == 0
    }
}

/// Accepts the dependencies visible on a given classpath, matching the
/// scope-inclusion rules of a Maven build.
pub struct ClasspathScopeFilter {
    classpath: Scope,
}

impl ClasspathScopeFilter {
    pub fn new(classpath: Scope) -> ClasspathScopeFilter {
        ClasspathScopeFilter { classpath }
    }

    fn includes(&self, scope: Scope) -> bool {
        match self.classpath {
            Scope::Compile => matches!(scope, Scope::Compile | Scope::Provided | Scope::System),
            Scope::Runtime => matches!(scope, Scope::Compile | Scope::Runtime),
            Scope::Test => true,
            // provided/system are not classpaths of their own; treat them
            // like compile
            Scope::Provided | Scope::System => {
                matches!(scope, Scope::Compile | Scope::Provided | Scope::System)
            }
        }
    }
}

impl DependencyFilter for ClasspathScopeFilter {
    fn accept(&self, dependency: &PomDependency, _depth: usize) -> bool {
        if dependency.optional == Some(true) {
            return false;
        }
        self.includes(Scope::parse(dependency.scope.as_deref()))
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    fn dependency(scope: Option<&str>, optional: Option<bool>) -> PomDependency {
        PomDependency {
            group_id: "org.example".to_string(),
            artifact_id: "dep".to_string(),
            version: Some("1.0".to_string()),
            scope: scope.map(str::to_string),
            classifier: None,
            dependency_type: None,
            optional,
        }
    }

    #[rstest]
    #[case::absent(None, Scope::Compile)]
    #[case::explicit(Some("runtime"), Scope::Runtime)]
    #[case::unknown(Some("import"), Scope::Compile)]
    fn test_scope_parse(#[case] raw: Option<&str>, #[case] expected: Scope) {
        assert_eq!(Scope::parse(raw), expected);
    }

    #[test]
    fn test_exclude_transitive() {
        let filter = ExcludeTransitiveFilter;
        assert!(filter.accept(&dependency(None, None), 0));
        assert!(!filter.accept(&dependency(None, None), 1));
    }

    #[rstest]
    #[case::compile_sees_compile(Scope::Compile, None, true)]
    #[case::compile_sees_provided(Scope::Compile, Some("provided"), true)]
    #[case::compile_skips_test(Scope::Compile, Some("test"), false)]
    #[case::compile_skips_runtime(Scope::Compile, Some("runtime"), false)]
    #[case::runtime_sees_runtime(Scope::Runtime, Some("runtime"), true)]
    #[case::runtime_skips_provided(Scope::Runtime, Some("provided"), false)]
    #[case::test_sees_everything(Scope::Test, Some("test"), true)]
    fn test_classpath_scope_filter(
        #[case] classpath: Scope,
        #[case] scope: Option<&str>,
        #[case] accepted: bool,
    ) {
        let filter = ClasspathScopeFilter::new(classpath);
        assert_eq!(filter.accept(&dependency(scope, None), 0), accepted);
    }

    #[test]
    fn test_optional_dependencies_are_skipped() {
        let filter = ClasspathScopeFilter::new(Scope::Test);
        assert!(!filter.accept(&dependency(None, Some(true)), 0));
    }
}
