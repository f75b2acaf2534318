use crate::errors::{EvalError, Result};
use crate::logic::ThreeValuedLogic;
use crate::options::CfgOptions;
use crate::predicate::CfgPredicate;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use tracing::debug;

/// Where the evaluated code lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageOrigin {
    Stdlib,
    #[serde(alias = "stdlib-dependency")]
    StdlibDependency,
    Dependency,
    #[default]
    Workspace,
}

impl FromStr for PackageOrigin {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stdlib" => Ok(PackageOrigin::Stdlib),
            "stdlib_dependency" | "stdlib-dependency" => Ok(PackageOrigin::StdlibDependency),
            "dependency" => Ok(PackageOrigin::Dependency),
            "workspace" => Ok(PackageOrigin::Workspace),
            other => Err(EvalError::Config(format!("unknown package origin `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureState {
    Enabled,
    Disabled,
}

/// Project-wide lookup: does a package negate `test` anywhere
/// (`cfg(not(test))` and friends)?
///
/// `None` means the package is not indexed.
pub trait TestNegationIndex {
    fn has_negated_test(&self, package: &str) -> Option<bool>;
}

/// Index that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndex;

impl TestNegationIndex for NoIndex {
    fn has_negated_test(&self, _package: &str) -> Option<bool> {
        None
    }
}

/// In-memory index, filled from package predicates or explicit marks.
#[derive(Debug, Clone, Default)]
pub struct StaticTestIndex {
    indexed: BTreeSet<String>,
    negating: BTreeSet<String>,
}

impl StaticTestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `package` as indexed without any negated `test`.
    pub fn mark_clean(&mut self, package: impl Into<String>) {
        self.indexed.insert(package.into());
    }

    pub fn mark_negating(&mut self, package: impl Into<String>) {
        let package = package.into();
        self.indexed.insert(package.clone());
        self.negating.insert(package);
    }

    /// Indexes one predicate found in `package`.
    pub fn record(&mut self, package: &str, predicate: &CfgPredicate) {
        if predicate.contains_negated_test() {
            self.mark_negating(package);
        } else {
            self.mark_clean(package);
        }
    }
}

impl TestNegationIndex for StaticTestIndex {
    fn has_negated_test(&self, package: &str) -> Option<bool> {
        self.indexed
            .contains(package)
            .then(|| self.negating.contains(package))
    }
}

/// The value `cfg(test)` takes for a whole compilation unit.
///
/// Dependencies are assumed to be built in test mode only when nothing in
/// them negates `test`; unindexed dependencies are treated as negating.
/// Workspace packages are not modelled and stay unknown.
pub fn pinned_test_value(
    origin: PackageOrigin,
    package: Option<&str>,
    index: &dyn TestNegationIndex,
) -> ThreeValuedLogic {
    match origin {
        PackageOrigin::Stdlib | PackageOrigin::StdlibDependency => ThreeValuedLogic::False,
        PackageOrigin::Dependency => {
            let negated = package
                .and_then(|name| index.has_negated_test(name))
                .unwrap_or(true);
            ThreeValuedLogic::from_bool(!negated)
        }
        PackageOrigin::Workspace => ThreeValuedLogic::Unknown,
    }
}

/// Immutable evaluation context of one compilation unit.
#[derive(Debug, Clone)]
pub struct Context {
    options: CfgOptions,
    features: BTreeMap<String, FeatureState>,
    origin: PackageOrigin,
    treat_unknown_as_false: bool,
    test_value: ThreeValuedLogic,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn options(&self) -> &CfgOptions {
        &self.options
    }

    pub fn feature(&self, name: &str) -> Option<FeatureState> {
        self.features.get(name).copied()
    }

    pub fn origin(&self) -> PackageOrigin {
        self.origin
    }

    pub fn treat_unknown_as_false(&self) -> bool {
        self.treat_unknown_as_false
    }

    pub fn test_value(&self) -> ThreeValuedLogic {
        self.test_value
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::builder().build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    options: CfgOptions,
    features: BTreeMap<String, FeatureState>,
    origin: PackageOrigin,
    package: Option<String>,
    treat_unknown_as_false: bool,
}

impl ContextBuilder {
    pub fn options(mut self, options: CfgOptions) -> Self {
        self.options = options;
        self
    }

    pub fn features(mut self, features: BTreeMap<String, FeatureState>) -> Self {
        self.features = features;
        self
    }

    pub fn feature(mut self, name: impl Into<String>, state: FeatureState) -> Self {
        self.features.insert(name.into(), state);
        self
    }

    pub fn origin(mut self, origin: PackageOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Package name used for the test-negation lookup of dependencies.
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn treat_unknown_as_false(mut self, value: bool) -> Self {
        self.treat_unknown_as_false = value;
        self
    }

    pub fn build(self) -> Context {
        self.build_with_index(&NoIndex)
    }

    pub fn build_with_index(self, index: &dyn TestNegationIndex) -> Context {
        let test_value = pinned_test_value(self.origin, self.package.as_deref(), index);
        debug!(
            origin = ?self.origin,
            package = self.package.as_deref().unwrap_or("<unnamed>"),
            treat_unknown_as_false = self.treat_unknown_as_false,
            %test_value,
            "built cfg context"
        );
        Context {
            options: self.options,
            features: self.features,
            origin: self.origin,
            treat_unknown_as_false: self.treat_unknown_as_false,
            test_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index() -> StaticTestIndex {
        let mut index = StaticTestIndex::new();
        index.mark_clean("serde");
        index.mark_negating("tokio");
        index
    }

    #[test]
    fn stdlib_is_never_in_test_mode() {
        for origin in [PackageOrigin::Stdlib, PackageOrigin::StdlibDependency] {
            assert_eq!(pinned_test_value(origin, Some("core"), &index()), ThreeValuedLogic::False);
        }
    }

    #[test]
    fn dependency_test_mode_follows_index() {
        let index = index();
        let dep = PackageOrigin::Dependency;
        assert_eq!(pinned_test_value(dep, Some("serde"), &index), ThreeValuedLogic::True);
        assert_eq!(pinned_test_value(dep, Some("tokio"), &index), ThreeValuedLogic::False);
        assert_eq!(pinned_test_value(dep, Some("rand"), &index), ThreeValuedLogic::False);
        assert_eq!(pinned_test_value(dep, None, &index), ThreeValuedLogic::False);
    }

    #[test]
    fn workspace_test_mode_is_unknown() {
        assert_eq!(
            pinned_test_value(PackageOrigin::Workspace, Some("serde"), &index()),
            ThreeValuedLogic::Unknown
        );
    }

    #[test]
    fn record_tracks_negations() {
        let mut index = StaticTestIndex::new();
        index.record("a", &CfgPredicate::name("test"));
        index.record("b", &CfgPredicate::negated(CfgPredicate::name("test")));
        assert_eq!(index.has_negated_test("a"), Some(false));
        assert_eq!(index.has_negated_test("b"), Some(true));
        assert_eq!(index.has_negated_test("c"), None);
    }

    #[test]
    fn builder_pins_test_value() {
        let ctx = Context::builder()
            .origin(PackageOrigin::Dependency)
            .package("serde")
            .feature("std", FeatureState::Enabled)
            .build_with_index(&index());
        assert_eq!(ctx.test_value(), ThreeValuedLogic::True);
        assert_eq!(ctx.feature("std"), Some(FeatureState::Enabled));
        assert_eq!(ctx.feature("alloc"), None);
        assert_eq!(Context::default().test_value(), ThreeValuedLogic::Unknown);
    }

    #[test]
    fn parses_origins() {
        assert_eq!(
            "stdlib-dependency".parse::<PackageOrigin>().unwrap(),
            PackageOrigin::StdlibDependency
        );
        assert!("vendored".parse::<PackageOrigin>().is_err());
    }
}
