use crate::context::{Context, FeatureState, PackageOrigin, StaticTestIndex};
use crate::errors::{EvalError, Result};
use crate::options::{CfgOptions, CfgSetting};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk description of a compilation unit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitConfig {
    /// Enabled settings in `--cfg` syntax.
    pub cfg: Vec<String>,
    pub features: BTreeMap<String, FeatureState>,
    pub origin: PackageOrigin,
    pub package: Option<String>,
    pub treat_unknown_as_false: bool,
    /// Packages known to the test-negation index. Defaults to `package` plus
    /// everything in `packages_with_negated_test`.
    pub indexed_packages: Option<Vec<String>>,
    pub packages_with_negated_test: Vec<String>,
}

impl UnitConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EvalError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EvalError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn options(&self) -> Result<CfgOptions> {
        self.cfg.iter().map(|s| s.parse::<CfgSetting>()).collect()
    }

    pub fn test_index(&self) -> StaticTestIndex {
        let mut index = StaticTestIndex::new();
        match &self.indexed_packages {
            Some(packages) => packages.iter().for_each(|p| index.mark_clean(p.as_str())),
            None => {
                if let Some(package) = &self.package {
                    index.mark_clean(package.as_str());
                }
            }
        }
        for package in &self.packages_with_negated_test {
            index.mark_negating(package.as_str());
        }
        index
    }

    pub fn into_context(self) -> Result<Context> {
        let options = self.options()?;
        let index = self.test_index();
        let mut builder = Context::builder()
            .options(options)
            .features(self.features)
            .origin(self.origin)
            .treat_unknown_as_false(self.treat_unknown_as_false);
        if let Some(package) = self.package {
            builder = builder.package(package);
        }
        Ok(builder.build_with_index(&index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ThreeValuedLogic;
    use crate::context::TestNegationIndex;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_is_workspace() {
        let ctx = UnitConfig::from_json("{}").unwrap().into_context().unwrap();
        assert_eq!(ctx.origin(), PackageOrigin::Workspace);
        assert!(ctx.options().is_empty());
        assert_eq!(ctx.test_value(), ThreeValuedLogic::Unknown);
    }

    #[test]
    fn loads_full_config() {
        let json = r#"{
            "cfg": ["unix", "target_os=\"linux\""],
            "features": { "std": "enabled", "nightly": "disabled" },
            "origin": "dependency",
            "package": "serde",
            "treat_unknown_as_false": true
        }"#;
        let ctx = UnitConfig::from_json(json).unwrap().into_context().unwrap();
        assert!(ctx.options().is_name_enabled("unix"));
        assert!(ctx.options().is_name_value_enabled("target_os", "linux"));
        assert_eq!(ctx.feature("nightly"), Some(FeatureState::Disabled));
        assert!(ctx.treat_unknown_as_false());
        assert_eq!(ctx.test_value(), ThreeValuedLogic::True);
    }

    #[test]
    fn negating_dependency_is_not_in_test_mode() {
        let json = r#"{
            "origin": "dependency",
            "package": "tokio",
            "packages_with_negated_test": ["tokio"]
        }"#;
        let ctx = UnitConfig::from_json(json).unwrap().into_context().unwrap();
        assert_eq!(ctx.test_value(), ThreeValuedLogic::False);
    }

    #[test]
    fn explicit_index_excludes_unlisted_packages() {
        let json =
            r#"{ "origin": "dependency", "package": "rand", "indexed_packages": ["serde"] }"#;
        let config = UnitConfig::from_json(json).unwrap();
        assert_eq!(config.test_index().has_negated_test("rand"), None);
        assert_eq!(config.into_context().unwrap().test_value(), ThreeValuedLogic::False);
    }

    #[test]
    fn origin_accepts_both_spellings() {
        for json in [
            r#"{"origin":"stdlib_dependency"}"#,
            r#"{"origin":"stdlib-dependency"}"#,
        ] {
            let config = UnitConfig::from_json(json).unwrap();
            assert_eq!(config.origin, PackageOrigin::StdlibDependency, "{json}");
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            UnitConfig::from_json(r#"{"origin":"vendored"}"#),
            Err(EvalError::Config(_))
        ));
        assert!(matches!(UnitConfig::from_json(r#"{"colour":1}"#), Err(EvalError::Config(_))));
        let bad_cfg = UnitConfig::from_json(r#"{"cfg":["a b"]}"#).unwrap();
        assert!(matches!(bad_cfg.into_context(), Err(EvalError::InvalidSetting(_))));
    }
}
