use crate::context::{Context, FeatureState, PackageOrigin};
use crate::logic::ThreeValuedLogic;
use crate::observer::{EvalObserver, NoopObserver};
use crate::predicate::{CfgItem, CfgPredicate};
use std::sync::Arc;
use tracing::trace;

/// Set while rustc expands diagnostic macros; never decidable statically.
pub const DIAGNOSTIC_MACROS_NAME: &str = "rustc_diagnostic_macros";
pub const TEST_NAME: &str = "test";
pub const RUSTDOC_NAME: &str = "rustdoc";
pub const FEATURE_KEY: &str = "feature";

/// Bare names looked up even when unknown names are left undecided.
pub const SUPPORTED_NAME_OPTIONS: &[&str] =
    &["debug_assertions", "unix", "windows", "test", "doc"];

/// Keys looked up even when unknown names are left undecided.
pub const SUPPORTED_NAME_VALUE_OPTIONS: &[&str] = &[
    "target_arch",
    "target_endian",
    "target_env",
    "target_family",
    "target_feature",
    "target_os",
    "target_pointer_width",
    "target_vendor",
];

/// Evaluates cfg predicates of one compilation unit.
#[derive(Clone)]
pub struct CfgEvaluator {
    ctx: Context,
    observer: Arc<dyn EvalObserver>,
}

impl CfgEvaluator {
    pub fn new(ctx: Context) -> Self {
        Self::with_observer(ctx, Arc::new(NoopObserver))
    }

    pub fn with_observer(ctx: Context, observer: Arc<dyn EvalObserver>) -> Self {
        Self { ctx, observer }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn evaluate(&self, predicate: &CfgPredicate) -> ThreeValuedLogic {
        let verdict = self.eval_predicate(predicate);
        trace!(%predicate, %verdict, "evaluated cfg");
        if !verdict.is_unknown() {
            self.observer.on_verdict(predicate, verdict);
        }
        verdict
    }

    /// Evaluates one raw item, e.g. the condition of a `cfg_attr`.
    pub fn evaluate_condition<T: CfgItem>(&self, item: &T) -> ThreeValuedLogic {
        self.evaluate(&CfgPredicate::from_item(item))
    }

    /// Evaluates several top-level items as if stacked on one source item.
    pub fn evaluate_items<T: CfgItem>(&self, items: &[T]) -> ThreeValuedLogic {
        self.evaluate(&CfgPredicate::from_items(items))
    }

    /// Evaluates the `cfg` and `cfg_attr` attributes of a source item.
    pub fn evaluate_attributes<T: CfgItem>(&self, attrs: &[T]) -> ThreeValuedLogic {
        self.evaluate(&CfgPredicate::from_attributes(attrs))
    }

    /// Only an explicit `False` disables; `Unknown` may still be active.
    pub fn is_disabled(&self, predicate: &CfgPredicate) -> bool {
        self.evaluate(predicate).is_false()
    }

    fn eval_predicate(&self, predicate: &CfgPredicate) -> ThreeValuedLogic {
        match predicate {
            CfgPredicate::All(preds) => preds
                .iter()
                .fold(ThreeValuedLogic::True, |acc, p| acc.and(self.eval_predicate(p))),
            CfgPredicate::Any(preds) => preds
                .iter()
                .fold(ThreeValuedLogic::False, |acc, p| acc.or(self.eval_predicate(p))),
            CfgPredicate::Not(inner) => !self.eval_predicate(inner),
            CfgPredicate::NameOption(name) => self.eval_name(name),
            CfgPredicate::NameValueOption { name, value } => self.eval_name_value(name, value),
            CfgPredicate::Error => ThreeValuedLogic::Unknown,
        }
    }

    fn eval_name(&self, name: &str) -> ThreeValuedLogic {
        if name == DIAGNOSTIC_MACROS_NAME {
            return ThreeValuedLogic::Unknown;
        }
        if name == TEST_NAME {
            return self.ctx.test_value();
        }
        if name == RUSTDOC_NAME && self.ctx.origin() == PackageOrigin::Stdlib {
            return ThreeValuedLogic::Unknown;
        }
        if self.ctx.treat_unknown_as_false() || SUPPORTED_NAME_OPTIONS.contains(&name) {
            ThreeValuedLogic::from_bool(self.ctx.options().is_name_enabled(name))
        } else {
            ThreeValuedLogic::Unknown
        }
    }

    fn eval_name_value(&self, name: &str, value: &str) -> ThreeValuedLogic {
        if name == FEATURE_KEY {
            return self.eval_feature(value);
        }
        if self.ctx.treat_unknown_as_false() || SUPPORTED_NAME_VALUE_OPTIONS.contains(&name) {
            ThreeValuedLogic::from_bool(self.ctx.options().is_name_value_enabled(name, value))
        } else {
            ThreeValuedLogic::Unknown
        }
    }

    fn eval_feature(&self, feature: &str) -> ThreeValuedLogic {
        // Feature data of the standard library isn't tracked.
        if self.ctx.origin() == PackageOrigin::Stdlib {
            return ThreeValuedLogic::Unknown;
        }
        match self.ctx.feature(feature) {
            Some(FeatureState::Enabled) => ThreeValuedLogic::True,
            Some(FeatureState::Disabled) => ThreeValuedLogic::False,
            None if self.ctx.options().is_name_value_enabled(FEATURE_KEY, feature) => {
                ThreeValuedLogic::True
            }
            None if self.ctx.treat_unknown_as_false() => ThreeValuedLogic::False,
            None => ThreeValuedLogic::Unknown,
        }
    }
}

impl Default for CfgEvaluator {
    fn default() -> Self {
        Self::new(Context::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ThreeValuedLogic::{False, True, Unknown};
    use crate::meta::parse_meta;
    use crate::observer::HitCounter;
    use crate::options::CfgOptions;
    use pretty_assertions::assert_eq;

    fn eval(ev: &CfgEvaluator, src: &str) -> ThreeValuedLogic {
        ev.evaluate_condition(&parse_meta(src).unwrap())
    }

    fn unix_ctx() -> Context {
        Context::builder()
            .options(
                CfgOptions::new()
                    .with_name("unix")
                    .with_name("made_up_name")
                    .with_key_value("target_os", "linux")
                    .with_key_value("vendor_key", "x"),
            )
            .build()
    }

    #[test]
    fn vacuous_combinators() {
        let ev = CfgEvaluator::default();
        assert_eq!(ev.evaluate(&CfgPredicate::All(vec![])), True);
        assert_eq!(ev.evaluate(&CfgPredicate::Any(vec![])), False);
        assert_eq!(ev.evaluate(&CfgPredicate::Error), Unknown);
    }

    #[test]
    fn malformed_items_are_unknown() {
        let ev = CfgEvaluator::new(unix_ctx());
        assert_eq!(eval(&ev, "not()"), Unknown);
        assert_eq!(eval(&ev, "not(unix, windows)"), Unknown);
        assert_eq!(eval(&ev, "xor(unix)"), Unknown);
        assert_eq!(eval(&ev, "not(xor(unix))"), Unknown);
    }

    #[test]
    fn supported_names_are_looked_up() {
        let ev = CfgEvaluator::new(unix_ctx());
        assert_eq!(eval(&ev, "unix"), True);
        assert_eq!(eval(&ev, "windows"), False);
        assert_eq!(eval(&ev, r#"target_os = "linux""#), True);
        assert_eq!(eval(&ev, r#"target_os = "macos""#), False);
    }

    #[test]
    fn unsupported_names_stay_unknown() {
        let ev = CfgEvaluator::new(unix_ctx());
        assert_eq!(eval(&ev, "made_up_name"), Unknown);
        assert_eq!(eval(&ev, "other_name"), Unknown);
        assert_eq!(eval(&ev, r#"vendor_key = "x""#), Unknown);
    }

    #[test]
    fn unknown_names_can_be_forced_false() {
        let ctx = Context::builder()
            .options(CfgOptions::new().with_name("made_up_name"))
            .treat_unknown_as_false(true)
            .build();
        let ev = CfgEvaluator::new(ctx);
        assert_eq!(eval(&ev, "made_up_name"), True);
        assert_eq!(eval(&ev, "other_name"), False);
        assert_eq!(eval(&ev, r#"vendor_key = "x""#), False);
    }

    #[test]
    fn dominance_inside_trees() {
        let ev = CfgEvaluator::new(unix_ctx());
        assert_eq!(eval(&ev, "all(windows, made_up)"), False);
        assert_eq!(eval(&ev, "any(unix, made_up)"), True);
        assert_eq!(eval(&ev, "all(unix, made_up)"), Unknown);
        assert_eq!(eval(&ev, "any(windows, made_up)"), Unknown);
    }

    #[test]
    fn diagnostic_macros_are_always_unknown() {
        let ctx = Context::builder()
            .options(CfgOptions::new().with_name(DIAGNOSTIC_MACROS_NAME))
            .treat_unknown_as_false(true)
            .build();
        assert_eq!(eval(&CfgEvaluator::new(ctx), DIAGNOSTIC_MACROS_NAME), Unknown);
    }

    #[test]
    fn test_uses_pinned_value() {
        let enabled = CfgOptions::new().with_name("test");
        let stdlib = Context::builder()
            .options(enabled.clone())
            .origin(PackageOrigin::StdlibDependency)
            .build();
        assert_eq!(eval(&CfgEvaluator::new(stdlib), "test"), False);
        let workspace = Context::builder().options(enabled).build();
        assert_eq!(eval(&CfgEvaluator::new(workspace), "test"), Unknown);
        assert_eq!(eval(&CfgEvaluator::new(Context::default()), "not(test)"), Unknown);
    }

    #[test]
    fn rustdoc_is_unknown_only_in_stdlib() {
        let options = CfgOptions::new().with_name("rustdoc");
        let stdlib = Context::builder()
            .options(options.clone())
            .origin(PackageOrigin::Stdlib)
            .treat_unknown_as_false(true)
            .build();
        assert_eq!(eval(&CfgEvaluator::new(stdlib), "rustdoc"), Unknown);
        let dep = Context::builder()
            .options(options)
            .origin(PackageOrigin::Dependency)
            .treat_unknown_as_false(true)
            .build();
        assert_eq!(eval(&CfgEvaluator::new(dep), "rustdoc"), True);
    }

    #[test]
    fn features() {
        let ctx = Context::builder()
            .options(
                CfgOptions::new()
                    .with_key_value("feature", "foo")
                    .with_key_value("feature", "bar"),
            )
            .feature("bar", FeatureState::Disabled)
            .feature("baz", FeatureState::Enabled)
            .build();
        let ev = CfgEvaluator::new(ctx);
        assert_eq!(eval(&ev, r#"feature = "foo""#), True);
        assert_eq!(eval(&ev, r#"feature = "bar""#), False);
        assert_eq!(eval(&ev, r#"feature = "baz""#), True);
        assert_eq!(eval(&ev, r#"feature = "qux""#), Unknown);
    }

    #[test]
    fn untracked_features_follow_policy() {
        let ctx = Context::builder().treat_unknown_as_false(true).build();
        assert_eq!(eval(&CfgEvaluator::new(ctx), r#"feature = "qux""#), False);
    }

    #[test]
    fn stdlib_features_are_unknown() {
        let ctx = Context::builder()
            .feature("foo", FeatureState::Enabled)
            .origin(PackageOrigin::Stdlib)
            .build();
        assert_eq!(eval(&CfgEvaluator::new(ctx), r#"feature = "foo""#), Unknown);
    }

    #[test]
    fn observer_sees_top_level_decisions_only() {
        let counter = Arc::new(HitCounter::new());
        let ev = CfgEvaluator::with_observer(unix_ctx(), counter.clone());
        eval(&ev, "all(unix, not(windows), any(unix))");
        eval(&ev, "windows");
        eval(&ev, "made_up");
        assert_eq!(counter.enabled(), 1);
        assert_eq!(counter.disabled(), 1);
        assert!(ev.is_disabled(&CfgPredicate::name("windows")));
        assert!(!ev.is_disabled(&CfgPredicate::name("made_up")));
        assert_eq!(counter.disabled(), 2);
    }
}
