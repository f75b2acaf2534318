pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod logic;
pub mod meta;
pub mod observer;
pub mod options;
pub mod predicate;
mod parser;

use errors::Result;

/// Evaluates a textual meta item such as `all(unix, feature = "foo")`.
pub fn eval(ctx: &Context, expr: &str) -> Result<ThreeValuedLogic> {
    let item = meta::parse_meta(expr)?;
    Ok(CfgEvaluator::new(ctx.clone()).evaluate_condition(&item))
}

/// Evaluates a textual attribute list such as `#[cfg(unix)] #[cfg_attr(test, cfg(doc))]`.
pub fn eval_attrs(ctx: &Context, attrs: &str) -> Result<ThreeValuedLogic> {
    let attrs = meta::parse_attrs(attrs)?;
    Ok(CfgEvaluator::new(ctx.clone()).evaluate_attributes(&attrs))
}

pub use config::UnitConfig;
pub use context::{
    Context, ContextBuilder, FeatureState, PackageOrigin, StaticTestIndex, TestNegationIndex,
};
pub use engine::CfgEvaluator;
pub use errors::EvalError;
pub use logic::ThreeValuedLogic;
pub use meta::{parse_attrs, parse_meta, MetaItem, MetaLit};
pub use observer::{EvalObserver, HitCounter, NoopObserver};
pub use options::{CfgOptions, CfgSetting};
pub use predicate::{CfgItem, CfgPredicate};
