use cfg_evaluator::{
    parse_attrs, parse_meta, CfgEvaluator, CfgPredicate, FeatureState, PackageOrigin, UnitConfig,
};
use clap::{ArgAction, Parser};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, Level};

/// Evaluate cfg predicates against a compilation unit configuration.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Predicates such as `all(unix, feature = "foo")`
    #[arg(required = true)]
    inputs: Vec<String>,
    /// Treat the inputs as one attribute list (`#[cfg(..)] #[cfg_attr(..)]`)
    #[arg(long)]
    attrs: bool,
    /// Unit configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enabled setting, `name` or `key="value"` (repeatable)
    #[arg(long = "cfg")]
    cfg: Vec<String>,
    /// Feature tracked as enabled (repeatable)
    #[arg(long = "enable-feature")]
    enable_feature: Vec<String>,
    /// Feature tracked as disabled (repeatable)
    #[arg(long = "disable-feature")]
    disable_feature: Vec<String>,
    /// stdlib, stdlib-dependency, dependency or workspace
    #[arg(long)]
    origin: Option<PackageOrigin>,
    /// Package name for the test-mode lookup
    #[arg(long)]
    package: Option<String>,
    /// Evaluate unrecognized names to false instead of unknown
    #[arg(long)]
    unknown_as_false: bool,
    /// Log more (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let out = match run(args) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&out) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> cfg_evaluator::errors::Result<Value> {
    let mut config = match &args.config {
        Some(path) => UnitConfig::load(path)?,
        None => UnitConfig::default(),
    };
    config.cfg.extend(args.cfg);
    for feature in args.enable_feature {
        config.features.insert(feature, FeatureState::Enabled);
    }
    for feature in args.disable_feature {
        config.features.insert(feature, FeatureState::Disabled);
    }
    if let Some(origin) = args.origin {
        config.origin = origin;
    }
    if args.package.is_some() {
        config.package = args.package;
    }
    config.treat_unknown_as_false |= args.unknown_as_false;
    debug!(?config, "resolved unit config");

    let evaluator = CfgEvaluator::new(config.into_context()?);

    if args.attrs {
        let input = args.inputs.join(" ");
        let attrs = parse_attrs(&input)?;
        let predicate = CfgPredicate::from_attributes(&attrs);
        return Ok(verdict_json(&input, &predicate, &evaluator));
    }

    let results = args
        .inputs
        .iter()
        .map(|input| {
            let predicate = CfgPredicate::from_item(&parse_meta(input)?);
            Ok(verdict_json(input, &predicate, &evaluator))
        })
        .collect::<cfg_evaluator::errors::Result<Vec<_>>>()?;
    Ok(Value::Array(results))
}

fn verdict_json(input: &str, predicate: &CfgPredicate, evaluator: &CfgEvaluator) -> Value {
    json!({
        "input": input,
        "predicate": predicate.to_string(),
        "verdict": evaluator.evaluate(predicate),
    })
}
