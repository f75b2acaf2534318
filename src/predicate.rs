use itertools::Itertools;
use std::fmt;

pub const CFG: &str = "cfg";
pub const CFG_ATTR: &str = "cfg_attr";

/// Read-only view of one raw attribute argument, as handed over by the
/// attribute parser.
///
/// `all(a, b)` has combinator `all` and two args, `unix` has name `unix`,
/// `feature = "foo"` has name `feature` and value `foo`.
pub trait CfgItem: Sized {
    fn combinator(&self) -> Option<&str>;
    fn args(&self) -> Option<&[Self]>;
    fn name(&self) -> Option<&str>;
    fn value(&self) -> Option<&str>;
}

/// Normalized `cfg(...)` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CfgPredicate {
    NameOption(String),
    NameValueOption { name: String, value: String },
    All(Vec<CfgPredicate>),
    Any(Vec<CfgPredicate>),
    Not(Box<CfgPredicate>),
    Error,
}

impl CfgPredicate {
    pub fn name(name: impl Into<String>) -> Self {
        CfgPredicate::NameOption(name.into())
    }

    pub fn name_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        CfgPredicate::NameValueOption {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn negated(inner: CfgPredicate) -> Self {
        CfgPredicate::Not(Box::new(inner))
    }

    /// Builds the predicate of a single raw item.
    pub fn from_item<T: CfgItem>(item: &T) -> Self {
        if let Some(args) = item.args() {
            let mut preds: Vec<CfgPredicate> =
                args.iter().map(CfgPredicate::from_item).collect();
            return match item.combinator() {
                Some("all") => CfgPredicate::All(preds),
                Some("any") => CfgPredicate::Any(preds),
                Some("not") if preds.len() == 1 => match preds.pop() {
                    Some(single) => CfgPredicate::negated(single),
                    None => CfgPredicate::Error,
                },
                _ => CfgPredicate::Error,
            };
        }
        match (item.name(), item.value()) {
            (Some(name), Some(value)) => CfgPredicate::name_value(name, value),
            (Some(name), None) => CfgPredicate::name(name),
            _ => CfgPredicate::Error,
        }
    }

    /// Combines several top-level predicates: one is used as-is, anything
    /// else is conjoined.
    pub fn from_items<T: CfgItem>(items: &[T]) -> Self {
        Self::conjoin(items.iter().map(CfgPredicate::from_item).collect())
    }

    /// Predicate of one `cfg(...)` attribute. Any arity other than one is
    /// malformed.
    pub fn from_cfg_attr<T: CfgItem>(attr: &T) -> Self {
        match attr.args() {
            Some([single]) => CfgPredicate::from_item(single),
            _ => CfgPredicate::Error,
        }
    }

    /// Effective predicate of an item's attribute list.
    ///
    /// `cfg(p)` contributes `p`. `cfg_attr(c, attrs..)` contributes
    /// `any(not(c), q)` for every cfg predicate `q` its attributes yield.
    /// Everything else is ignored.
    pub fn from_attributes<T: CfgItem>(attrs: &[T]) -> Self {
        let mut preds = Vec::new();
        for attr in attrs {
            collect_attr_predicates(attr, &mut preds);
        }
        Self::conjoin(preds)
    }

    /// Whether a `not(...)` anywhere in this tree guards the `test` name.
    pub fn contains_negated_test(&self) -> bool {
        match self {
            CfgPredicate::Not(inner) => {
                inner.mentions_name("test") || inner.contains_negated_test()
            }
            CfgPredicate::All(preds) | CfgPredicate::Any(preds) => {
                preds.iter().any(CfgPredicate::contains_negated_test)
            }
            CfgPredicate::NameOption(_)
            | CfgPredicate::NameValueOption { .. }
            | CfgPredicate::Error => false,
        }
    }

    fn mentions_name(&self, name: &str) -> bool {
        match self {
            CfgPredicate::NameOption(n) => n == name,
            CfgPredicate::All(preds) | CfgPredicate::Any(preds) => {
                preds.iter().any(|p| p.mentions_name(name))
            }
            CfgPredicate::Not(inner) => inner.mentions_name(name),
            CfgPredicate::NameValueOption { .. } | CfgPredicate::Error => false,
        }
    }

    fn conjoin(mut preds: Vec<CfgPredicate>) -> Self {
        if preds.len() == 1 {
            preds.remove(0)
        } else {
            CfgPredicate::All(preds)
        }
    }
}

fn collect_attr_predicates<T: CfgItem>(attr: &T, out: &mut Vec<CfgPredicate>) {
    match attr.combinator() {
        Some(CFG) => out.push(CfgPredicate::from_cfg_attr(attr)),
        Some(CFG_ATTR) => {
            let Some([condition, attrs @ ..]) = attr.args() else {
                return;
            };
            if attrs.is_empty() {
                return;
            }
            let condition = CfgPredicate::from_item(condition);
            let mut inner = Vec::new();
            for a in attrs {
                collect_attr_predicates(a, &mut inner);
            }
            out.extend(inner.into_iter().map(|q| {
                CfgPredicate::Any(vec![CfgPredicate::negated(condition.clone()), q])
            }));
        }
        _ => {}
    }
}

impl fmt::Display for CfgPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfgPredicate::NameOption(name) => f.write_str(name),
            CfgPredicate::NameValueOption { name, value } => write!(f, "{name} = {value:?}"),
            CfgPredicate::All(preds) => write!(f, "all({})", preds.iter().join(", ")),
            CfgPredicate::Any(preds) => write!(f, "any({})", preds.iter().join(", ")),
            CfgPredicate::Not(inner) => write!(f, "not({inner})"),
            CfgPredicate::Error => f.write_str("<error>"),
        }
    }
}
