//! Argument normalization: replace absent values with protocol-safe defaults.
//!
//! Callers hand over loosely-typed arguments where a parameter may be present
//! but `null`. Servers frequently reject `null`, so each absent value is
//! replaced by an empty value of the kind the parameter most likely expects.
//! The kind is chosen by a [`DefaultStrategy`]; the stock strategy guesses
//! from naming conventions and never looks at the tool's input schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameter name → untyped value.
pub type ArgumentMap = Map<String, Value>;

/// The protocol-safe value kinds a default can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    Number,
    Boolean,
    Sequence,
    Mapping,
    String,
}

impl ArgKind {
    /// Empty value of this kind.
    pub fn empty_value(self) -> Value {
        match self {
            ArgKind::Number => Value::from(0),
            ArgKind::Boolean => Value::Bool(false),
            ArgKind::Sequence => Value::Array(Vec::new()),
            ArgKind::Mapping => Value::Object(Map::new()),
            ArgKind::String => Value::String(String::new()),
        }
    }

    /// Kind of a present value. `None` for `null`.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ArgKind::Boolean),
            Value::Number(_) => Some(ArgKind::Number),
            Value::String(_) => Some(ArgKind::String),
            Value::Array(_) => Some(ArgKind::Sequence),
            Value::Object(_) => Some(ArgKind::Mapping),
        }
    }
}

/// Decides which kind an absent parameter should default to.
pub trait DefaultStrategy: Send + Sync {
    fn infer_kind(&self, name: &str) -> ArgKind;
}

/// One naming convention: any substring, prefix or suffix match selects `kind`.
#[derive(Debug, Clone, Copy)]
pub struct NameRule {
    pub kind: ArgKind,
    pub contains: &'static [&'static str],
    pub prefixes: &'static [&'static str],
    pub suffixes: &'static [&'static str],
}

impl NameRule {
    pub fn matches(&self, name: &str) -> bool {
        self.contains.iter().any(|s| name.contains(s))
            || self.prefixes.iter().any(|p| name.starts_with(p))
            || self.suffixes.iter().any(|s| name.ends_with(s))
    }
}

/// Naming conventions in precedence order. First match wins; names that
/// match nothing default to [`ArgKind::String`].
pub const NAME_RULES: [NameRule; 4] = [
    NameRule {
        kind: ArgKind::Number,
        contains: &["number"],
        prefixes: &[],
        suffixes: &["Count", "Id", "Limit"],
    },
    NameRule {
        kind: ArgKind::Boolean,
        contains: &["bool"],
        prefixes: &["is", "has", "should"],
        suffixes: &[],
    },
    NameRule {
        kind: ArgKind::Sequence,
        contains: &["array"],
        prefixes: &[],
        suffixes: &["s", "List", "Items"],
    },
    NameRule {
        kind: ArgKind::Mapping,
        contains: &["object"],
        prefixes: &[],
        suffixes: &["Options", "Config", "Settings"],
    },
];

/// Guesses the kind from the parameter name.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameConventionDefaults;

impl DefaultStrategy for NameConventionDefaults {
    fn infer_kind(&self, name: &str) -> ArgKind {
        NAME_RULES
            .iter()
            .find(|rule| rule.matches(name))
            .map(|rule| rule.kind)
            .unwrap_or(ArgKind::String)
    }
}

/// Return a copy of `args` with every `null` value replaced by the default
/// chosen by `strategy`. Present values are passed through untouched.
pub fn normalize_arguments(args: &ArgumentMap, strategy: &dyn DefaultStrategy) -> ArgumentMap {
    args.iter()
        .map(|(name, value)| {
            let normalized = if value.is_null() {
                strategy.infer_kind(name).empty_value()
            } else {
                value.clone()
            };
            (name.clone(), normalized)
        })
        .collect()
}
