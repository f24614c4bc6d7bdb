//! # Pattern and name model for subscription matching.
//!
//! Subscriptions are stored as a [`Pattern`]; triggers carry a concrete
//! [`Name`]. Both come in three shapes:
//! - **Token**: a plain, undivided name (`"event"`).
//! - **Segments**: an ordered segment sequence, produced by splitting a
//!   delimited token (`"a:b:c"` with delimiter `":"` becomes `["a","b","c"]`).
//! - **Map**: a key/value map; on the pattern side each value is either a
//!   concrete JSON value or a wildcard ([`ValuePattern::Any`]).
//!
//! Wildcards exist only on the pattern side: a triggered [`Name`] is always
//! concrete. The in-band `"*"` wildcard accepted by [`Pattern::from_json`]
//! is resolved to the tagged form once at construction, never re-inspected
//! per dispatch.
//!
//! ## Matching and specificity
//! [`Pattern::specificity_for`] decides whether a pattern matches a name and
//! how precisely:
//! - `Token` matches an equal token at specificity 1.
//! - `Segments` matches any name it is a prefix of, at specificity equal to
//!   the prefix length. The empty sequence matches every segment name at 0.
//! - `Map` matches when every pattern pair is present in the name: a
//!   concrete pair scores 2, a wildcard pair scores 1, so a concrete match
//!   outranks a wildcard match of the same width. The empty map matches
//!   every map name at 0.
//! - Shapes never match across kinds.
//!
//! ## Example
//! ```rust
//! use eventmatch::{Name, Pattern};
//! use serde_json::json;
//!
//! let pattern = Pattern::from_json(&json!({"fizz": 1, "buzz": 2})).unwrap();
//! let name = Name::from_json(&json!({"fizz": 1, "buzz": 2, "bang": 3})).unwrap();
//!
//! assert_eq!(pattern.specificity_for(&name), Some(4));
//! ```

use std::collections::BTreeMap;

use serde_json::{json, Map as JsonMap, Value};

use crate::error::PatternError;

/// One value position inside a map pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum ValuePattern {
    /// Matches only this exact JSON value.
    Exact(Value),
    /// Matches any value present at the key.
    Any,
}

impl ValuePattern {
    /// Canonical encoding used by [`Pattern::storage_key`].
    ///
    /// `Exact` wraps the value so a literal `"*"` string stays distinct
    /// from the wildcard marker.
    fn key_value(&self) -> Value {
        match self {
            ValuePattern::Exact(value) => json!({ "eq": value }),
            ValuePattern::Any => json!("any"),
        }
    }
}

/// A stored subscription pattern.
///
/// Compared against triggered names for matching, not for equality of
/// representation; [`Pattern::storage_key`] provides the stable key the
/// store uses for bucketing and exact-removal lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Plain, undivided name token.
    Token(String),
    /// Ordered segment sequence (split from a delimited token).
    Segments(Vec<String>),
    /// Structured key/value pattern.
    Map(BTreeMap<String, ValuePattern>),
}

impl Pattern {
    /// Creates a token pattern.
    pub fn token(token: impl Into<String>) -> Self {
        Pattern::Token(token.into())
    }

    /// Creates a segment-sequence pattern.
    pub fn segments<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Pattern::Segments(parts.into_iter().map(Into::into).collect())
    }

    /// Creates a map pattern from key/value pairs.
    pub fn map<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, ValuePattern)>,
        K: Into<String>,
    {
        Pattern::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a pattern from a JSON value.
    ///
    /// - a string becomes a [`Pattern::Token`];
    /// - an array of strings becomes [`Pattern::Segments`];
    /// - an object becomes [`Pattern::Map`], where the string value `"*"`
    ///   marks a wildcard at that key.
    ///
    /// A literal `"*"` value cannot be expressed through this constructor;
    /// build the map with [`Pattern::map`] and [`ValuePattern::Exact`]
    /// instead.
    ///
    /// ## Example
    /// ```rust
    /// use eventmatch::{Pattern, ValuePattern};
    /// use serde_json::json;
    ///
    /// let p = Pattern::from_json(&json!({"foo": "*"})).unwrap();
    /// assert_eq!(p, Pattern::map([("foo", ValuePattern::Any)]));
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, PatternError> {
        match value {
            Value::String(token) => Ok(Pattern::Token(token.clone())),
            Value::Array(items) => Ok(Pattern::Segments(string_items(items)?)),
            Value::Object(fields) => {
                let mut map = BTreeMap::new();
                for (key, field) in fields {
                    let value = match field {
                        Value::String(s) if s == "*" => ValuePattern::Any,
                        other => ValuePattern::Exact(other.clone()),
                    };
                    map.insert(key.clone(), value);
                }
                Ok(Pattern::Map(map))
            }
            other => Err(PatternError::unsupported(json_kind(other))),
        }
    }

    /// Splits a token pattern into segments when a delimiter is configured.
    ///
    /// Segment and map patterns pass through unchanged, so a pattern that
    /// was already normalized (or built as segments directly) is stable
    /// under repeated normalization.
    pub fn normalized(self, delimiter: Option<&str>) -> Self {
        match (self, delimiter) {
            (Pattern::Token(token), Some(d)) if !d.is_empty() => {
                Pattern::Segments(token.split(d).map(str::to_owned).collect())
            }
            (pattern, _) => pattern,
        }
    }

    /// Returns the match specificity of this pattern against `name`, or
    /// `None` when it does not match.
    ///
    /// Ranking rules are documented at the module level; the store sorts
    /// matches descending by this score.
    pub fn specificity_for(&self, name: &Name) -> Option<u32> {
        match (self, name) {
            (Pattern::Token(pattern), Name::Token(name)) => (pattern == name).then_some(1),
            (Pattern::Segments(pattern), Name::Segments(name)) => (pattern.len() <= name.len()
                && pattern.iter().zip(name).all(|(p, n)| p == n))
            .then(|| pattern.len() as u32),
            (Pattern::Map(pattern), Name::Map(name)) => {
                let mut specificity = 0;
                for (key, value) in pattern {
                    match value {
                        ValuePattern::Exact(expected) => {
                            if name.get(key) != Some(expected) {
                                return None;
                            }
                            specificity += 2;
                        }
                        ValuePattern::Any => {
                            if !name.contains_key(key) {
                                return None;
                            }
                            specificity += 1;
                        }
                    }
                }
                Some(specificity)
            }
            _ => None,
        }
    }

    /// Serializes the pattern to an injective stable string key.
    ///
    /// Two patterns produce the same key iff they are the same pattern;
    /// map keys are emitted in sorted order.
    pub fn storage_key(&self) -> String {
        let value = match self {
            Pattern::Token(token) => json!({ "token": token }),
            Pattern::Segments(segments) => json!({ "segments": segments }),
            Pattern::Map(map) => {
                let fields: JsonMap<String, Value> = map
                    .iter()
                    .map(|(key, value)| (key.clone(), value.key_value()))
                    .collect();
                json!({ "map": fields })
            }
        };
        value.to_string()
    }
}

impl From<&str> for Pattern {
    fn from(token: &str) -> Self {
        Pattern::Token(token.to_owned())
    }
}

impl From<String> for Pattern {
    fn from(token: String) -> Self {
        Pattern::Token(token)
    }
}

/// A concrete triggered name.
///
/// Shapes mirror [`Pattern`], but every value is concrete: wildcards are
/// unrepresentable on the trigger side.
#[derive(Debug, Clone, PartialEq)]
pub enum Name {
    /// Plain, undivided name token.
    Token(String),
    /// Ordered segment sequence (split from a delimited token).
    Segments(Vec<String>),
    /// Structured key/value name.
    Map(BTreeMap<String, Value>),
}

impl Name {
    /// Creates a token name.
    pub fn token(token: impl Into<String>) -> Self {
        Name::Token(token.into())
    }

    /// Creates a segment-sequence name.
    pub fn segments<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Name::Segments(parts.into_iter().map(Into::into).collect())
    }

    /// Creates a map name from key/value pairs.
    pub fn map<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Name::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a name from a JSON value.
    ///
    /// A string becomes a token, an array of strings a segment sequence,
    /// and an object a map name. `"*"` has no special meaning here.
    pub fn from_json(value: &Value) -> Result<Self, PatternError> {
        match value {
            Value::String(token) => Ok(Name::Token(token.clone())),
            Value::Array(items) => Ok(Name::Segments(string_items(items)?)),
            Value::Object(fields) => Ok(Name::Map(
                fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            other => Err(PatternError::unsupported(json_kind(other))),
        }
    }

    /// Splits a token name into segments when a delimiter is configured.
    ///
    /// Applied by `trigger` with the same rules `on` applies to patterns.
    pub fn normalized(self, delimiter: Option<&str>) -> Self {
        match (self, delimiter) {
            (Name::Token(token), Some(d)) if !d.is_empty() => {
                Name::Segments(token.split(d).map(str::to_owned).collect())
            }
            (name, _) => name,
        }
    }
}

impl From<&str> for Name {
    fn from(token: &str) -> Self {
        Name::Token(token.to_owned())
    }
}

impl From<String> for Name {
    fn from(token: String) -> Self {
        Name::Token(token)
    }
}

fn string_items(items: &[Value]) -> Result<Vec<String>, PatternError> {
    items
        .iter()
        .map(|item| match item {
            Value::String(segment) => Ok(segment.clone()),
            other => Err(PatternError::unsupported(json_kind(other))),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
