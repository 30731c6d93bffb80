//! Dynamic scheme input and the validated pattern => value model
//!
//! Scheme sources hand the compiler loosely typed values ([`SchemeValue`]). The
//! validator turns them into a [`TokenMap`], whose keys and values are the
//! closed [`PatternValue`] type.

use std::fmt;

/// A value as written in a scheme source
#[derive(Debug, Clone, PartialEq)]
pub enum SchemeValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<SchemeValue>),

    /// Ordered key-value pairs
    Map(Vec<(SchemeValue, SchemeValue)>),

    /// Anything the source format supports but a scheme never accepts
    Other { kind: String },
}

impl SchemeValue {
    /// Build a mapping from pairs
    pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<SchemeValue>,
        V: Into<SchemeValue>,
    {
        Self::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Build a sequence
    pub fn list<T: Into<SchemeValue>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// An empty mapping
    pub fn empty_map() -> Self {
        Self::Map(Vec::new())
    }

    /// Type name used in diagnostics
    pub fn kind(&self) -> &str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::List(_) => "sequence",
            Self::Map(_) => "mapping",
            Self::Other { kind } => kind,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Everything except `false` counts as set
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Bool(false))
    }
}

impl fmt::Display for SchemeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Bool(b) => write!(f, "{}", b),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
            Self::Other { kind } => write!(f, "<{}>", kind),
        }
    }
}

impl From<&str> for SchemeValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for SchemeValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for SchemeValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for SchemeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<SchemeValue>> From<Vec<T>> for SchemeValue {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl From<&PatternValue> for SchemeValue {
    fn from(value: &PatternValue) -> Self {
        match value {
            PatternValue::Scalar(s) => Self::Str(s.clone()),
            PatternValue::Group(items) => Self::List(items.iter().map(Self::from).collect()),
        }
    }
}

impl From<TokenMap> for SchemeValue {
    fn from(map: TokenMap) -> Self {
        Self::Map(
            map.iter()
                .map(|(k, v)| (SchemeValue::from(k), SchemeValue::from(v)))
                .collect(),
        )
    }
}

/// A validated key or value: a string, or a group of alternatives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternValue {
    Scalar(String),
    Group(Vec<PatternValue>),
}

impl PatternValue {
    pub fn scalar(s: impl Into<String>) -> Self {
        Self::Scalar(s.into())
    }

    pub fn group<T: Into<PatternValue>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Group(items.into_iter().map(Into::into).collect())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Group(_) => None,
        }
    }

    /// All strings, depth first
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Scalar(s) => out.push(s),
            Self::Group(items) => {
                for item in items {
                    item.collect_leaves(out);
                }
            }
        }
    }

    /// Apply `f` to every string, keeping the nesting
    pub fn map_leaves(&self, f: &impl Fn(&str) -> PatternValue) -> PatternValue {
        match self {
            Self::Scalar(s) => f(s),
            Self::Group(items) => Self::Group(items.iter().map(|i| i.map_leaves(f)).collect()),
        }
    }
}

impl fmt::Display for PatternValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&SchemeValue::from(self), f)
    }
}

impl From<&str> for PatternValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for PatternValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

/// Ordered pattern => value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    pairs: Vec<(PatternValue, PatternValue)>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<PatternValue>, value: impl Into<PatternValue>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PatternValue, &PatternValue)> {
        self.pairs.iter().map(|(k, v)| (k, v))
    }

    /// Value of the first pair with this key
    pub fn get(&self, key: &PatternValue) -> Option<&PatternValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<PatternValue>, V: Into<PatternValue>> FromIterator<(K, V)> for TokenMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
