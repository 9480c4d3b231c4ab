//! The dynamic value universe specs operate over.
//!
//! The host language this engine was distilled from has no static type
//! system; Rust does, so every spec here works over one concrete sum type
//! instead of "any value". `Value` is deliberately small — it exists to
//! let specs describe shape, not to be a general-purpose data interchange
//! format.

use std::fmt;

/// A two-part symbolic identifier, `namespace/local`.
///
/// Registry keys, `req`/`opt` key-spec leaves, and `via` chains are all
/// qualified names. An empty `namespace` marks a name as unqualified;
/// `def` rejects those (spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct QualifiedName {
    pub namespace: String,
    pub local: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// An unqualified name, local part only. Valid as a key-spec leaf
    /// (matched against local parts in `req_un`/`opt_un`) but rejected by
    /// `def`.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            local: local.into(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        !self.namespace.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{}/{}", self.namespace, self.local)
        }
    }
}

/// An insertion-ordered association list standing in for a mapping.
///
/// A real hash map would require `Value` to implement `Hash`, which is
/// awkward for the `Float` variant; specs here only ever deal with small,
/// human-authored mappings, so linear lookup is the right trade.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderedMap(pub Vec<(Value, Value)>);

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Insert, overwriting an existing entry for `key` in place so that
    /// iteration order reflects first-occurrence position (used by
    /// `merge`'s last-wins semantics, spec.md §4.6).
    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Value, Value)> for OrderedMap {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        let mut m = OrderedMap::new();
        for (k, v) in iter {
            m.insert(k, v);
        }
        m
    }
}

/// Any value a spec can be asked to conform, explain, or generate.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "v")]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A bare symbolic value, e.g. the unit in `[2, :teaspoon]`.
    Symbol(QualifiedName),
    Seq(Vec<Value>),
    Map(OrderedMap),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Seq(_) => "seq",
            Value::Map(_) => "map",
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OrderedMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::Seq(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<QualifiedName> for Value {
    fn from(v: QualifiedName) -> Self {
        Value::Symbol(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn qualified_name_display() {
        assert_eq!(QualifiedName::new("ns", "local").to_string(), "ns/local");
        assert_eq!(QualifiedName::local("local").to_string(), "local");
    }

    #[test]
    fn unqualified_detection() {
        assert!(QualifiedName::new("ns", "x").is_qualified());
        assert!(!QualifiedName::local("x").is_qualified());
    }

    #[test]
    fn ordered_map_last_wins_in_place() {
        let mut m = OrderedMap::new();
        m.insert(Value::from("a"), Value::Int(1));
        m.insert(Value::from("b"), Value::Int(2));
        m.insert(Value::from("a"), Value::Int(3));
        assert_eq!(m.0, vec![
            (Value::from("a"), Value::Int(3)),
            (Value::from("b"), Value::Int(2)),
        ]);
    }
}
