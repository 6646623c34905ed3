//! The label tree.
//!
//! A parsed label is a [`Module`]: an insertion-ordered multi-valued
//! mapping from parameter names to [`Value`]s. Aggregation blocks are
//! values too ([`Value::Block`]), each carrying a nested `Module`, so a
//! label is a tree of modules. A block's name is its key in the parent
//! module; the parser enforces begin/end name agreement before the tree
//! is built.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use pvl_util::{KeyNotFound, OrderedMultiMap};

/// Which keyword family delimits an aggregation block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Object,
    Group,
}

/// An aggregation block: its kind plus the statements inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub body: Module,
}

impl Block {
    /// Creates an empty block of the given kind.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            body: Module::new(),
        }
    }
}

/// A `base#digits#` literal with its raw digit run preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasedInteger {
    /// Radix, 2 through 16.
    pub base: u32,
    /// The digit run between the octothorpes, verbatim.
    pub digits: String,
    /// Whether a leading `-` was written.
    pub negative: bool,
    /// The decoded magnitude with the sign applied.
    pub value: i64,
}

/// A value paired with a units string, written `value <units>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    pub value: Box<Value>,
    /// Never empty; the parser rejects `<>` and `< >`.
    pub units: String,
}

/// A clock time, timezone-aware or naive depending on what the label
/// wrote and what the dialect mandates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PvlTime {
    Naive(NaiveTime),
    Aware { time: NaiveTime, offset: FixedOffset },
}

impl PvlTime {
    /// The timezone offset, if the time carries one.
    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            PvlTime::Naive(_) => None,
            PvlTime::Aware { offset, .. } => Some(*offset),
        }
    }
}

/// A combined date and time, aware or naive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PvlDateTime {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl PvlDateTime {
    /// The timezone offset, if the date-time carries one.
    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            PvlDateTime::Naive(_) => None,
            PvlDateTime::Aware(dt) => Some(*dt.offset()),
        }
    }
}

/// One value in a label.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A parameter written `name =` with no value; carries the source
    /// line for diagnosis. Only the Omni dialect produces these.
    Empty { line: u32 },
    /// An explicit null word.
    Null,
    Boolean(bool),
    Integer(i64),
    BasedInteger(BasedInteger),
    Real(f64),
    /// A double-quoted text string.
    String(String),
    /// An unquoted or single-quoted symbol.
    Symbol(String),
    Date(NaiveDate),
    Time(PvlTime),
    DateTime(PvlDateTime),
    Quantity(Quantity),
    /// Unordered collection, written `{...}`.
    Set(Vec<Value>),
    /// Ordered collection, written `(...)`; may nest.
    Sequence(Vec<Value>),
    /// A nested aggregation block.
    Block(Block),
}

impl Value {
    /// A symbol value.
    pub fn symbol(text: impl Into<String>) -> Value {
        Value::Symbol(text.into())
    }

    /// A text-string value.
    pub fn string(text: impl Into<String>) -> Value {
        Value::String(text.into())
    }

    /// A quantity value.
    pub fn quantity(value: Value, units: impl Into<String>) -> Value {
        Value::Quantity(Quantity {
            value: Box::new(value),
            units: units.into(),
        })
    }

    /// A short name for the value's variant, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Empty { .. } => "empty",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::BasedInteger(_) => "based integer",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "date-time",
            Value::Quantity(_) => "quantity",
            Value::Set(_) => "set",
            Value::Sequence(_) => "sequence",
            Value::Block(_) => "aggregation block",
        }
    }

    /// The integer payload, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::BasedInteger(b) => Some(b.value),
            _ => None,
        }
    }

    /// The text payload of a string or symbol.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// The nested block, if this is one.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Value::Block(b) => Some(b),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Boolean(v)
    }
}

/// The top-level container of a label, and the body of every block.
///
/// Duplicate parameter names are retained in order; lookups return the
/// first occurrence. Equality is structural and order-sensitive.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Module {
    entries: OrderedMultiMap<String, Value>,
}

impl Module {
    /// Creates an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of statements, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the module holds no statements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first value under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// The first value under `key`, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Every value under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Value> + 'a {
        self.entries.get_all(key)
    }

    /// The first block under `key`, if that value is a block.
    pub fn get_block(&self, key: &str) -> Option<&Block> {
        self.get(key).and_then(Value::as_block)
    }

    /// Whether `key` occurs at this level.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Appends a statement, keeping earlier occurrences of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: Value) {
        self.entries.append(key.into(), value);
    }

    /// Inserts a statement before the first occurrence of `anchor`.
    pub fn insert_before(
        &mut self,
        anchor: &str,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), KeyNotFound> {
        self.entries.insert_before(anchor, key.into(), value)
    }

    /// Inserts a statement after the first occurrence of `anchor`.
    pub fn insert_after(
        &mut self,
        anchor: &str,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), KeyNotFound> {
        self.entries.insert_after(anchor, key.into(), value)
    }

    /// Replaces the value at every occurrence of `key`; returns how many.
    pub fn replace_all(&mut self, key: &str, value: Value) -> usize {
        self.entries.replace_all(key, value)
    }

    /// Removes the first occurrence of `key`.
    pub fn remove_first(&mut self, key: &str) -> Option<Value> {
        self.entries.remove_first(key)
    }

    /// Removes every occurrence of `key`.
    pub fn remove_all(&mut self, key: &str) -> Vec<Value> {
        self.entries.remove_all(key)
    }

    /// The statement at `position` in source order.
    pub fn get_index(&self, position: usize) -> Option<(&String, &Value)> {
        self.entries.get_index(position)
    }

    /// Statements in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// The ordered statement list, for positional and sliced access.
    pub fn as_slice(&self) -> &[(String, Value)] {
        self.entries.as_slice()
    }
}

impl std::ops::Index<usize> for Module {
    type Output = (String, Value);

    fn index(&self, position: usize) -> &(String, Value) {
        &self.entries[position]
    }
}

impl FromIterator<(String, Value)> for Module {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, Value)> for Module {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Object => f.write_str("OBJECT"),
            BlockKind::Group => f.write_str("GROUP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_preserves_duplicates_in_order() {
        let mut module = Module::new();
        module.append("a", Value::from(1));
        module.append("b", Value::from(2));
        module.append("a", Value::from(3));

        assert_eq!(module.get("a"), Some(&Value::Integer(1)));
        assert_eq!(module.get_all("a").count(), 2);
        let keys: Vec<&str> = module.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_positional_access() {
        let module: Module = [
            ("x".to_string(), Value::from(1)),
            ("y".to_string(), Value::from(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(module[1].0, "y");
        assert_eq!(module.get_index(0), Some((&"x".to_string(), &Value::Integer(1))));
        assert_eq!(module.as_slice()[1..].len(), 1);
    }

    #[test]
    fn test_block_access() {
        let mut inner = Module::new();
        inner.append("lines", Value::from(1024));
        let mut module = Module::new();
        module.append(
            "IMAGE",
            Value::Block(Block {
                kind: BlockKind::Object,
                body: inner,
            }),
        );

        let block = module.get_block("IMAGE").unwrap();
        assert_eq!(block.kind, BlockKind::Object);
        assert_eq!(block.body.get("lines"), Some(&Value::Integer(1024)));
        assert!(module.get_block("missing").is_none());
    }

    #[test]
    fn test_structural_equality_is_order_sensitive() {
        let a: Module = [
            ("x".to_string(), Value::from(1)),
            ("y".to_string(), Value::from(2)),
        ]
        .into_iter()
        .collect();
        let b: Module = [
            ("y".to_string(), Value::from(2)),
            ("x".to_string(), Value::from(1)),
        ]
        .into_iter()
        .collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_value_helpers() {
        assert_eq!(Value::from(5).as_integer(), Some(5));
        assert_eq!(Value::symbol("N/A").as_str(), Some("N/A"));
        assert_eq!(Value::from(1.5).kind_name(), "real");
        let q = Value::quantity(Value::from(42), "m/s");
        match q {
            Value::Quantity(q) => {
                assert_eq!(*q.value, Value::Integer(42));
                assert_eq!(q.units, "m/s");
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_mutation_operations() {
        let mut module = Module::new();
        module.append("a", Value::from(1));
        module.append("c", Value::from(3));
        module.insert_after("a", "b", Value::from(2)).unwrap();
        module.insert_before("a", "zero", Value::from(0)).unwrap();
        let keys: Vec<&str> = module.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zero", "a", "b", "c"]);

        assert_eq!(module.remove_first("zero"), Some(Value::Integer(0)));
        assert_eq!(module.replace_all("b", Value::from(20)), 1);
        assert_eq!(module.get("b"), Some(&Value::Integer(20)));
    }
}
