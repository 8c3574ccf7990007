use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use crate::compare::{Compare, Walk, deep_equals_with};

/// A dynamically typed value.
///
/// Composites (lists, records and functions) are reference counted. Cloning a
/// value shares its composites, so a clone is _identical_ to the original.
/// Rebuilding a composite from scratch yields a value that is only
/// structurally equal.
///
/// A list and a record are never equal, not even a record whose keys are the
/// list's indices.
#[derive(Clone, Default)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A floating-point number.
    Number(f64),
    /// An immutable string.
    Text(Rc<str>),
    /// An ordered sequence of values, keyed by index.
    List(Rc<Vec<Value>>),
    /// A mapping from string keys to values.
    Record(Rc<BTreeMap<Rc<str>, Value>>),
    /// A function, only ever equal to itself.
    Function(Func),
}

/// A function stored in a [`Value`].
pub type Func = Rc<dyn Fn(&[Value]) -> Value>;

/// The runtime kind of a [`Value`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    Text,
    List,
    Record,
    Function,
}

impl Value {
    /// Create a list from values.
    pub fn list(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::List(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Create a record from key-value pairs.
    ///
    /// Later pairs overwrite earlier ones with the same key.
    pub fn record<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Rc<str>>,
        V: Into<Value>,
    {
        Self::Record(Rc::new(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }

    /// Wrap a function.
    pub fn function(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self::Function(Rc::new(f))
    }

    /// The kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Number(_) => Kind::Number,
            Self::Text(_) => Kind::Text,
            Self::List(_) => Kind::List,
            Self::Record(_) => Kind::Record,
            Self::Function(_) => Kind::Function,
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a list or a record.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::List(_) | Self::Record(_))
    }

    /// The number of own keys of a composite.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::List(list) => Some(list.len()),
            Self::Record(record) => Some(record.len()),
            _ => None,
        }
    }

    /// Look up a record field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Record(record) => record.get(key),
            _ => None,
        }
    }

    /// Look up a list item.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Self::List(list) => list.get(index),
            _ => None,
        }
    }

    /// Call a function value. Other values yield `None`.
    pub fn call(&self, args: &[Value]) -> Option<Value> {
        match self {
            Self::Function(f) => Some(f(args)),
            _ => None,
        }
    }
}

impl Compare for Value {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a.identical(b),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Record(a), Self::Record(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => a.shallow_eq(b),
            (Self::Record(a), Self::Record(b)) => a.shallow_eq(b),
            _ => self.identical(other),
        }
    }

    fn deep_eq(&self, other: &Self, walk: &mut Walk) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => deep_equals_with(a, b, walk),
            (Self::Record(a), Self::Record(b)) => deep_equals_with(a, b, walk),
            _ => self.identical(other),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Null => f.pad("null"),
            Self::Bool(v) => v.fmt(f),
            Self::Number(v) => v.fmt(f),
            Self::Text(v) => v.fmt(f),
            Self::List(v) => f.debug_list().entries(v.iter()).finish(),
            Self::Record(v) => f.debug_map().entries(v.iter()).finish(),
            Self::Function(_) => f.pad("<function>"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Number(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(Rc::new(v))
    }
}
