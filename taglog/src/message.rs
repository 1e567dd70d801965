use std::{borrow::Cow, fmt};

use crate::Level;

/// One component of a message namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    /// The cumulative path up to and including this segment, e.g. `":app:db"`.
    ///
    /// This is the key under which timing information is recorded.
    pub id: String,
    /// The name of this path component, e.g. `"db"`
    pub name: String,
    /// Milliseconds since the last message sharing [`Segment::id`], or `0` if there was none.
    pub diff: i64,
}

impl Segment {
    /// Create a segment named `name` nested under the segment whose id is `parent`.
    ///
    /// The root of a namespace has the empty string as its parent id.
    pub fn under(parent: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut id = String::with_capacity(parent.len() + name.len() + 1);
        id.push_str(parent);
        id.push(':');
        id.push_str(&name);
        Self { id, name, diff: 0 }
    }
}

/// A flat label attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Always `"+" + name`, so tag ids never collide with segment ids
    pub id: String,
    /// The tag name
    pub name: String,
    /// Milliseconds since the last message carrying this tag, or `0` if there was none.
    pub diff: i64,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("+{name}"),
            name,
            diff: 0,
        }
    }
}

/// The ordered segments of a message, outermost first.
pub type Namespace = Vec<Segment>;

/// The deduplicated, sorted tags of a message.
pub type Tags = Vec<Tag>;

/// A single log message as it flows through the plugin pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Milliseconds since the Unix epoch at which the message was emitted
    pub time: i64,
    pub level: Level,
    pub namespace: Namespace,
    pub tags: Tags,
    /// Arbitrary values supplied at the call site.
    ///
    /// When the first value is a string, rendering transports treat it as a format string for
    /// the values that follow it.
    pub payload: Vec<Value>,
}

impl Message {
    /// The namespace path of this message without the leading separator, e.g. `"app:db"`.
    ///
    /// Returns the empty string for a message without a namespace.
    pub fn path(&self) -> &str {
        self.namespace
            .last()
            .map(|segment| segment.id.strip_prefix(':').unwrap_or(&segment.id))
            .unwrap_or("")
    }

    /// A human-readable identifier for the prefix and tag signature of this message.
    ///
    /// The marker is the id of the deepest segment, followed by ` +` and the comma-separated tag
    /// names, e.g. `":app:db +slow, sql"`. The ` +` is omitted when there are no tags.
    pub fn marker(&self) -> String {
        let id = self.namespace.last().map(|segment| segment.id.as_str()).unwrap_or("");
        let tags = self.tags.iter().map(|tag| tag.name.as_str()).collect::<Vec<_>>().join(", ");
        match (id.is_empty(), tags.is_empty()) {
            (_, true) => id.to_string(),
            (true, false) => format!("+{tags}"),
            (false, false) => format!("{id} +{tags}"),
        }
    }

    /// Returns true if this message carries a tag named `name`
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }
}

/// A dynamically-typed payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    /// The `Debug` rendering of some value, captured at the call site
    Debug(String),
}

impl Value {
    /// Capture the `Debug` representation of `value`
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self::Debug(format!("{value:?}"))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => fmt::Display::fmt(value, f),
            Self::I64(value) => fmt::Display::fmt(value, f),
            Self::U64(value) => fmt::Display::fmt(value, f),
            Self::F64(value) => fmt::Display::fmt(value, f),
            Self::Str(value) | Self::Debug(value) => f.write_str(value),
        }
    }
}

macro_rules! value_from {
    ($variant:ident as $repr:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value as $repr)
                }
            }
        )+
    };
}

value_from!(I64 as i64: i8, i16, i32, i64, isize);
value_from!(U64 as u64: u8, u16, u32, u64, usize);
value_from!(F64 as f64: f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(value: Cow<'_, str>) -> Self {
        Self::Str(value.into_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Build a payload vector from heterogeneous values.
///
/// Each argument is converted with [`Value::from`].
///
/// ```
/// use taglog::{Value, payload};
///
/// let payload = payload!["took %dms", 12, true];
/// assert_eq!(payload, vec![Value::from("took %dms"), Value::I64(12), Value::Bool(true)]);
/// ```
#[macro_export]
macro_rules! payload {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
