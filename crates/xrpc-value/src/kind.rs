//! Wire tags and the tag ↔ kind table.
//!
//! Decoder and encoder both go through [`Kind`]; nothing else in the
//! workspace spells a type tag.

/// `<boolean>`: `1`/`0`.
pub const BOOLEAN: &str = "boolean";

/// `<int>`: canonical integer tag. `i1`, `i2`, `i4` and `i8` are accepted aliases.
pub const INT: &str = "int";

/// `<double>`: decimal float text.
pub const DOUBLE: &str = "double";

/// `<string>`: escaped text.
pub const STRING: &str = "string";

/// `<dateTime.iso8601>`.
pub const DATE_TIME: &str = "dateTime.iso8601";

/// `<base64>`: standard base64 of raw bytes.
pub const BASE64: &str = "base64";

/// `<array>`: wraps `<data>` and a run of `<value>` elements.
pub const ARRAY: &str = "array";

/// `<struct>`: a run of `<member>` elements.
pub const STRUCT: &str = "struct";

/// `<value>`: the wrapper around every value.
pub const VALUE: &str = "value";

/// Integer aliases accepted on input.
const INT_ALIASES: [&str; 5] = [INT, "i1", "i2", "i4", "i8"];

/// The shape of a [`Value`](crate::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Boolean,
    Integer,
    Double,
    Text,
    Timestamp,
    Binary,
    List,
    Record,
    Fault,
}

impl Kind {
    /// The tag emitted on encode.
    ///
    /// A fault nested inside another value is written as a plain struct.
    pub fn wire_tag(self) -> &'static str {
        match self {
            Kind::Boolean => BOOLEAN,
            Kind::Integer => INT,
            Kind::Double => DOUBLE,
            Kind::Text => STRING,
            Kind::Timestamp => DATE_TIME,
            Kind::Binary => BASE64,
            Kind::List => ARRAY,
            Kind::Record | Kind::Fault => STRUCT,
        }
    }

    /// Resolve a tag found in value position.
    ///
    /// Returns `None` for anything that is not a value tag, including the
    /// `<value>` wrapper itself.
    pub fn from_wire_tag(tag: &str) -> Option<Kind> {
        match tag {
            BOOLEAN => Some(Kind::Boolean),
            DOUBLE => Some(Kind::Double),
            STRING => Some(Kind::Text),
            DATE_TIME => Some(Kind::Timestamp),
            BASE64 => Some(Kind::Binary),
            ARRAY => Some(Kind::List),
            STRUCT => Some(Kind::Record),
            t if INT_ALIASES.contains(&t) => Some(Kind::Integer),
            _ => None,
        }
    }

    /// Returns true for kinds whose wire body is character data.
    pub fn is_scalar(self) -> bool {
        !matches!(self, Kind::List | Kind::Record | Kind::Fault)
    }

    /// Human-readable name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Double => "double",
            Kind::Text => "string",
            Kind::Timestamp => "timestamp",
            Kind::Binary => "binary",
            Kind::List => "array",
            Kind::Record => "struct",
            Kind::Fault => "fault",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
