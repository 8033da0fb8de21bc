//! Scalar kinds, display formats and cardinalities of schema members.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar kind of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    Float,
    Double,
    Bool,
    String,
    Enum,
    Date,
    Time,
    /// Name of a schema class, stored as text
    Class,
}

impl AttributeKind {
    /// Target-language type used for fields and accessors.
    pub fn cpp_type(self) -> &'static str {
        match self {
            Self::S8 => "int8_t",
            Self::U8 => "uint8_t",
            Self::S16 => "int16_t",
            Self::U16 => "uint16_t",
            Self::S32 => "int32_t",
            Self::U32 => "uint32_t",
            Self::S64 => "int64_t",
            Self::U64 => "uint64_t",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String | Self::Enum | Self::Date | Self::Time | Self::Class => "std::string",
        }
    }

    /// Whether the display format applies to this kind.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::S8 | Self::U8 | Self::S16 | Self::U16 | Self::S32 | Self::U32 | Self::S64 | Self::U64
        )
    }

    /// Store-write call used by the generated setter.
    ///
    /// Single-valued strings are written by reference; every other kind with a dedicated
    /// store representation gets its own call and the rest are written by value.
    pub fn store_setter(self, multi_value: bool) -> &'static str {
        match self {
            Self::String if !multi_value => "set_by_ref",
            Self::Enum => "set_enum",
            Self::Class => "set_class",
            Self::Date => "set_date",
            Self::Time => "set_time",
            _ => "set_by_val",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::S8 => "s8",
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::U16 => "u16",
            Self::S32 => "s32",
            Self::U32 => "u32",
            Self::S64 => "s64",
            Self::U64 => "u64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Enum => "enum",
            Self::Date => "date",
            Self::Time => "time",
            Self::Class => "class",
        };
        write!(f, "{name}")
    }
}

/// Numeric display format of an integer attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    Dec,
    Hex,
    Oct,
}

/// Lower bound of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowCardinality {
    #[default]
    Zero,
    One,
}

/// Upper bound of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighCardinality {
    #[default]
    One,
    Many,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpp_types() {
        assert_eq!(AttributeKind::S8.cpp_type(), "int8_t");
        assert_eq!(AttributeKind::U64.cpp_type(), "uint64_t");
        assert_eq!(AttributeKind::Bool.cpp_type(), "bool");
        assert_eq!(AttributeKind::Date.cpp_type(), "std::string");
        assert_eq!(AttributeKind::Class.cpp_type(), "std::string");
    }

    #[test]
    fn test_store_setter_variants() {
        assert_eq!(AttributeKind::String.store_setter(false), "set_by_ref");
        assert_eq!(AttributeKind::String.store_setter(true), "set_by_val");
        assert_eq!(AttributeKind::Enum.store_setter(true), "set_enum");
        assert_eq!(AttributeKind::Class.store_setter(false), "set_class");
        assert_eq!(AttributeKind::Date.store_setter(false), "set_date");
        assert_eq!(AttributeKind::Time.store_setter(false), "set_time");
        assert_eq!(AttributeKind::U32.store_setter(false), "set_by_val");
    }

    #[test]
    fn test_kind_deserializes_from_lowercase() {
        let kind: AttributeKind = serde_json::from_str("\"u16\"").unwrap();
        assert_eq!(kind, AttributeKind::U16);
        assert_eq!(kind.to_string(), "u16");
        assert!(kind.is_integer());
        assert!(!AttributeKind::Double.is_integer());
    }
}
