use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HTTP verb an operation is exposed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    /// Returns the canonical upper-case method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the value an operation hands back to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnShape {
    /// No return value.
    Unit,
    /// A plain synchronous value.
    Value,
    /// An awaitable with no payload.
    Deferred,
    /// An awaitable carrying a payload.
    DeferredValue,
}

/// Classification of an object type, mirroring which types can be
/// materialized from a JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A concrete data type that can be deserialized.
    Concrete,
    /// An abstract base type.
    Abstract,
    /// An interface or trait object.
    Interface,
    /// A callback or function type.
    Delegate,
}

/// Declared shape of a structured parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    pub name: &'static str,
    pub kind: ObjectKind,
    /// Canonical field names; incoming body keys are matched against these
    /// ignoring ASCII case.
    pub fields: &'static [&'static str],
}

impl ObjectType {
    /// A concrete body-capable type with the given canonical field names.
    #[must_use]
    pub const fn concrete(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: ObjectKind::Concrete,
            fields,
        }
    }

    /// An interface type. Never bound from a body.
    #[must_use]
    pub const fn interface(name: &'static str) -> Self {
        Self {
            name,
            kind: ObjectKind::Interface,
            fields: &[],
        }
    }
}

/// Declared enumeration: its name and variant names in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

/// Closed set of parameter types an operation may declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Text,
    Int32,
    Int64,
    Decimal,
    Bool,
    Timestamp,
    Uuid,
    /// Binary floating point. A value type, but outside the conversion whitelist.
    Float64,
    Enum(EnumType),
    Nullable(Box<ParamType>),
    Object(ObjectType),
    Array(Box<ParamType>),
}

impl ParamType {
    /// Wraps `inner` as nullable.
    #[must_use]
    pub fn nullable(inner: ParamType) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// An array of `element`.
    #[must_use]
    pub fn array(element: ParamType) -> Self {
        Self::Array(Box::new(element))
    }

    /// The underlying type of a nullable, or `self`.
    #[must_use]
    pub fn underlying(&self) -> &ParamType {
        match self {
            Self::Nullable(inner) => inner.underlying(),
            other => other,
        }
    }

    /// Value types get a zero value when nothing binds; everything else gets null.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            Self::Int32
                | Self::Int64
                | Self::Decimal
                | Self::Bool
                | Self::Timestamp
                | Self::Uuid
                | Self::Float64
                | Self::Enum(_)
        )
    }

    /// Whether a parameter of this type can be materialized from a JSON body.
    ///
    /// Only concrete object types and arrays qualify, nullable or not.
    /// Primitives, text, enums and non-concrete object kinds never do.
    #[must_use]
    pub fn is_body_eligible(&self) -> bool {
        match self.underlying() {
            Self::Object(object) => object.kind == ObjectKind::Concrete,
            Self::Array(_) => true,
            _ => false,
        }
    }

    /// The zero value handed to a parameter no request source supplied.
    #[must_use]
    pub fn zero_value(&self) -> ArgValue {
        match self {
            Self::Int32 => ArgValue::Int32(0),
            Self::Int64 => ArgValue::Int64(0),
            Self::Decimal => ArgValue::Decimal(Decimal::ZERO),
            Self::Bool => ArgValue::Bool(false),
            Self::Timestamp => ArgValue::Timestamp(DateTime::<Utc>::default()),
            Self::Uuid => ArgValue::Uuid(Uuid::nil()),
            Self::Float64 => ArgValue::Float64(0.0),
            Self::Enum(e) => e
                .variants
                .first()
                .map_or(ArgValue::Null, |v| ArgValue::Enum((*v).to_string())),
            Self::Text | Self::Nullable(_) | Self::Object(_) | Self::Array(_) => ArgValue::Null,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("String"),
            Self::Int32 => f.write_str("Int32"),
            Self::Int64 => f.write_str("Int64"),
            Self::Decimal => f.write_str("Decimal"),
            Self::Bool => f.write_str("Boolean"),
            Self::Timestamp => f.write_str("DateTime"),
            Self::Uuid => f.write_str("Guid"),
            Self::Float64 => f.write_str("Double"),
            Self::Enum(e) => f.write_str(e.name),
            Self::Nullable(inner) => write!(f, "{inner}?"),
            Self::Object(o) => f.write_str(o.name),
            Self::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// A bound argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Null,
    Text(String),
    Int32(i32),
    Int64(i64),
    Decimal(Decimal),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Float64(f64),
    /// Canonical variant name of an enumeration.
    Enum(String),
    /// Structured JSON body.
    Body(serde_json::Value),
}

impl ArgValue {
    /// Short name of the variant, used in mismatch diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Decimal(_) => "decimal",
            Self::Bool(_) => "bool",
            Self::Timestamp(_) => "timestamp",
            Self::Uuid(_) => "uuid",
            Self::Float64(_) => "float64",
            Self::Enum(_) => "enum",
            Self::Body(_) => "body",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOR: EnumType = EnumType {
        name: "Color",
        variants: &["Red", "Green"],
    };

    #[test]
    fn value_types_get_zero_values() {
        assert_eq!(ParamType::Int32.zero_value(), ArgValue::Int32(0));
        assert_eq!(ParamType::Int64.zero_value(), ArgValue::Int64(0));
        assert_eq!(ParamType::Bool.zero_value(), ArgValue::Bool(false));
        assert_eq!(ParamType::Uuid.zero_value(), ArgValue::Uuid(Uuid::nil()));
        assert_eq!(
            ParamType::Decimal.zero_value(),
            ArgValue::Decimal(Decimal::ZERO)
        );
        assert_eq!(
            ParamType::Enum(COLOR).zero_value(),
            ArgValue::Enum("Red".to_string())
        );
    }

    #[test]
    fn reference_and_nullable_types_get_null() {
        assert!(ParamType::Text.zero_value().is_null());
        assert!(ParamType::nullable(ParamType::Int32).zero_value().is_null());
        assert!(ParamType::array(ParamType::Int32).zero_value().is_null());
        assert!(ParamType::Object(ObjectType::concrete("Order", &["id"]))
            .zero_value()
            .is_null());
    }

    #[test]
    fn body_eligibility_is_limited_to_concrete_objects_and_arrays() {
        assert!(ParamType::Object(ObjectType::concrete("Order", &[])).is_body_eligible());
        assert!(ParamType::array(ParamType::Text).is_body_eligible());
        assert!(!ParamType::Object(ObjectType::interface("IFilter")).is_body_eligible());
        assert!(!ParamType::Object(ObjectType {
            name: "Callback",
            kind: ObjectKind::Delegate,
            fields: &[],
        })
        .is_body_eligible());
        assert!(!ParamType::Text.is_body_eligible());
        assert!(!ParamType::Int64.is_body_eligible());
        assert!(!ParamType::Enum(COLOR).is_body_eligible());
    }

    #[test]
    fn nullable_concrete_object_stays_body_eligible() {
        let order = ParamType::Object(ObjectType::concrete("Order", &[]));
        assert!(ParamType::nullable(order).is_body_eligible());
        assert!(!ParamType::nullable(ParamType::Int32).is_body_eligible());
        assert!(!ParamType::nullable(ParamType::Object(ObjectType::interface("IFilter")))
            .is_body_eligible());
    }

    #[test]
    fn underlying_unwraps_nested_nullables() {
        let ty = ParamType::nullable(ParamType::nullable(ParamType::Int64));
        assert_eq!(ty.underlying(), &ParamType::Int64);
        assert_eq!(ParamType::Text.underlying(), &ParamType::Text);
    }

    #[test]
    fn display_names_match_declared_types() {
        assert_eq!(ParamType::Int32.to_string(), "Int32");
        assert_eq!(ParamType::nullable(ParamType::Uuid).to_string(), "Guid?");
        assert_eq!(ParamType::array(ParamType::Text).to_string(), "String[]");
        assert_eq!(Verb::Post.to_string(), "POST");
    }
}
