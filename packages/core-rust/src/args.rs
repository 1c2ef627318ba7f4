//! Bound argument lists and typed access to them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::OperationError;
use crate::types::ArgValue;

/// Arguments bound for one invocation, in declared parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<ArgValue>,
}

impl Args {
    #[must_use]
    pub fn new(values: Vec<ArgValue>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ArgValue] {
        &self.values
    }

    /// Argument at `index` converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::ArgumentMismatch`] if the argument is
    /// missing or of another kind.
    pub fn take<T: FromArg>(&self, index: usize) -> Result<T, OperationError> {
        let value = self.values.get(index).unwrap_or(&ArgValue::Null);
        T::from_arg(value).ok_or(OperationError::ArgumentMismatch {
            index,
            expected: T::EXPECTED,
            actual: value.kind(),
        })
    }

    /// Body argument at `index` deserialized into `T`. `None` when the body was absent.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::ArgumentMismatch`] if the argument is not a
    /// body, or [`OperationError::Internal`] if it does not deserialize.
    pub fn body<T: DeserializeOwned>(&self, index: usize) -> Result<Option<T>, OperationError> {
        match self.values.get(index) {
            None | Some(ArgValue::Null) => Ok(None),
            Some(ArgValue::Body(value)) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| OperationError::Internal(e.into())),
            Some(other) => Err(OperationError::ArgumentMismatch {
                index,
                expected: "body",
                actual: other.kind(),
            }),
        }
    }
}

impl From<Vec<ArgValue>> for Args {
    fn from(values: Vec<ArgValue>) -> Self {
        Self::new(values)
    }
}

/// Conversion from a bound [`ArgValue`] into a Rust type.
pub trait FromArg: Sized {
    /// Kind name reported on mismatch.
    const EXPECTED: &'static str;

    fn from_arg(value: &ArgValue) -> Option<Self>;
}

macro_rules! from_arg {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl FromArg for $ty {
            const EXPECTED: &'static str = $expected;

            fn from_arg(value: &ArgValue) -> Option<Self> {
                match value {
                    ArgValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

from_arg!(String, Text, "text");
from_arg!(i32, Int32, "int32");
from_arg!(i64, Int64, "int64");
from_arg!(Decimal, Decimal, "decimal");
from_arg!(bool, Bool, "bool");
from_arg!(DateTime<Utc>, Timestamp, "timestamp");
from_arg!(Uuid, Uuid, "uuid");
from_arg!(f64, Float64, "float64");
from_arg!(serde_json::Value, Body, "body");

/// Enum arguments surface as their canonical variant name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant(pub String);

impl FromArg for Variant {
    const EXPECTED: &'static str = "enum";

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Enum(name) => Some(Self(name.clone())),
            _ => None,
        }
    }
}

impl<T: FromArg> FromArg for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_arg(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Null => Some(None),
            other => T::from_arg(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        id: i64,
    }

    #[test]
    fn typed_access_by_index() {
        let args = Args::new(vec![
            ArgValue::Int32(30),
            ArgValue::Text("ada".to_string()),
            ArgValue::Null,
            ArgValue::Enum("High".to_string()),
        ]);
        assert_eq!(args.take::<i32>(0).unwrap(), 30);
        assert_eq!(args.take::<String>(1).unwrap(), "ada");
        assert_eq!(args.take::<Option<String>>(2).unwrap(), None);
        assert_eq!(args.take::<Option<i32>>(0).unwrap(), Some(30));
        assert_eq!(args.take::<Variant>(3).unwrap(), Variant("High".to_string()));
    }

    #[test]
    fn mismatch_reports_index_and_kinds() {
        let args = Args::new(vec![ArgValue::Bool(true)]);
        let err = args.take::<i64>(0).unwrap_err();
        assert!(matches!(
            err,
            OperationError::ArgumentMismatch {
                index: 0,
                expected: "int64",
                actual: "bool"
            }
        ));
        assert!(matches!(
            args.take::<i64>(5),
            Err(OperationError::ArgumentMismatch { actual: "null", .. })
        ));
    }

    #[test]
    fn body_deserializes_into_target_type() {
        let args = Args::new(vec![ArgValue::Body(json!({"id": 4})), ArgValue::Null]);
        assert_eq!(args.body::<Order>(0).unwrap(), Some(Order { id: 4 }));
        assert_eq!(args.body::<Order>(1).unwrap(), None);
    }

    #[test]
    fn body_of_wrong_shape_is_internal_error() {
        let args = Args::new(vec![ArgValue::Body(json!({"id": "x"})), ArgValue::Int32(1)]);
        assert!(matches!(args.body::<Order>(0), Err(OperationError::Internal(_))));
        assert!(matches!(
            args.body::<Order>(1),
            Err(OperationError::ArgumentMismatch { expected: "body", .. })
        ));
    }
}
