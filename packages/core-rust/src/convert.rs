//! Safe conversion of query and route strings into typed arguments.
//!
//! Only enumerations and a fixed set of primitive types can be produced
//! from raw request strings. Every other declared type is rejected, so
//! query or route input can never be coerced into arbitrary structured
//! types.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::BindError;
use crate::types::{ArgValue, EnumType, ParamType};

/// Converts `raw` into an argument of type `ty` for parameter `parameter`.
///
/// Nullable types convert as their underlying type.
///
/// # Errors
///
/// - [`BindError::UnsupportedParameterType`] when the underlying type is not
///   an enumeration or one of text, 32/64-bit integer, decimal, boolean,
///   timestamp or UUID.
/// - [`BindError::ParameterConversion`] when `raw` does not parse.
pub fn convert(parameter: &str, raw: &str, ty: &ParamType) -> Result<ArgValue, BindError> {
    let target = ty.underlying();
    let trimmed = raw.trim();

    let converted = match target {
        ParamType::Enum(e) => parse_enum(e, trimmed).map(ArgValue::Enum),
        ParamType::Text => Some(ArgValue::Text(raw.to_string())),
        ParamType::Int32 => trimmed.parse().ok().map(ArgValue::Int32),
        ParamType::Int64 => trimmed.parse().ok().map(ArgValue::Int64),
        ParamType::Decimal => parse_decimal(trimmed).map(ArgValue::Decimal),
        ParamType::Bool => parse_bool(trimmed).map(ArgValue::Bool),
        ParamType::Timestamp => parse_timestamp(trimmed).map(ArgValue::Timestamp),
        ParamType::Uuid => Uuid::parse_str(trimmed).ok().map(ArgValue::Uuid),
        ParamType::Float64
        | ParamType::Nullable(_)
        | ParamType::Object(_)
        | ParamType::Array(_) => {
            return Err(BindError::UnsupportedParameterType {
                parameter: parameter.to_string(),
                target: target.to_string(),
            });
        }
    };

    converted.ok_or_else(|| BindError::ParameterConversion {
        parameter: parameter.to_string(),
        target: target.to_string(),
        raw: raw.to_string(),
    })
}

fn parse_enum(e: &EnumType, raw: &str) -> Option<String> {
    e.variants
        .iter()
        .find(|variant| variant.eq_ignore_ascii_case(raw))
        .map(|variant| (*variant).to_string())
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Accepts RFC 3339, ISO date-time without offset (taken as UTC) and bare dates.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
