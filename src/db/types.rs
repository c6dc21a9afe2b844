//! Row to JSON conversion.
//!
//! Column values are decoded in two steps:
//! 1. `TypeCategory` classifies the column's type name.
//! 2. A per-backend decoder extracts the value for that category.
//!
//! The decoders for MySQL, PostgreSQL and SQLite only differ in how they
//! handle DECIMAL columns and the integer widths they accept, so they are
//! generated by one macro.

use crate::models::{ColumnMetadata, DatabaseType};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Temporal,
    Binary,
    Json,
    Text,
    Unknown,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.to_lowercase();

    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if db == DatabaseType::SQLite {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.starts_with("time")
        || lower == "date"
        || lower == "datetime"
    {
        return TypeCategory::Temporal;
    }

    if (lower.contains("int") && !lower.contains("interval") && !lower.contains("point"))
        || lower.contains("serial")
    {
        return TypeCategory::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    if lower.contains("char") || lower.contains("text") || lower == "uuid" || lower == "name" {
        return TypeCategory::Text;
    }

    // SQLite reports "NULL" for expression columns without a declared type
    TypeCategory::Unknown
}

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

/// Encode binary column data as base64 text.
pub fn encode_binary(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    JsonValue::String(STANDARD.encode(bytes))
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue>;
    fn column_metadata(&self) -> Vec<ColumnMetadata>;
}

macro_rules! decode_as {
    ($row:expr, $idx:expr, $ty:ty) => {
        $row.try_get::<$ty, _>($idx).ok()
    };
}

macro_rules! decode_temporal {
    ($row:expr, $idx:expr) => {
        decode_as!($row, $idx, chrono::DateTime<chrono::Utc>)
            .map(|v| JsonValue::String(v.to_rfc3339()))
            .or_else(|| decode_as!($row, $idx, chrono::NaiveDateTime).map(|v| JsonValue::String(v.to_string())))
            .or_else(|| decode_as!($row, $idx, chrono::NaiveDate).map(|v| JsonValue::String(v.to_string())))
            .or_else(|| decode_as!($row, $idx, chrono::NaiveTime).map(|v| JsonValue::String(v.to_string())))
            .or_else(|| decode_as!($row, $idx, String).map(JsonValue::String))
    };
}

/// Generates `RowToJson` for one backend row type.
///
/// `decimal` decodes DECIMAL/NUMERIC columns; `integer_fallback` is tried
/// after the signed widths every backend shares.
macro_rules! impl_row_to_json {
    ($row:ty, $db:expr, decimal: $decimal:expr, integer_fallback: $fallback:expr $(,)?) => {
        impl RowToJson for $row {
            fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
                let decimal: fn(&$row, usize) -> Option<JsonValue> = $decimal;
                let integer_fallback: fn(&$row, usize) -> Option<JsonValue> = $fallback;

                self.columns()
                    .iter()
                    .map(|col| {
                        let idx = col.ordinal();
                        let is_null = self.try_get_raw(idx).map(|v| v.is_null()).unwrap_or(true);
                        if is_null {
                            return (col.name().to_string(), JsonValue::Null);
                        }

                        let type_name = col.type_info().name();
                        let value = match categorize_type(type_name, $db) {
                            TypeCategory::Integer => decode_as!(self, idx, i64)
                                .map(JsonValue::from)
                                .or_else(|| decode_as!(self, idx, i32).map(JsonValue::from))
                                .or_else(|| decode_as!(self, idx, i16).map(JsonValue::from))
                                .or_else(|| integer_fallback(self, idx)),
                            TypeCategory::Float => decode_as!(self, idx, f64)
                                .or_else(|| decode_as!(self, idx, f32).map(f64::from))
                                .map(float_value),
                            TypeCategory::Decimal => decimal(self, idx),
                            TypeCategory::Boolean => decode_as!(self, idx, bool).map(JsonValue::Bool),
                            TypeCategory::Temporal => decode_temporal!(self, idx),
                            TypeCategory::Binary => {
                                decode_as!(self, idx, Vec<u8>).map(|v| encode_binary(&v))
                            }
                            TypeCategory::Json => decode_as!(self, idx, JsonValue).or_else(|| {
                                decode_as!(self, idx, String).map(|s| {
                                    serde_json::from_str(&s).unwrap_or(JsonValue::String(s))
                                })
                            }),
                            TypeCategory::Text => decode_as!(self, idx, String).map(JsonValue::String),
                            TypeCategory::Unknown => decode_as!(self, idx, i64)
                                .map(JsonValue::from)
                                .or_else(|| decode_as!(self, idx, f64).map(float_value))
                                .or_else(|| decode_as!(self, idx, String).map(JsonValue::String))
                                .or_else(|| {
                                    decode_as!(self, idx, Vec<u8>).map(|v| encode_binary(&v))
                                }),
                        };

                        if value.is_none() {
                            tracing::debug!(
                                column = %col.name(),
                                type_name = %type_name,
                                "Unsupported column value, returning null"
                            );
                        }
                        (col.name().to_string(), value.unwrap_or(JsonValue::Null))
                    })
                    .collect()
            }

            fn column_metadata(&self) -> Vec<ColumnMetadata> {
                self.columns()
                    .iter()
                    .map(|col| ColumnMetadata::new(col.name(), col.type_info().name()))
                    .collect()
            }
        }
    };
}

impl_row_to_json!(
    MySqlRow,
    DatabaseType::MySQL,
    decimal: |row, idx| decode_as!(row, idx, RawDecimal).map(|v| JsonValue::String(v.0)),
    integer_fallback: |row, idx| {
        decode_as!(row, idx, i8)
            .map(JsonValue::from)
            .or_else(|| decode_as!(row, idx, u8).map(JsonValue::from))
            .or_else(|| decode_as!(row, idx, u16).map(JsonValue::from))
            .or_else(|| decode_as!(row, idx, u32).map(JsonValue::from))
            .or_else(|| decode_as!(row, idx, u64).map(JsonValue::from))
    },
);

impl_row_to_json!(
    PgRow,
    DatabaseType::PostgreSQL,
    decimal: |row, idx| decode_as!(row, idx, RawDecimal).map(|v| JsonValue::String(v.0)),
    integer_fallback: |_, _| None,
);

impl_row_to_json!(
    SqliteRow,
    DatabaseType::SQLite,
    decimal: |row, idx| decode_as!(row, idx, f64).map(float_value),
    integer_fallback: |_, _| None,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(
            categorize_type("INT", DatabaseType::MySQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("BIGINT", DatabaseType::PostgreSQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("SERIAL", DatabaseType::PostgreSQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INTEGER", DatabaseType::SQLite),
            TypeCategory::Integer
        );
    }

    #[test]
    fn test_categorize_type_not_integer() {
        assert_eq!(
            categorize_type("INTERVAL", DatabaseType::PostgreSQL),
            TypeCategory::Unknown
        );
        assert_eq!(
            categorize_type("POINT", DatabaseType::PostgreSQL),
            TypeCategory::Unknown
        );
        assert_eq!(
            categorize_type("TINYTEXT", DatabaseType::MySQL),
            TypeCategory::Text
        );
    }

    #[test]
    fn test_categorize_type_decimal() {
        assert_eq!(
            categorize_type("DECIMAL", DatabaseType::MySQL),
            TypeCategory::Decimal
        );
        assert_eq!(
            categorize_type("NUMERIC", DatabaseType::PostgreSQL),
            TypeCategory::Decimal
        );
        assert_eq!(
            categorize_type("numeric", DatabaseType::SQLite),
            TypeCategory::Float
        );
    }

    #[test]
    fn test_categorize_type_temporal_and_json() {
        assert_eq!(
            categorize_type("TIMESTAMPTZ", DatabaseType::PostgreSQL),
            TypeCategory::Temporal
        );
        assert_eq!(
            categorize_type("DATETIME", DatabaseType::MySQL),
            TypeCategory::Temporal
        );
        assert_eq!(
            categorize_type("jsonb", DatabaseType::PostgreSQL),
            TypeCategory::Json
        );
        assert_eq!(
            categorize_type("NULL", DatabaseType::SQLite),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_encode_binary() {
        assert_eq!(
            encode_binary(b"hello world"),
            JsonValue::String("aGVsbG8gd29ybGQ=".to_string())
        );
        assert_eq!(encode_binary(&[]), JsonValue::String(String::new()));
    }

    #[test]
    fn test_float_value_non_finite() {
        assert_eq!(float_value(1.5), serde_json::json!(1.5));
        assert_eq!(float_value(f64::NAN), JsonValue::String("NaN".to_string()));
    }
}
