use crate::sql::{base::error::DbError, postgres::numeric::PgNumeric};
use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use model::core::value::Value;
use std::str::FromStr;
use tokio_postgres::types::Type;
use uuid::Uuid;

/// Adapts a source value to the parameter type the server inferred for the
/// target column.
///
/// Binary binding in tokio-postgres is strict (an `i32` will not bind to an
/// `int8` parameter), so values read from another engine are widened,
/// narrowed or parsed here. Types not listed are passed through untouched and
/// left for the driver to accept or reject.
pub(crate) fn coerce_to_type(value: Value, ty: &Type, index: usize) -> Result<Value, DbError> {
    if value.is_null() {
        return Ok(value);
    }

    let kind = value.kind();
    let fail = || DbError::Conversion {
        index,
        kind,
        target: ty.name().to_string(),
    };

    let coerced = match *ty {
        Type::BOOL => match value {
            Value::Boolean(_) => Some(value),
            Value::String(ref s) => parse_bool(s).map(Value::Boolean),
            ref other => other.as_i64().map(|v| Value::Boolean(v != 0)),
        },
        Type::INT2 => integral(&value)
            .and_then(|v| i16::try_from(v).ok())
            .map(Value::SmallInt),
        Type::INT4 => integral(&value)
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int32),
        Type::INT8 => integral(&value).map(Value::Int),
        Type::FLOAT4 => value.as_f64().map(|v| Value::Float32(v as f32)),
        Type::FLOAT8 => value.as_f64().map(Value::Float),
        Type::NUMERIC => match PgNumeric::special(&value) {
            Some(special) => Some(Value::String(special.to_string())),
            None => coerce_decimal(value),
        },
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => match value {
            Value::String(_) => Some(value),
            other => other.as_string().map(Value::String),
        },
        Type::JSON | Type::JSONB => match value {
            Value::Json(_) => Some(value),
            Value::String(s) => Some(Value::Json(
                serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s)),
            )),
            other => serde_json::to_value(other.to_string()).ok().map(Value::Json),
        },
        Type::UUID => match value {
            Value::Uuid(_) => Some(value),
            Value::String(s) => Uuid::parse_str(s.trim()).ok().map(Value::Uuid),
            Value::Bytes(b) => Uuid::from_slice(&b).ok().map(Value::Uuid),
            _ => None,
        },
        Type::BYTEA => match value {
            Value::Bytes(_) => Some(value),
            Value::String(s) => Some(Value::Bytes(s.into_bytes())),
            _ => None,
        },
        Type::DATE => match value {
            Value::Date(_) => Some(value),
            Value::TimestampNaive(ts) => Some(Value::Date(ts.date())),
            Value::Timestamp(ts) => Some(Value::Date(ts.date_naive())),
            Value::String(s) => NaiveDate::from_str(s.trim()).ok().map(Value::Date),
            _ => None,
        },
        Type::TIME => match value {
            Value::Time(_) => Some(value),
            Value::TimestampNaive(ts) => Some(Value::Time(ts.time())),
            Value::String(s) => NaiveTime::from_str(s.trim()).ok().map(Value::Time),
            _ => None,
        },
        Type::TIMESTAMP => match value {
            Value::TimestampNaive(_) => Some(value),
            Value::Timestamp(ts) => Some(Value::TimestampNaive(ts.naive_utc())),
            Value::Date(d) => Some(Value::TimestampNaive(d.and_time(NaiveTime::MIN))),
            Value::String(s) => parse_naive_timestamp(&s).map(Value::TimestampNaive),
            _ => None,
        },
        Type::TIMESTAMPTZ => match value {
            Value::Timestamp(_) => Some(value),
            Value::TimestampNaive(ts) => Some(Value::Timestamp(ts.and_utc())),
            Value::Date(d) => Some(Value::Timestamp(d.and_time(NaiveTime::MIN).and_utc())),
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|ts| ts.with_timezone(&Utc))
                .ok()
                .or_else(|| parse_naive_timestamp(&s).map(|ts| ts.and_utc()))
                .map(Value::Timestamp),
            _ => None,
        },
        _ => Some(value),
    };

    coerced.ok_or_else(fail)
}

/// Parameter types a coerced value binds to in binary form. Values for any
/// other parameter type are sent as text for the server to parse.
pub(crate) fn binds_natively(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::NUMERIC
            | Type::TEXT
            | Type::VARCHAR
            | Type::BPCHAR
            | Type::NAME
            | Type::JSON
            | Type::JSONB
            | Type::UUID
            | Type::BYTEA
            | Type::DATE
            | Type::TIME
            | Type::TIMESTAMP
            | Type::TIMESTAMPTZ
    )
}

/// Whole-number view of a value for integer columns. Decimals and floats
/// qualify when they have no fractional part, as the server's own assignment
/// cast would accept them.
fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Decimal(d) if d.with_scale(0) == *d => d.to_i64(),
        Value::Float(f) => float_to_i64(*f),
        Value::Float32(f) => float_to_i64(f64::from(*f)),
        other => other.as_i64(),
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; 2^63 is the first value out of range.
    (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < 9_223_372_036_854_775_808.0)
        .then_some(f as i64)
}

fn coerce_decimal(value: Value) -> Option<Value> {
    let decimal = match value {
        Value::Decimal(d) => d,
        Value::SmallInt(v) => BigDecimal::from(v),
        Value::Int32(v) => BigDecimal::from(v),
        Value::Int(v) => BigDecimal::from(v),
        Value::Uint(v) => BigDecimal::from(v),
        Value::Float32(v) => BigDecimal::from_f32(v)?,
        Value::Float(v) => BigDecimal::from_f64(v)?,
        Value::String(s) => BigDecimal::from_str(s.trim()).ok()?,
        _ => return None,
    };
    Some(Value::Decimal(decimal))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_naive_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_null_passes_through_any_type() {
        assert_eq!(coerce_to_type(Value::Null, &Type::INT8, 0).unwrap(), Value::Null);
        assert_eq!(coerce_to_type(Value::Null, &Type::UUID, 0).unwrap(), Value::Null);
    }

    #[test]
    fn test_integers_widen_and_narrow() {
        assert_eq!(
            coerce_to_type(Value::Int32(7), &Type::INT8, 0).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            coerce_to_type(Value::Int(42), &Type::INT2, 0).unwrap(),
            Value::SmallInt(42)
        );
    }

    #[test]
    fn test_integer_overflow_is_a_conversion_error() {
        let err = coerce_to_type(Value::Int(i64::MAX), &Type::INT4, 3).unwrap_err();
        match err {
            DbError::Conversion {
                index,
                kind,
                target,
            } => {
                assert_eq!(index, 3);
                assert_eq!(kind, "int");
                assert_eq!(target, "int4");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_integral_decimals_and_floats_narrow_to_integers() {
        assert_eq!(
            coerce_to_type(Value::Decimal(BigDecimal::from(42)), &Type::INT8, 0).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            coerce_to_type(
                Value::Decimal(BigDecimal::from_str("1200.00").unwrap()),
                &Type::INT4,
                0
            )
            .unwrap(),
            Value::Int32(1200)
        );
        assert_eq!(
            coerce_to_type(Value::Float(-3.0), &Type::INT2, 0).unwrap(),
            Value::SmallInt(-3)
        );
    }

    #[test]
    fn test_fractional_or_oversized_values_do_not_narrow() {
        let fractional = Value::Decimal(BigDecimal::from_str("42.5").unwrap());
        assert!(matches!(
            coerce_to_type(fractional, &Type::INT8, 1),
            Err(DbError::Conversion { index: 1, kind: "decimal", .. })
        ));
        assert!(coerce_to_type(Value::Float(0.25), &Type::INT4, 0).is_err());
        assert!(coerce_to_type(Value::Float(f64::NAN), &Type::INT8, 0).is_err());
        assert!(coerce_to_type(Value::Float(1e19), &Type::INT8, 0).is_err());

        let wide = Value::Decimal(BigDecimal::from_str("40000").unwrap());
        assert!(coerce_to_type(wide, &Type::INT2, 0).is_err());
    }

    #[test]
    fn test_numeric_special_values_are_kept() {
        assert_eq!(
            coerce_to_type(Value::String("NaN".into()), &Type::NUMERIC, 0).unwrap(),
            Value::String("NaN".into())
        );
        assert_eq!(
            coerce_to_type(Value::Float(f64::INFINITY), &Type::NUMERIC, 0).unwrap(),
            Value::String("Infinity".into())
        );
    }

    #[test]
    fn test_tinyint_flag_becomes_bool() {
        assert_eq!(
            coerce_to_type(Value::SmallInt(1), &Type::BOOL, 0).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            coerce_to_type(Value::String("off".into()), &Type::BOOL, 0).unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_numeric_from_int_and_string() {
        assert_eq!(
            coerce_to_type(Value::Int(10), &Type::NUMERIC, 0).unwrap(),
            Value::Decimal(BigDecimal::from(10))
        );
        assert_eq!(
            coerce_to_type(Value::String("12.50".into()), &Type::NUMERIC, 0).unwrap(),
            Value::Decimal(BigDecimal::from_str("12.50").unwrap())
        );
    }

    #[test]
    fn test_text_from_bytes_and_numbers() {
        assert_eq!(
            coerce_to_type(Value::Bytes(b"abc".to_vec()), &Type::TEXT, 0).unwrap(),
            Value::String("abc".into())
        );
        assert_eq!(
            coerce_to_type(Value::Int(5), &Type::VARCHAR, 0).unwrap(),
            Value::String("5".into())
        );
    }

    #[test]
    fn test_timestamps() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let midnight = date.and_time(NaiveTime::MIN);
        assert_eq!(
            coerce_to_type(Value::Date(date), &Type::TIMESTAMP, 0).unwrap(),
            Value::TimestampNaive(midnight)
        );
        assert_eq!(
            coerce_to_type(Value::TimestampNaive(midnight), &Type::TIMESTAMPTZ, 0).unwrap(),
            Value::Timestamp(midnight.and_utc())
        );
        assert_eq!(
            coerce_to_type(Value::String("2024-01-31 00:00:00".into()), &Type::TIMESTAMP, 0)
                .unwrap(),
            Value::TimestampNaive(midnight)
        );
    }

    #[test]
    fn test_json_from_string() {
        assert_eq!(
            coerce_to_type(Value::String(r#"{"a":1}"#.into()), &Type::JSONB, 0).unwrap(),
            Value::Json(serde_json::json!({"a": 1}))
        );
        assert_eq!(
            coerce_to_type(Value::String("plain".into()), &Type::JSON, 0).unwrap(),
            Value::Json(serde_json::Value::String("plain".into()))
        );
    }

    #[test]
    fn test_unparseable_uuid_fails() {
        assert!(coerce_to_type(Value::String("nope".into()), &Type::UUID, 0).is_err());
    }
}
