use crate::sql::base::error::DbError;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use model::{core::value::Value, records::row::Row};
use mysql_async::{Column, Row as MySqlRow, Value as MySqlValue, consts::ColumnType};
use std::str::FromStr;
use tracing::warn;

/// Collation id MySQL reports for binary strings and blobs.
const BINARY_CHARSET: u16 = 63;

pub(crate) fn convert_row(row: MySqlRow) -> Result<Row, DbError> {
    let columns = row.columns();
    let raw = row.unwrap_raw();
    let mut values = Vec::with_capacity(raw.len());
    for (column, value) in columns.iter().zip(raw) {
        // `None` only appears for values already taken out of the row.
        let value = value.ok_or_else(|| {
            DbError::Unknown(format!("Value for column '{}' was consumed", column.name_str()))
        })?;
        values.push(convert_value(column, value)?);
    }
    Ok(Row::new(values))
}

fn convert_value(column: &Column, value: MySqlValue) -> Result<Value, DbError> {
    let column_type = column.column_type();
    let value = match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(v) => match column_type {
            ColumnType::MYSQL_TYPE_TINY | ColumnType::MYSQL_TYPE_SHORT | ColumnType::MYSQL_TYPE_YEAR => {
                i16::try_from(v).map_or(Value::Int(v), Value::SmallInt)
            }
            ColumnType::MYSQL_TYPE_LONG | ColumnType::MYSQL_TYPE_INT24 => {
                i32::try_from(v).map_or(Value::Int(v), Value::Int32)
            }
            _ => Value::Int(v),
        },
        MySqlValue::UInt(v) => Value::Uint(v),
        MySqlValue::Float(v) => Value::Float32(v),
        MySqlValue::Double(v) => Value::Float(v),
        MySqlValue::Bytes(bytes) => convert_bytes(column, bytes)?,
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            let time = NaiveTime::from_hms_micro_opt(
                hour as u32,
                minute as u32,
                second as u32,
                micros,
            );
            match (date, time) {
                (Some(date), _) if column_type == ColumnType::MYSQL_TYPE_DATE => Value::Date(date),
                (Some(date), Some(time)) => Value::TimestampNaive(date.and_time(time)),
                _ => {
                    warn!(
                        column = %column.name_str(),
                        "Unrepresentable date {year:04}-{month:02}-{day:02} read as NULL"
                    );
                    Value::Null
                }
            }
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            match NaiveTime::from_hms_micro_opt(
                hours as u32,
                minutes as u32,
                seconds as u32,
                micros,
            ) {
                Some(time) if !negative && days == 0 => Value::Time(time),
                _ => {
                    // TIME is an interval in MySQL and may exceed a day or be negative.
                    let sign = if negative { "-" } else { "" };
                    let total_hours = days * 24 + hours as u32;
                    Value::String(format!(
                        "{sign}{total_hours:02}:{minutes:02}:{seconds:02}.{micros:06}"
                    ))
                }
            }
        }
    };
    Ok(value)
}

fn convert_bytes(column: &Column, bytes: Vec<u8>) -> Result<Value, DbError> {
    match column.column_type() {
        ColumnType::MYSQL_TYPE_NEWDECIMAL | ColumnType::MYSQL_TYPE_DECIMAL => {
            let text = String::from_utf8_lossy(&bytes);
            BigDecimal::from_str(&text)
                .map(Value::Decimal)
                .map_err(|e| DbError::Unknown(format!("Invalid decimal '{text}': {e}")))
        }
        ColumnType::MYSQL_TYPE_JSON => serde_json::from_slice(&bytes)
            .map(Value::Json)
            .map_err(|e| DbError::Unknown(format!("Invalid JSON in column '{}': {e}", column.name_str()))),
        ColumnType::MYSQL_TYPE_BIT | ColumnType::MYSQL_TYPE_GEOMETRY => Ok(Value::Bytes(bytes)),
        _ if column.character_set() == BINARY_CHARSET => Ok(Value::Bytes(bytes)),
        _ => Ok(match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(err) => Value::Bytes(err.into_bytes()),
        }),
    }
}
