use chrono::{Datelike, NaiveDateTime, Timelike};
use model::core::value::Value;
use mysql_async::{Params, Value as MySqlValue};

pub struct MySqlParam(MySqlValue);

impl MySqlParam {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::SmallInt(i) => MySqlParam(MySqlValue::Int(i as i64)),
            Value::Int32(i) => MySqlParam(MySqlValue::Int(i as i64)),
            Value::Int(i) => MySqlParam(MySqlValue::Int(i)),
            Value::Uint(u) => MySqlParam(MySqlValue::UInt(u)),
            Value::Float32(f) => MySqlParam(MySqlValue::Float(f)),
            Value::Float(f) => MySqlParam(MySqlValue::Double(f)),
            Value::Decimal(d) => MySqlParam(MySqlValue::Bytes(d.to_string().into_bytes())),
            Value::String(s) => MySqlParam(MySqlValue::Bytes(s.into_bytes())),
            Value::Boolean(b) => MySqlParam(MySqlValue::Int(if b { 1 } else { 0 })),
            Value::Json(j) => MySqlParam(MySqlValue::Bytes(j.to_string().into_bytes())),
            Value::Uuid(u) => MySqlParam(MySqlValue::Bytes(u.to_string().into_bytes())),
            Value::Bytes(b) => MySqlParam(MySqlValue::Bytes(b)),
            Value::Date(d) => MySqlParam(MySqlValue::Date(
                d.year() as u16,
                d.month() as u8,
                d.day() as u8,
                0,
                0,
                0,
                0,
            )),
            Value::Time(t) => MySqlParam(MySqlValue::Time(
                false,
                0,
                t.hour() as u8,
                t.minute() as u8,
                t.second() as u8,
                micros(t.nanosecond()),
            )),
            Value::Timestamp(ts) => MySqlParam(datetime(ts.naive_utc())),
            Value::TimestampNaive(ts) => MySqlParam(datetime(ts)),
            Value::Null => MySqlParam(MySqlValue::NULL),
        }
    }
}

fn datetime(naive: NaiveDateTime) -> MySqlValue {
    MySqlValue::Date(
        naive.year() as u16,
        naive.month() as u8,
        naive.day() as u8,
        naive.hour() as u8,
        naive.minute() as u8,
        naive.second() as u8,
        micros(naive.nanosecond()),
    )
}

// chrono encodes a leap second as nanos >= 1e9.
fn micros(nanos: u32) -> u32 {
    (nanos / 1_000).min(999_999)
}

pub struct MySqlParamStore {
    pub params: Vec<MySqlParam>,
}

impl MySqlParamStore {
    pub fn from_values(values: Vec<Value>) -> Self {
        let params = values.into_iter().map(MySqlParam::from_value).collect();
        MySqlParamStore { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_params(self) -> Params {
        Params::Positional(self.params.into_iter().map(|p| p.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn test_positional_params_keep_order() {
        let store = MySqlParamStore::from_values(vec![
            Value::Int32(1),
            Value::String("a".into()),
            Value::Null,
        ]);
        assert_eq!(store.len(), 3);
        match store.into_params() {
            Params::Positional(values) => assert_eq!(
                values,
                vec![
                    MySqlValue::Int(1),
                    MySqlValue::Bytes(b"a".to_vec()),
                    MySqlValue::NULL
                ]
            ),
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn test_decimal_is_sent_as_text() {
        let decimal = BigDecimal::from_str("12.340").unwrap();
        let MySqlParam(value) = MySqlParam::from_value(Value::Decimal(decimal));
        assert_eq!(value, MySqlValue::Bytes(b"12.340".to_vec()));
    }

    #[test]
    fn test_timestamp_keeps_micros() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_micro_opt(13, 45, 10, 123_456)
            .unwrap();
        let MySqlParam(value) = MySqlParam::from_value(Value::TimestampNaive(ts));
        assert_eq!(value, MySqlValue::Date(2024, 1, 31, 13, 45, 10, 123_456));
    }

    #[test]
    fn test_bool_as_tinyint() {
        let MySqlParam(value) = MySqlParam::from_value(Value::Boolean(true));
        assert_eq!(value, MySqlValue::Int(1));
    }
}
