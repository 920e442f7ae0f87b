use crate::sql::base::error::DbError;
use crate::sql::postgres::numeric::PgNumeric;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use model::{core::value::Value, records::row::Row};
use tokio_postgres::{
    Row as PgRow,
    types::{FromSql, Type},
};
use uuid::Uuid;

/// Types `convert_row` reads natively. Source columns of any other type are
/// selected as text instead, see [`with_text_fallback`].
pub(crate) fn is_readable(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::OID
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::NUMERIC
            | Type::TEXT
            | Type::VARCHAR
            | Type::BPCHAR
            | Type::NAME
            | Type::UNKNOWN
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

/// Wraps `query` so that every result column of a type without a native
/// reader (`interval`, `inet`, arrays, enums, ...) comes back in the server's
/// text form. Columns are addressed through positional aliases, which keeps
/// duplicate or unnamed columns apart. `None` when no column needs it.
pub(crate) fn with_text_fallback(query: &str, types: &[Type]) -> Option<String> {
    if types.iter().all(is_readable) {
        return None;
    }

    let aliases: Vec<String> = (1..=types.len()).map(|i| format!("c{i}")).collect();
    let projection: Vec<String> = types
        .iter()
        .zip(&aliases)
        .map(|(ty, alias)| {
            if is_readable(ty) {
                alias.clone()
            } else {
                format!("{alias}::text")
            }
        })
        .collect();

    Some(format!(
        "SELECT {} FROM ({query}) AS db_transfer_src({})",
        projection.join(", "),
        aliases.join(", ")
    ))
}

/// Converts a driver row into a positional `Row`, keeping result-set column order.
pub(crate) fn convert_row(row: &PgRow) -> Result<Row, DbError> {
    let mut values = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        values.push(read_value(row, idx, column.name(), column.type_())?);
    }
    Ok(Row::new(values))
}

fn read_value(row: &PgRow, idx: usize, name: &str, ty: &Type) -> Result<Value, DbError> {
    match *ty {
        Type::BOOL => get(row, idx, Value::Boolean),
        Type::INT2 => get(row, idx, Value::SmallInt),
        Type::INT4 => get(row, idx, Value::Int32),
        Type::INT8 => get(row, idx, Value::Int),
        Type::OID => get(row, idx, |v: u32| Value::Uint(v as u64)),
        Type::FLOAT4 => get(row, idx, Value::Float32),
        Type::FLOAT8 => get(row, idx, Value::Float),
        Type::NUMERIC => get(row, idx, PgNumeric::into_value),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get(row, idx, Value::String)
        }
        Type::JSON | Type::JSONB => get(row, idx, Value::Json),
        Type::UUID => get(row, idx, |v: Uuid| Value::Uuid(v)),
        Type::BYTEA => get(row, idx, Value::Bytes),
        Type::DATE => get(row, idx, |v: NaiveDate| Value::Date(v)),
        Type::TIME => get(row, idx, |v: NaiveTime| Value::Time(v)),
        Type::TIMESTAMP => get(row, idx, |v: NaiveDateTime| Value::TimestampNaive(v)),
        Type::TIMESTAMPTZ => get(row, idx, |v: DateTime<Utc>| Value::Timestamp(v)),
        _ => Err(DbError::UnsupportedType {
            column: name.to_string(),
            type_name: ty.name().to_string(),
        }),
    }
}

fn get<'a, T, F>(row: &'a PgRow, idx: usize, wrap: F) -> Result<Value, DbError>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> Value,
{
    let value: Option<T> = row.try_get(idx)?;
    Ok(value.map_or(Value::Null, wrap))
}
