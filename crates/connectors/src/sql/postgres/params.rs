use crate::sql::{
    base::error::DbError,
    postgres::{
        coercion::{binds_natively, coerce_to_type},
        numeric::PgNumeric,
    },
};
use bytes::{BufMut, BytesMut};
use model::core::value::Value;
use std::error::Error;
use tokio_postgres::types::{Format, IsNull, Json as PgJson, ToSql, Type, to_sql_checked};

/// Untyped SQL NULL.
///
/// `Option::<T>::None` only binds where `T` would, which rejects a NULL read
/// from an `int` column being written into a `text` parameter.
#[derive(Debug)]
struct PgNull;

impl ToSql for PgNull {
    fn to_sql(
        &self,
        _ty: &Type,
        _out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// A value sent in text format, parsed by the server with the input function
/// of the parameter's type. Used for types without a binary encoder here
/// (`interval`, `inet`, enums, arrays, ...).
#[derive(Debug)]
struct PgText(String);

impl ToSql for PgText {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        out.put_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    /// Binds an already coerced value for a parameter of type `ty`.
    pub fn for_type(value: Value, ty: &Type) -> Self {
        if value.is_null() {
            return PgParam(Box::new(PgNull));
        }
        if *ty == Type::NUMERIC {
            if let Some(special) = PgNumeric::special(&value) {
                return PgParam(Box::new(special));
            }
        }
        if !binds_natively(ty) {
            if let Some(text) = value.as_string() {
                return PgParam(Box::new(PgText(text)));
            }
        }
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::SmallInt(v) => PgParam(Box::new(v)),
            Value::Int32(v) => PgParam(Box::new(v)),
            Value::Int(v) => PgParam(Box::new(v)),
            Value::Uint(v) => PgParam(Box::new(v as i64)),
            Value::Float32(v) => PgParam(Box::new(v)),
            Value::Float(v) => PgParam(Box::new(v)),
            Value::Decimal(v) => PgParam(Box::new(PgNumeric::Finite(v))),
            Value::String(v) => PgParam(Box::new(v)),
            Value::Boolean(v) => PgParam(Box::new(v)),
            Value::Json(v) => PgParam(Box::new(PgJson(v))),
            Value::Uuid(v) => PgParam(Box::new(v)),
            Value::Bytes(v) => PgParam(Box::new(v)),
            Value::Date(v) => PgParam(Box::new(v)),
            Value::Time(v) => PgParam(Box::new(v)),
            Value::Timestamp(v) => PgParam(Box::new(v)),
            Value::TimestampNaive(v) => PgParam(Box::new(v)),
            Value::Null => PgParam(Box::new(PgNull)),
        }
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    /// Coerces each value to the matching statement parameter type and boxes it
    /// for binding.
    pub fn from_values(values: Vec<Value>, types: &[Type]) -> Result<Self, DbError> {
        if values.len() != types.len() {
            return Err(DbError::ParameterCount {
                expected: types.len(),
                actual: values.len(),
            });
        }

        let params = values
            .into_iter()
            .zip(types)
            .enumerate()
            .map(|(index, (value, ty))| {
                let value = coerce_to_type(value, ty, index)?;
                Ok(PgParam::for_type(value, ty))
            })
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(Self { params })
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param.as_ref())
            .collect::<Vec<_>>()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
