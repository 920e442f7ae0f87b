//! Binary `numeric` codec over `BigDecimal`, with no 28-digit precision
//! limit.
//!
//! Wire layout: `ndigits`, `weight`, `sign`, `dscale` (all 16-bit), followed by
//! `ndigits` base-10000 digits, most significant first. `weight` is the power
//! of 10000 of the first digit.

use bigdecimal::BigDecimal;
use bytes::{BufMut, BytesMut};
use model::core::value::Value;
use std::{error::Error, fmt, str::FromStr};
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;
const NUMERIC_MAX_DSCALE: usize = 0x3FFF;
const NBASE_DIGITS: usize = 4;

type BoxError = Box<dyn Error + Sync + Send>;

#[derive(Debug, Clone, PartialEq)]
pub enum PgNumeric {
    Finite(BigDecimal),
    NaN,
    Infinity,
    NegInfinity,
}

impl PgNumeric {
    /// Recognizes the non-finite values a `numeric` column can hold, either
    /// in their text form or as a non-finite float.
    pub fn special(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "nan" => Some(PgNumeric::NaN),
                "infinity" | "+infinity" | "inf" => Some(PgNumeric::Infinity),
                "-infinity" | "-inf" => Some(PgNumeric::NegInfinity),
                _ => None,
            },
            Value::Float(_) | Value::Float32(_) => match value.as_f64() {
                Some(f) if f.is_nan() => Some(PgNumeric::NaN),
                Some(f) if f == f64::INFINITY => Some(PgNumeric::Infinity),
                Some(f) if f == f64::NEG_INFINITY => Some(PgNumeric::NegInfinity),
                _ => None,
            },
            _ => None,
        }
    }

    /// Finite values become `Value::Decimal`; the others keep their
    /// PostgreSQL spelling as text.
    pub fn into_value(self) -> Value {
        match self {
            PgNumeric::Finite(d) => Value::Decimal(d),
            special => Value::String(special.to_string()),
        }
    }
}

impl fmt::Display for PgNumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgNumeric::Finite(d) => write!(f, "{d}"),
            PgNumeric::NaN => write!(f, "NaN"),
            PgNumeric::Infinity => write!(f, "Infinity"),
            PgNumeric::NegInfinity => write!(f, "-Infinity"),
        }
    }
}

impl ToSql for PgNumeric {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            PgNumeric::Finite(d) => encode(d, out)?,
            PgNumeric::NaN => put_header(out, 0, 0, NUMERIC_NAN, 0),
            PgNumeric::Infinity => put_header(out, 0, 0, NUMERIC_PINF, 0),
            PgNumeric::NegInfinity => put_header(out, 0, 0, NUMERIC_NINF, 0),
        }
        Ok(IsNull::No)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for PgNumeric {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        decode(raw)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

fn put_header(out: &mut BytesMut, ndigits: i16, weight: i16, sign: u16, dscale: u16) {
    out.put_i16(ndigits);
    out.put_i16(weight);
    out.put_u16(sign);
    out.put_u16(dscale);
}

fn encode(value: &BigDecimal, out: &mut BytesMut) -> Result<(), BoxError> {
    let (unscaled, exponent) = value.as_bigint_and_exponent();
    let text = unscaled.to_string();
    let (negative, mut digits) = match text.strip_prefix('-') {
        Some(abs) => (true, abs.to_string()),
        None => (false, text),
    };

    // value = digits * 10^-scale, with a non-negative scale
    let scale = if exponent < 0 {
        digits.push_str(&"0".repeat(exponent.unsigned_abs() as usize));
        0
    } else {
        exponent as usize
    };
    if scale > NUMERIC_MAX_DSCALE {
        return Err(format!("numeric scale {scale} is out of range").into());
    }
    if digits.len() <= scale {
        digits.insert_str(0, &"0".repeat(scale - digits.len() + 1));
    }

    let (int_part, frac_part) = digits.split_at(digits.len() - scale);
    let int_part = int_part.trim_start_matches('0');
    let int_pad = (NBASE_DIGITS - int_part.len() % NBASE_DIGITS) % NBASE_DIGITS;
    let frac_pad = (NBASE_DIGITS - frac_part.len() % NBASE_DIGITS) % NBASE_DIGITS;
    let aligned = format!(
        "{}{int_part}{frac_part}{}",
        "0".repeat(int_pad),
        "0".repeat(frac_pad)
    );

    let mut groups: Vec<i16> = aligned
        .as_bytes()
        .chunks(NBASE_DIGITS)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0i16, |acc, b| acc * 10 + i16::from(b - b'0'))
        })
        .collect();
    let mut weight = ((int_pad + int_part.len()) / NBASE_DIGITS) as i64 - 1;

    let leading = groups.iter().take_while(|g| **g == 0).count();
    groups.drain(..leading);
    weight -= leading as i64;
    while groups.last() == Some(&0) {
        groups.pop();
    }

    let sign = if negative && !groups.is_empty() {
        NUMERIC_NEG
    } else {
        NUMERIC_POS
    };
    if groups.is_empty() {
        weight = 0;
    }

    put_header(
        out,
        i16::try_from(groups.len())?,
        i16::try_from(weight)?,
        sign,
        scale as u16,
    );
    for group in groups {
        out.put_i16(group);
    }
    Ok(())
}

fn decode(raw: &[u8]) -> Result<PgNumeric, BoxError> {
    if raw.len() < 8 {
        return Err(format!("invalid numeric length {}", raw.len()).into());
    }
    let word = |i: usize| u16::from_be_bytes([raw[i], raw[i + 1]]);

    let ndigits = usize::from(word(0));
    let weight = i64::from(word(2) as i16);
    let sign = word(4);
    let dscale = i64::from(word(6));

    match sign {
        NUMERIC_NAN => return Ok(PgNumeric::NaN),
        NUMERIC_PINF => return Ok(PgNumeric::Infinity),
        NUMERIC_NINF => return Ok(PgNumeric::NegInfinity),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(format!("invalid numeric sign {other:#06x}").into()),
    }
    if raw.len() != 8 + ndigits * 2 {
        return Err("numeric digit count does not match its length".into());
    }

    let mut text = String::with_capacity(ndigits * NBASE_DIGITS + 8);
    if sign == NUMERIC_NEG {
        text.push('-');
    }
    if ndigits == 0 {
        text.push('0');
    }
    for i in 0..ndigits {
        let digit = word(8 + i * 2);
        if digit > 9999 {
            return Err(format!("invalid numeric digit {digit}").into());
        }
        text.push_str(&format!("{digit:04}"));
    }

    // The digits read as an integer are the value scaled by 10000^(ndigits - 1 - weight).
    let exponent = NBASE_DIGITS as i64 * (weight + 1 - ndigits as i64);
    let value = BigDecimal::from_str(&format!("{text}e{exponent}"))?;
    Ok(PgNumeric::Finite(value.with_scale(dscale)))
}
