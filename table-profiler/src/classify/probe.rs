//! Type probes: all-or-nothing conversion of a column into a representation.
//!
//! A probe either converts every value of the column or fails on the first
//! value that does not convert. NULL always converts to NULL, so a column with
//! no non-null values passes every probe.
//!
//! Columns whose Arrow type already is numeric or temporal are converted
//! natively by [`convert_native`]; everything else is probed through its text
//! rendering by [`probe`].

use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::error::{ProfilerError, Result};
use crate::staging::{Representation, StagedValues};

/// Date layouts accepted by the date probe, tried in order.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

/// Date-time layouts accepted by the date probe. The time part is discarded.
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Date-time layouts carrying a UTC offset, besides RFC 3339. The date is
/// taken in the value's own offset.
pub const OFFSET_DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// A value that could not be converted. Local to the classification cascade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value '{value}' at row {row} does not convert to {representation}")]
pub struct ConversionError {
    pub representation: Representation,
    pub row: usize,
    pub value: String,
}

/// Converts a natively typed column straight into `representation`.
///
/// Integers up to 64 bits stay exact, other numeric types become floats (NaN
/// included), and dates and timestamps are truncated to the date. Returns
/// `None` when the Arrow type has no native conversion.
pub fn convert_native(
    representation: Representation,
    array: &dyn Array,
) -> Result<Option<StagedValues>> {
    let data_type = array.data_type();
    match representation {
        Representation::Numeric if is_exact_integer(data_type) => {
            let integers = cast(array, &DataType::Int64)?;
            let values = integers
                .as_primitive_opt::<Int64Type>()
                .ok_or_else(|| ProfilerError::internal("Expected Int64 array"))?;
            Ok(Some(StagedValues::Integer(values.iter().collect())))
        }
        Representation::Numeric if data_type.is_numeric() => {
            let floats = cast(array, &DataType::Float64)?;
            let values = floats
                .as_primitive_opt::<Float64Type>()
                .ok_or_else(|| ProfilerError::internal("Expected Float64 array"))?;
            Ok(Some(StagedValues::Numeric(values.iter().collect())))
        }
        Representation::Date if is_date_like(data_type) => {
            let days = cast(array, &DataType::Date32)?;
            let values = days
                .as_primitive_opt::<Date32Type>()
                .ok_or_else(|| ProfilerError::internal("Expected Date32 array"))?;
            Ok(Some(StagedValues::Date(
                values
                    .iter()
                    .map(|day| day.map(Date32Type::to_naive_date))
                    .collect(),
            )))
        }
        _ => Ok(None),
    }
}

fn is_exact_integer(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
    )
}

fn is_date_like(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _)
    )
}

/// Converts every value of `values` into `representation`.
///
/// Numbers are staged as exact integers when every value is one, otherwise as
/// floats.
pub fn probe(
    representation: Representation,
    values: &[Option<String>],
) -> std::result::Result<StagedValues, ConversionError> {
    match representation {
        Representation::Numeric => convert_all(representation, values, parse_integer)
            .map(StagedValues::Integer)
            .or_else(|_| {
                convert_all(representation, values, parse_numeric).map(StagedValues::Numeric)
            }),
        Representation::Date => {
            convert_all(representation, values, parse_date).map(StagedValues::Date)
        }
        Representation::Text => Ok(StagedValues::Text(values.to_vec())),
    }
}

fn convert_all<T>(
    representation: Representation,
    values: &[Option<String>],
    parse: fn(&str) -> Option<T>,
) -> std::result::Result<Vec<Option<T>>, ConversionError> {
    values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(raw) => parse(raw.trim()).map(Some).ok_or_else(|| ConversionError {
                representation,
                row,
                value: raw.clone(),
            }),
        })
        .collect()
}

/// Parses a plain integer that fits in 64 bits.
pub fn parse_integer(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}

/// Parses a plain decimal or scientific number. Rejects NaN and infinities.
pub fn parse_numeric(value: &str) -> Option<f64> {
    if !NUMERIC_PATTERN.is_match(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Parses a calendar date in any of [`DATE_FORMATS`], [`DATETIME_FORMATS`],
/// RFC 3339 or [`OFFSET_DATETIME_FORMATS`].
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .or_else(|| {
                    OFFSET_DATETIME_FORMATS
                        .iter()
                        .find_map(|format| DateTime::parse_from_str(value, format).ok())
                })
                .map(|datetime| datetime.date_naive())
        })
}
