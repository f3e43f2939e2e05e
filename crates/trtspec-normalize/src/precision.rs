use trtspec_core::{ConfigValue, Precision, ScalarType, SpecError, SpecResult};

use crate::OP_PRECISION;

/// Accepts a framework dtype (int8, half or float only) or a canonical [`Precision`].
pub fn parse_precision(value: &ConfigValue) -> SpecResult<Precision> {
    parse_precision_at(value, OP_PRECISION)
}

pub(crate) fn parse_precision_at(value: &ConfigValue, field: &str) -> SpecResult<Precision> {
    let unsupported = |actual: String| SpecError::UnsupportedPrecision {
        field: field.to_string(),
        actual,
    };

    match value {
        ConfigValue::ScalarType(ScalarType::Char) => Ok(Precision::Int8),
        ConfigValue::ScalarType(ScalarType::Half) => Ok(Precision::Half),
        ConfigValue::ScalarType(ScalarType::Float) => Ok(Precision::Float),
        ConfigValue::Precision(p) => Ok(*p),
        other => Err(unsupported(other.describe())),
    }
}
