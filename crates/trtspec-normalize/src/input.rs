use trtspec_core::{
    child_field, index_field, ConfigMap, ConfigValue, InputRange, Shape, SpecError, SpecResult,
};
use tracing::trace;

use crate::INPUT_SHAPES;

const EXPECTED_INPUTS: &str = "a list of static shapes or {min, opt, max} ranges";
const EXPECTED_INPUT: &str = "a static shape (list or tuple of ints) or a {min, opt, max} map";
const EXPECTED_SHAPE: &str = "a list or tuple of ints";
const EXPECTED_DIM: &str = "a positive int";

/// Parses the `input_shapes` entry into one [`InputRange`] per graph input, in order.
///
/// Each element is either a static shape, which becomes a degenerate range,
/// or a map holding all of `min`, `opt` and `max`, or only `opt`.
pub fn parse_input_shapes(raw: &ConfigValue) -> SpecResult<Vec<InputRange>> {
    parse_input_shapes_at(raw, INPUT_SHAPES)
}

pub(crate) fn parse_input_shapes_at(raw: &ConfigValue, field: &str) -> SpecResult<Vec<InputRange>> {
    let inputs = raw
        .as_sequence()
        .ok_or_else(|| SpecError::type_mismatch(field, EXPECTED_INPUTS, raw.describe()))?;

    let mut ranges = Vec::with_capacity(inputs.len());
    for (idx, input) in inputs.iter().enumerate() {
        let range = parse_input(input, &index_field(field, idx))?;
        trace!(index = idx, range = %range, "parsed input range");
        ranges.push(range);
    }
    Ok(ranges)
}

fn parse_input(value: &ConfigValue, field: &str) -> SpecResult<InputRange> {
    match value {
        ConfigValue::List(_) | ConfigValue::Tuple(_) => {
            Ok(InputRange::fixed(parse_shape(value, field)?))
        }
        ConfigValue::Map(map) => parse_range_map(map, field),
        other => Err(SpecError::type_mismatch(
            field,
            EXPECTED_INPUT,
            other.describe(),
        )),
    }
}

fn parse_range_map(map: &ConfigMap, field: &str) -> SpecResult<InputRange> {
    match (map.get("min"), map.get("opt"), map.get("max")) {
        (Some(min), Some(opt), Some(max)) => {
            let range = InputRange::new(
                parse_shape(min, &child_field(field, "min"))?,
                parse_shape(opt, &child_field(field, "opt"))?,
                parse_shape(max, &child_field(field, "max"))?,
            );
            range.validate(field)?;
            Ok(range)
        }
        (None, Some(opt), None) => Ok(InputRange::fixed(parse_shape(
            opt,
            &child_field(field, "opt"),
        )?)),
        _ => {
            let present: Vec<&str> = ["min", "opt", "max"]
                .into_iter()
                .filter(|k| map.contains_key(*k))
                .collect();
            let found = if present.is_empty() {
                "none of them".to_string()
            } else {
                format!("only {}", present.join(", "))
            };
            Err(SpecError::InvalidRange {
                field: field.to_string(),
                reason: format!("expected all of min, opt, max or only opt, found {found}"),
            })
        }
    }
}

fn parse_shape(value: &ConfigValue, field: &str) -> SpecResult<Shape> {
    let dims = value
        .as_sequence()
        .ok_or_else(|| SpecError::type_mismatch(field, EXPECTED_SHAPE, value.describe()))?;

    dims.iter()
        .enumerate()
        .map(|(idx, dim)| match dim {
            ConfigValue::Int(n) if *n > 0 => Ok(*n),
            ConfigValue::Int(n) => Err(SpecError::InvalidShape {
                field: index_field(field, idx),
                reason: format!("dimensions must be positive, got {n}"),
            }),
            ConfigValue::UInt(n) => Err(SpecError::InvalidShape {
                field: index_field(field, idx),
                reason: format!("dimension {n} exceeds the int64 range"),
            }),
            other => Err(SpecError::type_mismatch(
                index_field(field, idx),
                EXPECTED_DIM,
                other.describe(),
            )),
        })
        .collect::<SpecResult<Vec<i64>>>()
        .map(Shape::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trtspec_core::SpecErrorKind;

    fn range_map(entries: &[(&str, &[i64])]) -> ConfigValue {
        ConfigValue::Map(
            entries
                .iter()
                .map(|(k, dims)| (k.to_string(), ConfigValue::shape(dims)))
                .collect(),
        )
    }

    #[test]
    fn list_and_tuple_become_static_ranges() {
        let raw = ConfigValue::List(vec![
            ConfigValue::shape(&[1, 3, 224, 224]),
            ConfigValue::tuple(&[1, 10]),
        ]);
        let ranges = parse_input_shapes(&raw).unwrap();
        assert_eq!(ranges.len(), 2);
        assert!(ranges.iter().all(InputRange::is_static));
        assert_eq!(ranges[1].opt, Shape::from_slice(&[1, 10]));
    }

    #[test]
    fn full_range_is_kept_verbatim() {
        let raw = ConfigValue::List(vec![range_map(&[
            ("min", &[1, 3, 224, 224]),
            ("opt", &[1, 3, 512, 512]),
            ("max", &[1, 3, 1024, 1024]),
        ])]);
        let ranges = parse_input_shapes(&raw).unwrap();
        assert_eq!(ranges[0].min, Shape::from_slice(&[1, 3, 224, 224]));
        assert_eq!(ranges[0].opt, Shape::from_slice(&[1, 3, 512, 512]));
        assert_eq!(ranges[0].max, Shape::from_slice(&[1, 3, 1024, 1024]));
    }

    #[test]
    fn partial_range_is_rejected() {
        let raw = ConfigValue::List(vec![range_map(&[("min", &[1]), ("opt", &[2])])]);
        let err = parse_input_shapes(&raw).unwrap_err();
        assert_eq!(err.kind(), SpecErrorKind::InvalidRange);
        assert_eq!(err.field(), "input_shapes[0]");
        assert!(err.to_string().contains("only min, opt"));

        let raw = ConfigValue::List(vec![range_map(&[("max", &[2])])]);
        assert_eq!(
            parse_input_shapes(&raw).unwrap_err().kind(),
            SpecErrorKind::InvalidRange
        );
    }

    #[test]
    fn opt_with_max_is_not_a_degenerate_range() {
        let raw = ConfigValue::List(vec![range_map(&[("opt", &[2]), ("max", &[4])])]);
        let err = parse_input_shapes(&raw).unwrap_err();
        assert_eq!(err.kind(), SpecErrorKind::InvalidRange);
        assert!(err.to_string().contains("found only opt, max"));
    }

    #[test]
    fn empty_range_map_is_rejected() {
        let raw = ConfigValue::List(vec![range_map(&[])]);
        let err = parse_input_shapes(&raw).unwrap_err();
        assert_eq!(err.kind(), SpecErrorKind::InvalidRange);
        assert_eq!(err.field(), "input_shapes[0]");
        assert!(err.to_string().contains("found none of them"));
    }

    #[test]
    fn oversized_dimension_is_an_invalid_shape() {
        let raw = ConfigValue::List(vec![ConfigValue::List(vec![ConfigValue::UInt(1 << 63)])]);
        let err = parse_input_shapes(&raw).unwrap_err();
        assert_eq!(err.kind(), SpecErrorKind::InvalidShape);
        assert_eq!(err.field(), "input_shapes[0][0]");
    }

    #[test]
    fn dimension_errors_carry_their_path() {
        let raw = ConfigValue::List(vec![
            ConfigValue::shape(&[1]),
            ConfigValue::List(vec![ConfigValue::Int(1), ConfigValue::Str("3".into())]),
        ]);
        let err = parse_input_shapes(&raw).unwrap_err();
        assert_eq!(err.kind(), SpecErrorKind::TypeMismatch);
        assert_eq!(err.field(), "input_shapes[1][1]");

        let raw = ConfigValue::List(vec![range_map(&[("opt", &[1, 0])])]);
        let err = parse_input_shapes(&raw).unwrap_err();
        assert_eq!(err.kind(), SpecErrorKind::InvalidShape);
        assert_eq!(err.field(), "input_shapes[0].opt[1]");
    }

    #[test]
    fn non_sequence_is_a_type_mismatch() {
        let err = parse_input_shapes(&ConfigValue::Int(3)).unwrap_err();
        assert_eq!(err.kind(), SpecErrorKind::TypeMismatch);
        assert_eq!(err.field(), "input_shapes");

        let err = parse_input_shapes(&ConfigValue::List(vec![ConfigValue::Bool(true)])).unwrap_err();
        assert_eq!(err.field(), "input_shapes[0]");
        assert!(err.to_string().contains("found bool true"));
    }
}
