use trtspec_core::{
    CompileSpec, ConfigMap, ConfigValue, EngineCapability, SpecError, SpecResult, ROOT_FIELD,
};
use tracing::debug;

use crate::device::parse_device_at;
use crate::input::parse_input_shapes_at;
use crate::precision::parse_precision_at;

pub const INPUT_SHAPES: &str = "input_shapes";
pub const OP_PRECISION: &str = "op_precision";
pub const REFIT: &str = "refit";
pub const DEBUG: &str = "debug";
pub const STRICT_TYPES: &str = "strict_types";
pub const ALLOW_GPU_FALLBACK: &str = "allow_gpu_fallback";
pub const DEVICE_TYPE: &str = "device_type";
pub const CAPABILITY: &str = "capability";
pub const NUM_MIN_TIMING_ITERS: &str = "num_min_timing_iters";
pub const NUM_AVG_TIMING_ITERS: &str = "num_avg_timing_iters";
pub const WORKSPACE_SIZE: &str = "workspace_size";
pub const MAX_BATCH_SIZE: &str = "max_batch_size";

/// Keys `normalize` understands. Anything else is ignored.
pub const KNOWN_KEYS: &[&str] = &[
    INPUT_SHAPES,
    OP_PRECISION,
    REFIT,
    DEBUG,
    STRICT_TYPES,
    ALLOW_GPU_FALLBACK,
    DEVICE_TYPE,
    CAPABILITY,
    NUM_MIN_TIMING_ITERS,
    NUM_AVG_TIMING_ITERS,
    WORKSPACE_SIZE,
    MAX_BATCH_SIZE,
];

/// Validates a raw config map and builds the canonical [`CompileSpec`].
///
/// `input_shapes` is required; every other recognised key is optional and
/// falls back to the backend default. Unrecognised keys are ignored so that
/// configs written for richer front ends still load. The first invalid field
/// aborts the call.
pub fn normalize(raw: &ConfigMap) -> SpecResult<CompileSpec> {
    let shapes = raw.get(INPUT_SHAPES).ok_or_else(|| SpecError::MissingField {
        field: INPUT_SHAPES.to_string(),
        expected: "a list of static shapes or {min, opt, max} ranges",
    })?;
    let defaults = CompileSpec::new(parse_input_shapes_at(shapes, INPUT_SHAPES)?);

    let spec = CompileSpec {
        op_precision: optional(raw, OP_PRECISION, parse_precision_at)?
            .unwrap_or(defaults.op_precision),
        refit: optional(raw, REFIT, expect_bool)?.unwrap_or(defaults.refit),
        debug: optional(raw, DEBUG, expect_bool)?.unwrap_or(defaults.debug),
        strict_types: optional(raw, STRICT_TYPES, expect_bool)?.unwrap_or(defaults.strict_types),
        allow_gpu_fallback: optional(raw, ALLOW_GPU_FALLBACK, expect_bool)?
            .unwrap_or(defaults.allow_gpu_fallback),
        device: optional(raw, DEVICE_TYPE, parse_device_at)?.unwrap_or(defaults.device),
        capability: optional(raw, CAPABILITY, expect_capability)?.unwrap_or(defaults.capability),
        num_min_timing_iters: optional(raw, NUM_MIN_TIMING_ITERS, expect_count)?
            .unwrap_or(defaults.num_min_timing_iters),
        num_avg_timing_iters: optional(raw, NUM_AVG_TIMING_ITERS, expect_count)?
            .unwrap_or(defaults.num_avg_timing_iters),
        workspace_size: optional(raw, WORKSPACE_SIZE, expect_count)?
            .unwrap_or(defaults.workspace_size),
        max_batch_size: optional(raw, MAX_BATCH_SIZE, expect_count)?
            .unwrap_or(defaults.max_batch_size),
        input_ranges: defaults.input_ranges,
    };

    for key in raw.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        debug!(key = %key, "ignoring unrecognized compile setting");
    }
    debug!(inputs = spec.input_ranges.len(), "{spec}");

    Ok(spec)
}

/// Like [`normalize`], for a value that still has to be checked to be a map.
pub fn normalize_value(raw: &ConfigValue) -> SpecResult<CompileSpec> {
    let map = raw.as_map().ok_or_else(|| {
        SpecError::type_mismatch(ROOT_FIELD, "a map of compile settings", raw.describe())
    })?;
    normalize(map)
}

fn optional<T>(
    raw: &ConfigMap,
    key: &str,
    parse: impl FnOnce(&ConfigValue, &str) -> SpecResult<T>,
) -> SpecResult<Option<T>> {
    raw.get(key).map(|value| parse(value, key)).transpose()
}

fn expect_bool(value: &ConfigValue, field: &str) -> SpecResult<bool> {
    match value {
        ConfigValue::Bool(b) => Ok(*b),
        other => Err(SpecError::type_mismatch(field, "bool", other.describe())),
    }
}

fn expect_count(value: &ConfigValue, field: &str) -> SpecResult<u64> {
    match value {
        ConfigValue::Int(n) => u64::try_from(*n).map_err(|_| {
            SpecError::type_mismatch(field, "a non-negative int", value.describe())
        }),
        ConfigValue::UInt(n) => Ok(*n),
        other => Err(SpecError::type_mismatch(
            field,
            "a non-negative int",
            other.describe(),
        )),
    }
}

fn expect_capability(value: &ConfigValue, field: &str) -> SpecResult<EngineCapability> {
    match value {
        ConfigValue::Capability(c) => Ok(*c),
        other => Err(SpecError::type_mismatch(
            field,
            "an engine capability (default, safe_gpu, safe_dla)",
            other.describe(),
        )),
    }
}
