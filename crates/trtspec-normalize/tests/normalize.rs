use anyhow::{ensure, Context, Result};
use proptest::prelude::*;
use serde_json::json;
use trtspec_core::{
    BackendCompileSpec, CompileSpec, ConfigMap, ConfigValue, DeviceType, EngineCapability,
    FrameworkDevice, InputRange, Precision, ScalarType, Shape, SpecErrorKind,
};
use trtspec_normalize::{normalize, normalize_value, parse_input_shapes};

fn from_json(value: serde_json::Value) -> Result<CompileSpec> {
    let value = ConfigValue::from_json(value)?;
    Ok(normalize_value(&value)?)
}

fn error_kind(value: serde_json::Value) -> Option<SpecErrorKind> {
    let value = ConfigValue::from_json(value).ok()?;
    normalize_value(&value).err().map(|e| e.kind())
}

#[test]
fn empty_config_is_missing_input_shapes() {
    let err = normalize(&ConfigMap::new()).unwrap_err();
    assert_eq!(err.kind(), SpecErrorKind::MissingField);
    assert_eq!(err.field(), "input_shapes");
}

#[test]
fn non_bool_flag_is_a_type_mismatch() {
    let value = ConfigValue::from_json(json!({
        "input_shapes": [[1, 3, 224, 224]],
        "refit": "yes",
    }))
    .unwrap();
    let err = normalize_value(&value).unwrap_err();
    assert_eq!(err.kind(), SpecErrorKind::TypeMismatch);
    assert_eq!(err.field(), "refit");
    assert!(err.to_string().contains("expected bool"));
    assert!(err.to_string().contains("string \"yes\""));
}

#[test]
fn unsupported_dtype_is_rejected() {
    let mut raw = ConfigMap::new();
    raw.insert(
        "input_shapes".into(),
        ConfigValue::List(vec![ConfigValue::tuple(&[1, 3, 224, 224])]),
    );
    raw.insert("op_precision".into(), ScalarType::Double.into());
    assert_eq!(
        normalize(&raw).unwrap_err().kind(),
        SpecErrorKind::UnsupportedPrecision
    );

    assert_eq!(
        error_kind(json!({"input_shapes": [[1]], "op_precision": {"$dtype": "int64"}})),
        Some(SpecErrorKind::UnsupportedPrecision)
    );
}

#[test]
fn unknown_keys_are_ignored() -> Result<()> {
    let spec = from_json(json!({"input_shapes": [[1]], "bogus_key": 1, "device": "tpu"}))?;
    ensure!(spec == CompileSpec::from_fixed_sizes([vec![1i64]]), "unexpected spec {spec:?}");
    Ok(())
}

#[test]
fn input_order_is_preserved() -> Result<()> {
    let spec = from_json(json!({"input_shapes": [[1], [2], [3]]}))?;
    let opts: Vec<Vec<i64>> = spec.input_ranges.iter().map(|r| r.opt.to_vec()).collect();
    assert_eq!(opts, vec![vec![1], vec![2], vec![3]]);
    Ok(())
}

#[test]
fn mixed_static_and_dynamic_inputs() -> Result<()> {
    let spec = from_json(json!({
        "input_shapes": [
            [1, 3, 224, 224],
            {"min": [1, 3, 224, 224], "opt": [1, 3, 512, 512], "max": [1, 3, 1024, 1024]},
            {"opt": [8, 16]},
        ],
        "op_precision": {"$dtype": "half"},
        "device_type": {"$device": "cuda:0"},
        "capability": {"$capability": "safe_gpu"},
        "workspace_size": 1073741824,
    }))?;

    ensure!(spec.input_ranges.len() == 3, "expected three inputs");
    let dynamic = spec.input_ranges.get(1).context("missing second input")?;
    assert_eq!(dynamic.max, Shape::from_slice(&[1, 3, 1024, 1024]));
    assert_eq!(
        spec.input_ranges[2],
        InputRange::fixed(Shape::from_slice(&[8, 16]))
    );
    assert_eq!(spec.op_precision, Precision::Half);
    assert_eq!(spec.device, DeviceType::Gpu);
    assert_eq!(spec.capability, EngineCapability::SafeGpu);
    assert_eq!(spec.workspace_size, 1 << 30);

    let encoded = BackendCompileSpec::from(spec);
    assert_eq!(encoded.op_precision, 1);
    assert_eq!(encoded.capability, 1);
    Ok(())
}

#[test]
fn decreasing_range_is_invalid() {
    assert_eq!(
        error_kind(json!({"input_shapes": [{"min": [4], "opt": [2], "max": [8]}]})),
        Some(SpecErrorKind::InvalidRange)
    );
    assert_eq!(
        error_kind(json!({"input_shapes": [{"min": [1], "opt": [2, 2], "max": [8]}]})),
        Some(SpecErrorKind::InvalidRange)
    );
}

#[test]
fn framework_cpu_device_is_invalid() {
    let mut raw = ConfigMap::new();
    raw.insert("input_shapes".into(), ConfigValue::List(vec![ConfigValue::shape(&[1])]));
    raw.insert("device_type".into(), FrameworkDevice::new("cpu", None).into());
    assert_eq!(normalize(&raw).unwrap_err().kind(), SpecErrorKind::InvalidDevice);

    assert_eq!(
        error_kind(json!({"input_shapes": [[1]], "device_type": "npu"})),
        Some(SpecErrorKind::InvalidDevice)
    );
}

#[test]
fn normalizing_a_canonical_spec_is_idempotent() -> Result<()> {
    let first = from_json(json!({
        "input_shapes": [[1, 3, 32, 32], {"min": [1, 8], "opt": [4, 8], "max": [16, 8]}],
        "op_precision": {"$precision": "int8"},
        "strict_types": true,
        "allow_gpu_fallback": false,
        "device_type": "DLA",
        "capability": {"$capability": "safe_dla"},
        "num_min_timing_iters": 5,
        "max_batch_size": 8,
    }))?;
    let second = normalize(&first.to_config())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn workspace_above_i64_max_is_accepted() -> Result<()> {
    let spec = from_json(json!({
        "input_shapes": [[1]],
        "workspace_size": 9_223_372_036_854_775_808u64,
    }))?;
    assert_eq!(spec.workspace_size, 1 << 63);

    let mut widest = spec.clone();
    widest.workspace_size = u64::MAX;
    assert_eq!(normalize(&widest.to_config())?, widest);
    Ok(())
}

fn dims() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..4096, 0..6)
}

fn ordered_range() -> impl Strategy<Value = (Vec<i64>, Vec<i64>, Vec<i64>)> {
    prop::collection::vec((1i64..64, 0i64..64, 0i64..64), 1..6).prop_map(|axes| {
        let min: Vec<i64> = axes.iter().map(|(lo, _, _)| *lo).collect();
        let opt: Vec<i64> = axes.iter().map(|(lo, a, _)| lo + a).collect();
        let max: Vec<i64> = axes.iter().map(|(lo, a, b)| lo + a + b).collect();
        (min, opt, max)
    })
}

proptest! {
    #[test]
    fn fixed_shapes_become_degenerate_ranges(shape in dims(), as_tuple in any::<bool>()) {
        let element = if as_tuple { ConfigValue::tuple(&shape) } else { ConfigValue::shape(&shape) };
        let ranges = parse_input_shapes(&ConfigValue::List(vec![element])).unwrap();
        prop_assert_eq!(ranges.len(), 1);
        let expected = Shape::from_slice(&shape);
        prop_assert_eq!(&ranges[0].min, &expected);
        prop_assert_eq!(&ranges[0].opt, &expected);
        prop_assert_eq!(&ranges[0].max, &expected);
    }

    #[test]
    fn full_ranges_are_unmodified((min, opt, max) in ordered_range()) {
        let mut map = ConfigMap::new();
        map.insert("min".into(), ConfigValue::shape(&min));
        map.insert("opt".into(), ConfigValue::shape(&opt));
        map.insert("max".into(), ConfigValue::shape(&max));
        let ranges = parse_input_shapes(&ConfigValue::List(vec![ConfigValue::Map(map)])).unwrap();
        prop_assert_eq!(ranges[0].min.to_vec(), min);
        prop_assert_eq!(ranges[0].opt.to_vec(), opt);
        prop_assert_eq!(ranges[0].max.to_vec(), max);
    }

    #[test]
    fn opt_only_ranges_are_degenerate(opt in dims()) {
        let mut map = ConfigMap::new();
        map.insert("opt".into(), ConfigValue::shape(&opt));
        let ranges = parse_input_shapes(&ConfigValue::List(vec![ConfigValue::Map(map)])).unwrap();
        prop_assert_eq!(&ranges[0], &InputRange::fixed(Shape::from_slice(&opt)));
    }
}
