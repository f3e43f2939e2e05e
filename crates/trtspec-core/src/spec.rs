use std::fmt;

use serde::Serialize;

use crate::{
    ConfigMap, ConfigValue, DeviceType, EngineCapability, Precision, Shape, SpecError, SpecResult,
};

pub const DEFAULT_NUM_MIN_TIMING_ITERS: u64 = 2;
pub const DEFAULT_NUM_AVG_TIMING_ITERS: u64 = 1;
pub const DEFAULT_WORKSPACE_SIZE: u64 = 0;
/// 0 leaves the batch size to the backend.
pub const DEFAULT_MAX_BATCH_SIZE: u64 = 0;

/// Shape envelope one engine input must support.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct InputRange {
    pub min: Shape,
    pub opt: Shape,
    pub max: Shape,
}

impl InputRange {
    pub fn new(min: Shape, opt: Shape, max: Shape) -> Self {
        Self { min, opt, max }
    }

    /// Degenerate range: `min == opt == max == shape`.
    pub fn fixed(shape: Shape) -> Self {
        Self {
            min: shape.clone(),
            opt: shape.clone(),
            max: shape,
        }
    }

    pub fn is_static(&self) -> bool {
        self.min == self.opt && self.opt == self.max
    }

    /// Checks that all three shapes share a rank and `min <= opt <= max` per dimension.
    pub fn validate(&self, field: &str) -> SpecResult<()> {
        let rank = self.opt.rank();
        if self.min.rank() != rank || self.max.rank() != rank {
            return Err(SpecError::InvalidRange {
                field: field.to_string(),
                reason: format!(
                    "min, opt and max must have the same rank (got {}, {}, {})",
                    self.min.rank(),
                    rank,
                    self.max.rank()
                ),
            });
        }

        let dims = self.min.dims().iter().zip(self.opt.dims()).zip(self.max.dims());
        for (axis, ((lo, opt), hi)) in dims.enumerate() {
            if !(lo <= opt && opt <= hi) {
                return Err(SpecError::InvalidRange {
                    field: field.to_string(),
                    reason: format!(
                        "dimension {axis} must satisfy min <= opt <= max (got {lo}, {opt}, {hi})"
                    ),
                });
            }
        }
        Ok(())
    }

    fn to_config(&self) -> ConfigValue {
        if self.is_static() {
            return ConfigValue::shape(self.opt.dims());
        }
        let mut map = ConfigMap::new();
        map.insert("min".into(), ConfigValue::shape(self.min.dims()));
        map.insert("opt".into(), ConfigValue::shape(self.opt.dims()));
        map.insert("max".into(), ConfigValue::shape(self.max.dims()));
        ConfigValue::Map(map)
    }
}

impl fmt::Display for InputRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static() {
            write!(f, "{}", self.opt)
        } else {
            write!(f, "(min: {}, opt: {}, max: {})", self.min, self.opt, self.max)
        }
    }
}

/// Canonical, fully validated engine build settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompileSpec {
    /// One per positional graph input, in order.
    pub input_ranges: Vec<InputRange>,
    pub op_precision: Precision,
    pub refit: bool,
    pub debug: bool,
    /// Kernels must run strictly in `op_precision`.
    pub strict_types: bool,
    /// Layers the DLA cannot run may fall back to the GPU.
    pub allow_gpu_fallback: bool,
    pub device: DeviceType,
    pub capability: EngineCapability,
    pub num_min_timing_iters: u64,
    pub num_avg_timing_iters: u64,
    pub workspace_size: u64,
    pub max_batch_size: u64,
}

impl CompileSpec {
    /// Spec with the given inputs and backend defaults for everything else.
    pub fn new(input_ranges: Vec<InputRange>) -> Self {
        Self {
            input_ranges,
            op_precision: Precision::default(),
            refit: false,
            debug: false,
            strict_types: false,
            allow_gpu_fallback: true,
            device: DeviceType::default(),
            capability: EngineCapability::default(),
            num_min_timing_iters: DEFAULT_NUM_MIN_TIMING_ITERS,
            num_avg_timing_iters: DEFAULT_NUM_AVG_TIMING_ITERS,
            workspace_size: DEFAULT_WORKSPACE_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    pub fn from_fixed_sizes<I, S>(sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Shape>,
    {
        Self::new(
            sizes
                .into_iter()
                .map(|s| InputRange::fixed(s.into()))
                .collect(),
        )
    }

    /// Re-expresses the spec as a raw config map using canonical tags.
    /// Normalizing the result yields an equal spec.
    pub fn to_config(&self) -> ConfigMap {
        let mut map = ConfigMap::new();
        map.insert(
            "input_shapes".into(),
            ConfigValue::List(self.input_ranges.iter().map(InputRange::to_config).collect()),
        );
        map.insert("op_precision".into(), self.op_precision.into());
        map.insert("refit".into(), self.refit.into());
        map.insert("debug".into(), self.debug.into());
        map.insert("strict_types".into(), self.strict_types.into());
        map.insert("allow_gpu_fallback".into(), self.allow_gpu_fallback.into());
        map.insert("device_type".into(), self.device.into());
        map.insert("capability".into(), self.capability.into());

        let tuning = [
            ("num_min_timing_iters", self.num_min_timing_iters),
            ("num_avg_timing_iters", self.num_avg_timing_iters),
            ("workspace_size", self.workspace_size),
            ("max_batch_size", self.max_batch_size),
        ];
        for (key, value) in tuning {
            map.insert(key.into(), ConfigValue::from(value));
        }
        map
    }
}

impl fmt::Display for CompileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Settings requested for engine:")?;
        for (i, range) in self.input_ranges.iter().enumerate() {
            write!(f, "\n    Input {i}: {range}")?;
        }
        write!(f, "\n    Operating Precision: {}", self.op_precision)?;
        write!(f, "\n    Make Refittable Engine: {}", self.refit)?;
        write!(f, "\n    Debuggable Engine: {}", self.debug)?;
        write!(f, "\n    Strict Types: {}", self.strict_types)?;
        write!(
            f,
            "\n    Allow GPU Fallback (if running on DLA): {}",
            self.allow_gpu_fallback
        )?;
        write!(f, "\n    Min Timing Iterations: {}", self.num_min_timing_iters)?;
        write!(f, "\n    Avg Timing Iterations: {}", self.num_avg_timing_iters)?;
        write!(f, "\n    Max Workspace Size: {}", self.workspace_size)?;
        if self.max_batch_size != 0 {
            write!(f, "\n    Max Batch Size: {}", self.max_batch_size)?;
        } else {
            write!(f, "\n    Max Batch Size: Not set")?;
        }
        write!(f, "\n    Device Type: {}", self.device)?;
        write!(f, "\n    Engine Capability: {}", self.capability)
    }
}
