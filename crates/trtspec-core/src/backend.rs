//! The form a [`CompileSpec`] takes when it crosses into the native builder.
//!
//! Enum fields are carried as the builder's integer codes.

use serde::Serialize;

use crate::{CompileSpec, InputRange, Precision};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BackendInputRange {
    pub min: Vec<i64>,
    pub opt: Vec<i64>,
    pub max: Vec<i64>,
}

impl From<&InputRange> for BackendInputRange {
    fn from(range: &InputRange) -> Self {
        Self {
            min: range.min.to_vec(),
            opt: range.opt.to_vec(),
            max: range.max.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BackendCompileSpec {
    pub input_ranges: Vec<BackendInputRange>,
    pub op_precision: i32,
    pub refit: bool,
    pub debug: bool,
    pub strict_types: bool,
    pub allow_gpu_fallback: bool,
    pub device: i32,
    pub capability: i32,
    pub num_min_timing_iters: u64,
    pub num_avg_timing_iters: u64,
    pub workspace_size: u64,
    pub max_batch_size: u64,
}

impl From<&CompileSpec> for BackendCompileSpec {
    fn from(spec: &CompileSpec) -> Self {
        Self {
            input_ranges: spec.input_ranges.iter().map(BackendInputRange::from).collect(),
            op_precision: spec.op_precision.code(),
            refit: spec.refit,
            debug: spec.debug,
            strict_types: spec.strict_types,
            allow_gpu_fallback: spec.allow_gpu_fallback,
            device: spec.device.code(),
            capability: spec.capability.code(),
            num_min_timing_iters: spec.num_min_timing_iters,
            num_avg_timing_iters: spec.num_avg_timing_iters,
            workspace_size: spec.workspace_size,
            max_batch_size: spec.max_batch_size,
        }
    }
}

impl From<CompileSpec> for BackendCompileSpec {
    fn from(spec: CompileSpec) -> Self {
        Self::from(&spec)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuilderFlag {
    Fp16,
    Int8,
    Refit,
    Debug,
    StrictTypes,
    GpuFallback,
}

impl CompileSpec {
    /// Builder flags the backend sets for this spec.
    ///
    /// INT8 engines also enable FP16 kernels unless `strict_types` is set.
    pub fn builder_flags(&self) -> Vec<BuilderFlag> {
        let mut flags = Vec::new();
        match self.op_precision {
            Precision::Half => flags.push(BuilderFlag::Fp16),
            Precision::Int8 => {
                flags.push(BuilderFlag::Int8);
                if !self.strict_types {
                    flags.push(BuilderFlag::Fp16);
                }
            }
            Precision::Float => {}
        }
        if self.refit {
            flags.push(BuilderFlag::Refit);
        }
        if self.debug {
            flags.push(BuilderFlag::Debug);
        }
        if self.strict_types {
            flags.push(BuilderFlag::StrictTypes);
        }
        if self.allow_gpu_fallback {
            flags.push(BuilderFlag::GpuFallback);
        }
        flags
    }
}
