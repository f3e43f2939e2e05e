//! Loading compile configs from disk for the `trtspec` binary.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use trtspec_core::{BackendCompileSpec, BuilderFlag, CompileSpec, ConfigValue};

/// Reads a JSON config file and normalizes it.
pub fn load_spec(path: &Path) -> Result<CompileSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_spec(&text).with_context(|| format!("invalid compile config {}", path.display()))
}

pub fn parse_spec(text: &str) -> Result<CompileSpec> {
    let json: serde_json::Value = serde_json::from_str(text).context("config is not valid JSON")?;
    let value = ConfigValue::from_json(json)?;
    Ok(trtspec_normalize::normalize_value(&value)?)
}

/// What `trtspec encode` prints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EncodedReport {
    pub spec: BackendCompileSpec,
    pub builder_flags: Vec<BuilderFlag>,
}

impl From<CompileSpec> for EncodedReport {
    fn from(spec: CompileSpec) -> Self {
        let builder_flags = spec.builder_flags();
        Self {
            spec: BackendCompileSpec::from(spec),
            builder_flags,
        }
    }
}
