use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Shape(pub SmallVec<[i64; 6]>);

impl Shape {
    pub fn from_slice(d: &[i64]) -> Self {
        Self(d.iter().copied().collect())
    }
    pub fn rank(&self) -> usize {
        self.0.len()
    }
    pub fn dims(&self) -> &[i64] {
        &self.0
    }
    pub fn to_vec(&self) -> Vec<i64> {
        self.0.to_vec()
    }
}

impl From<Vec<i64>> for Shape {
    fn from(dims: Vec<i64>) -> Self {
        Self(SmallVec::from_vec(dims))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Numeric-type tag as reported by the graph-capture front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 8-bit signed integer.
    Char,
    Byte,
    Int,
    Long,
    Half,
    BFloat16,
    Float,
    Double,
    Bool,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Char => "int8",
            ScalarType::Byte => "uint8",
            ScalarType::Int => "int32",
            ScalarType::Long => "int64",
            ScalarType::Half => "float16",
            ScalarType::BFloat16 => "bfloat16",
            ScalarType::Float => "float32",
            ScalarType::Double => "float64",
            ScalarType::Bool => "bool",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.strip_prefix("torch.").unwrap_or(raw);
        Some(match raw {
            "int8" | "char" => ScalarType::Char,
            "uint8" | "byte" => ScalarType::Byte,
            "int32" | "int" => ScalarType::Int,
            "int64" | "long" => ScalarType::Long,
            "float16" | "half" => ScalarType::Half,
            "bfloat16" => ScalarType::BFloat16,
            "float32" | "float" => ScalarType::Float,
            "float64" | "double" => ScalarType::Double,
            "bool" => ScalarType::Bool,
            _ => return None,
        })
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device descriptor as reported by the graph-capture front end (`cuda:0`, `cpu`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameworkDevice {
    pub kind: String,
    pub index: Option<u32>,
}

impl FrameworkDevice {
    pub fn new(kind: impl Into<String>, index: Option<u32>) -> Self {
        Self {
            kind: kind.into(),
            index,
        }
    }

    pub fn cuda(index: u32) -> Self {
        Self::new("cuda", Some(index))
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (kind, index) = match raw.split_once(':') {
            Some((kind, idx)) => (kind, Some(idx.parse::<u32>().ok()?)),
            None => (raw, None),
        };
        if kind.is_empty() {
            return None;
        }
        Some(Self::new(kind, index))
    }

    pub fn is_gpu(&self) -> bool {
        self.kind.eq_ignore_ascii_case("cuda") || self.kind.eq_ignore_ascii_case("gpu")
    }
}

impl fmt::Display for FrameworkDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(idx) => write!(f, "{}:{idx}", self.kind),
            None => f.write_str(&self.kind),
        }
    }
}

/// Operating precision of the built engine.
///
/// Discriminants are the backend's data-type codes and must not change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(i32)]
pub enum Precision {
    #[default]
    #[serde(rename = "float32")]
    Float = 0,
    #[serde(rename = "half")]
    Half = 1,
    #[serde(rename = "int8")]
    Int8 = 2,
}

impl Precision {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Precision::Float => "float32",
            Precision::Half => "half",
            Precision::Int8 => "int8",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "float32" | "float" | "fp32" => Some(Precision::Float),
            "half" | "float16" | "fp16" => Some(Precision::Half),
            "int8" | "char" => Some(Precision::Int8),
            _ => None,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default device an engine runs on. Discriminants are backend codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum DeviceType {
    #[default]
    Gpu = 0,
    Dla = 1,
}

impl DeviceType {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceType::Gpu => "gpu",
            DeviceType::Dla => "dla",
        }
    }

    /// Case-insensitive `gpu` / `dla`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("gpu") {
            Some(DeviceType::Gpu)
        } else if raw.eq_ignore_ascii_case("dla") {
            Some(DeviceType::Dla)
        } else {
            None
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Restricts which kernel implementations the builder may select.
/// Discriminants are backend codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum EngineCapability {
    #[default]
    Default = 0,
    SafeGpu = 1,
    SafeDla = 2,
}

impl EngineCapability {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            EngineCapability::Default => "default",
            EngineCapability::SafeGpu => "safe_gpu",
            EngineCapability::SafeDla => "safe_dla",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "default" => Some(EngineCapability::Default),
            "safe_gpu" => Some(EngineCapability::SafeGpu),
            "safe_dla" => Some(EngineCapability::SafeDla),
            _ => None,
        }
    }
}

impl fmt::Display for EngineCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_codes_are_stable() {
        assert_eq!(Precision::Float.code(), 0);
        assert_eq!(Precision::Half.code(), 1);
        assert_eq!(Precision::Int8.code(), 2);
        assert_eq!(DeviceType::Gpu.code(), 0);
        assert_eq!(DeviceType::Dla.code(), 1);
        assert_eq!(EngineCapability::Default.code(), 0);
        assert_eq!(EngineCapability::SafeGpu.code(), 1);
        assert_eq!(EngineCapability::SafeDla.code(), 2);
    }

    #[test]
    fn framework_device_parsing() {
        assert_eq!(FrameworkDevice::parse("cuda:1"), Some(FrameworkDevice::cuda(1)));
        assert_eq!(
            FrameworkDevice::parse("cpu"),
            Some(FrameworkDevice::new("cpu", None))
        );
        assert_eq!(FrameworkDevice::parse("cuda:x"), None);
        assert_eq!(FrameworkDevice::parse(":0"), None);
        assert!(FrameworkDevice::parse("CUDA").is_some_and(|d| d.is_gpu()));
    }

    #[test]
    fn scalar_type_accepts_framework_prefix() {
        assert_eq!(ScalarType::parse("torch.half"), Some(ScalarType::Half));
        assert_eq!(ScalarType::parse("float"), Some(ScalarType::Float));
        assert_eq!(ScalarType::parse("complex64"), None);
    }

    #[test]
    fn shape_display_and_rank() {
        let s = Shape::from_slice(&[1, 3, 224, 224]);
        assert_eq!(s.to_string(), "[1, 3, 224, 224]");
        assert_eq!(s.rank(), 4);
        assert_eq!(Shape::from_slice(&[]).to_string(), "[]");
    }
}
