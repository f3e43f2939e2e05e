//! Loosely-typed configuration values, as handed over by a host front end or
//! read from a JSON config file.

use std::collections::BTreeMap;
use std::fmt;

use crate::{
    DeviceType, EngineCapability, FrameworkDevice, Precision, ScalarType, SpecError, SpecResult,
};

pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// Name used for the top-level value in error paths.
pub const ROOT_FIELD: &str = "<root>";

const DESCRIBE_LIMIT: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Integer above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    Tuple(Vec<ConfigValue>),
    Map(ConfigMap),
    ScalarType(ScalarType),
    Device(FrameworkDevice),
    Precision(Precision),
    DeviceType(DeviceType),
    Capability(EngineCapability),
}

impl ConfigValue {
    /// Shorthand for a list of integer dimensions.
    pub fn shape(dims: &[i64]) -> Self {
        ConfigValue::List(dims.iter().copied().map(ConfigValue::Int).collect())
    }

    pub fn tuple(dims: &[i64]) -> Self {
        ConfigValue::Tuple(dims.iter().copied().map(ConfigValue::Int).collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) | ConfigValue::UInt(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::Str(_) => "string",
            ConfigValue::List(_) => "list",
            ConfigValue::Tuple(_) => "tuple",
            ConfigValue::Map(_) => "map",
            ConfigValue::ScalarType(_) => "dtype",
            ConfigValue::Device(_) => "device",
            ConfigValue::Precision(_) => "precision",
            ConfigValue::DeviceType(_) => "device type",
            ConfigValue::Capability(_) => "engine capability",
        }
    }

    /// Kind plus a (truncated) rendering of the value, for error messages.
    pub fn describe(&self) -> String {
        let mut rendered = self.to_string();
        if rendered.len() > DESCRIBE_LIMIT {
            let mut cut = DESCRIBE_LIMIT;
            while !rendered.is_char_boundary(cut) {
                cut -= 1;
            }
            rendered.truncate(cut);
            rendered.push_str("...");
        }
        format!("{} {}", self.kind(), rendered)
    }

    /// Elements of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) | ConfigValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Converts a JSON document into a config value.
    ///
    /// Typed tags are single-key objects: `{"$dtype": "half"}`,
    /// `{"$device": "cuda:0"}`, `{"$precision": "int8"}`,
    /// `{"$device_type": "dla"}` and `{"$capability": "safe_gpu"}`.
    pub fn from_json(value: serde_json::Value) -> SpecResult<Self> {
        from_json_at(value, ROOT_FIELD)
    }
}

/// Path of a map entry below `parent`.
pub fn child_field(parent: &str, key: &str) -> String {
    if parent == ROOT_FIELD {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Path of a sequence element below `parent`.
pub fn index_field(parent: &str, idx: usize) -> String {
    format!("{parent}[{idx}]")
}

fn from_json_at(value: serde_json::Value, field: &str) -> SpecResult<ConfigValue> {
    use serde_json::Value;

    Ok(match value {
        Value::Null => ConfigValue::Null,
        Value::Bool(b) => ConfigValue::Bool(b),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => ConfigValue::Int(i),
            (None, Some(u), _) => ConfigValue::UInt(u),
            (None, None, Some(x)) => ConfigValue::Float(x),
            (None, None, None) => {
                return Err(SpecError::type_mismatch(field, "an int or float", n.to_string()))
            }
        },
        Value::String(s) => ConfigValue::Str(s),
        Value::Array(items) => ConfigValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| from_json_at(item, &index_field(field, i)))
                .collect::<SpecResult<Vec<_>>>()?,
        ),
        Value::Object(obj) => {
            if obj.len() == 1 {
                if let Some((key, inner)) = obj.iter().next() {
                    if let Some(tagged) = decode_tag(key, inner, field)? {
                        return Ok(tagged);
                    }
                }
            }
            let mut map = ConfigMap::new();
            for (key, inner) in obj {
                let parsed = from_json_at(inner, &child_field(field, &key))?;
                map.insert(key, parsed);
            }
            ConfigValue::Map(map)
        }
    })
}

fn decode_tag(
    key: &str,
    inner: &serde_json::Value,
    field: &str,
) -> SpecResult<Option<ConfigValue>> {
    let expected = match key {
        "$dtype" => "a dtype name (int8, half, float32, ...)",
        "$device" => "a device descriptor such as `cuda:0`",
        "$precision" => "one of int8, half, float32",
        "$device_type" => "one of gpu, dla",
        "$capability" => "one of default, safe_gpu, safe_dla",
        _ => return Ok(None),
    };

    let mismatch = || {
        SpecError::type_mismatch(
            field,
            expected,
            format!("{key} tag with value {inner}"),
        )
    };
    let raw = inner.as_str().ok_or_else(mismatch)?;

    let value = match key {
        "$dtype" => ScalarType::parse(raw).map(ConfigValue::ScalarType),
        "$device" => FrameworkDevice::parse(raw).map(ConfigValue::Device),
        "$precision" => Precision::parse(raw).map(ConfigValue::Precision),
        "$device_type" => DeviceType::parse(raw).map(ConfigValue::DeviceType),
        _ => EngineCapability::parse(raw).map(ConfigValue::Capability),
    };
    value.map(Some).ok_or_else(mismatch)
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[ConfigValue]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => f.write_str("null"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::UInt(u) => write!(f, "{u}"),
            ConfigValue::Float(x) => write!(f, "{x:?}"),
            ConfigValue::Str(s) => write!(f, "{s:?}"),
            ConfigValue::List(items) => {
                write!(f, "[")?;
                write_seq(f, items)?;
                write!(f, "]")
            }
            ConfigValue::Tuple(items) => {
                write!(f, "(")?;
                write_seq(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            ConfigValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
            ConfigValue::ScalarType(t) => write!(f, "{t}"),
            ConfigValue::Device(d) => write!(f, "{d}"),
            ConfigValue::Precision(p) => write!(f, "{p}"),
            ConfigValue::DeviceType(d) => write!(f, "{d}"),
            ConfigValue::Capability(c) => write!(f, "{c}"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<i32> for ConfigValue {
    fn from(i: i32) -> Self {
        ConfigValue::Int(i64::from(i))
    }
}

impl From<u64> for ConfigValue {
    /// Uses `Int` whenever the value fits.
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(ConfigValue::UInt(u), ConfigValue::Int)
    }
}

impl From<f64> for ConfigValue {
    fn from(x: f64) -> Self {
        ConfigValue::Float(x)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Str(s)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigValue::List(items)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(map: ConfigMap) -> Self {
        ConfigValue::Map(map)
    }
}

impl From<ScalarType> for ConfigValue {
    fn from(t: ScalarType) -> Self {
        ConfigValue::ScalarType(t)
    }
}

impl From<FrameworkDevice> for ConfigValue {
    fn from(d: FrameworkDevice) -> Self {
        ConfigValue::Device(d)
    }
}

impl From<Precision> for ConfigValue {
    fn from(p: Precision) -> Self {
        ConfigValue::Precision(p)
    }
}

impl From<DeviceType> for ConfigValue {
    fn from(d: DeviceType) -> Self {
        ConfigValue::DeviceType(d)
    }
}

impl From<EngineCapability> for ConfigValue {
    fn from(c: EngineCapability) -> Self {
        ConfigValue::Capability(c)
    }
}
