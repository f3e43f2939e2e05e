use trtspec_core::{ConfigValue, DeviceType, SpecError, SpecResult};

use crate::DEVICE_TYPE;

/// Accepts a framework device (must be a GPU), a canonical [`DeviceType`],
/// or the string `gpu` / `dla` in any case.
pub fn parse_device(value: &ConfigValue) -> SpecResult<DeviceType> {
    parse_device_at(value, DEVICE_TYPE)
}

pub(crate) fn parse_device_at(value: &ConfigValue, field: &str) -> SpecResult<DeviceType> {
    let invalid = |actual: String| SpecError::InvalidDevice {
        field: field.to_string(),
        actual,
    };

    match value {
        ConfigValue::Device(device) if device.is_gpu() => Ok(DeviceType::Gpu),
        ConfigValue::DeviceType(device) => Ok(*device),
        ConfigValue::Str(raw) => DeviceType::parse(raw).ok_or_else(|| invalid(value.describe())),
        other => Err(invalid(other.describe())),
    }
}
