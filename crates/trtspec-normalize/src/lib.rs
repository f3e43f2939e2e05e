//! Turns a loosely-typed compile config into a canonical
//! [`CompileSpec`](trtspec_core::CompileSpec).
//!
//! ```
//! use trtspec_core::{ConfigMap, ConfigValue, DeviceType};
//!
//! let mut raw = ConfigMap::new();
//! raw.insert(
//!     "input_shapes".into(),
//!     ConfigValue::List(vec![ConfigValue::tuple(&[1, 3, 224, 224])]),
//! );
//! raw.insert("device_type".into(), "DLA".into());
//!
//! let spec = trtspec_normalize::normalize(&raw).unwrap();
//! assert_eq!(spec.device, DeviceType::Dla);
//! assert!(spec.input_ranges[0].is_static());
//! ```

pub mod device;
pub mod input;
pub mod normalize;
pub mod precision;

pub use device::parse_device;
pub use input::parse_input_shapes;
pub use normalize::*;
pub use precision::parse_precision;
