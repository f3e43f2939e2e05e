pub mod backend;
pub mod error;
pub mod spec;
pub mod types;
pub mod value;

pub use backend::*;
pub use error::*;
pub use spec::*;
pub use types::*;
pub use value::*;
