pub mod batch;
pub mod config;
pub mod error;
pub mod field;
pub mod record;
pub mod value;

pub use batch::*;
pub use config::EngineConfig;
pub use error::*;
pub use field::*;
pub use record::*;
pub use value::*;
