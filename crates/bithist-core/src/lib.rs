pub mod config;
pub mod driver;
pub mod error;
pub mod serializer;

pub use config::ModelConfig;
pub use driver::ContextDriver;
pub use error::BitHistError;
