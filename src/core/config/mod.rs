pub mod data;
pub mod io;
pub mod printing;

pub use data::{Config, DatastoreKind};
pub use io::ConfigError;
