pub mod certificate;
pub mod config;

pub use certificate::*;
pub use config::*;
