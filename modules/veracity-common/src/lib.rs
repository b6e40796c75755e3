pub mod cache;
pub mod config;
pub mod types;

pub use cache::BoundedCache;
pub use config::Config;
pub use types::*;
