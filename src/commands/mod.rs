pub mod config;
pub mod ensure;
