pub mod config;
pub mod gpu;
pub mod ladder;
pub mod policy;
