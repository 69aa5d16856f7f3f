pub mod adapters;
pub mod core;
