pub mod env;
pub mod fixtures;
