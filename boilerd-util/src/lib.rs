pub mod http;
pub mod json;
pub mod types;
