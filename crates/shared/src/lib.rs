pub mod domain;
pub mod envelope;
pub mod error;
