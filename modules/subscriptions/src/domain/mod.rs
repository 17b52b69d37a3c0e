pub mod error;
pub mod period;
pub mod repo;
pub mod service;
