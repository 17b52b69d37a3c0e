pub mod client;
pub mod error;
pub mod model;

pub use client::*;
pub use error::*;
pub use model::*;
