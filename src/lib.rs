pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::types::*;
pub use services::{aggregate, classify, presentation_for};
