// src/lib.rs

//! storewatch: competitor store crawling, catalog diffing and alert
//! classification.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

pub use error::{AppError, Result};
