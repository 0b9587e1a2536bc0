//! Core invoice types, builders and validation.
//!
//! This module provides the business-side model the UBL generator and the
//! detracción pipeline read from. It never touches XML.

mod builder;
pub mod currencies;
mod error;
mod types;
pub mod ubigeo;
mod validation;

pub use builder::*;
pub use currencies::is_known_currency_code;
pub use error::*;
pub use types::*;
pub use ubigeo::is_valid_ubigeo;
pub use validation::*;
