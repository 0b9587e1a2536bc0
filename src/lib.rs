//! # factura-pe
//!
//! Peruvian SUNAT e-invoicing on UBL 2.1: invoice model, base document
//! generation, and the delivery blocks required on detracción freight
//! invoices.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use factura_pe::core::*;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("F001-42", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
//!     .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build())
//!     .customer(PartyBuilder::ruc("Minera Sur SA", "20987654321").build())
//!     .add_line(LineItemBuilder::new("1", "Servicio de carga", dec!(2), dec!(250)).build())
//!     .build()
//!     .unwrap();
//!
//! assert!(validate_invoice(&invoice).is_empty());
//! assert_eq!(invoice.totals.unwrap().payable_amount, dec!(590.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice types, builders, SUNAT validation, ubigeo checks |
//! | `ubl` | XML document tree, parsing, serialization, base UBL generation |
//! | `detraccion` | Origin/destination delivery augmentation for operation type 1004 |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ubl")]
pub mod ubl;

#[cfg(feature = "detraccion")]
pub mod detraccion;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
