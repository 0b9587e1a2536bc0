//! Peruvian UBL 2.1 document tree, parsing, serialization and base
//! generation.
//!
//! # Example
//!
//! ```no_run
//! use factura_pe::core::*;
//! use factura_pe::ubl;
//!
//! let invoice: Invoice = todo!(); // build via InvoiceBuilder
//! let base = ubl::generate(&invoice).unwrap();
//! let xml = base.tree.to_xml().unwrap();
//! let reparsed = ubl::DocumentTree::parse(&xml).unwrap();
//! ```

mod generate;
mod tree;
pub(crate) mod xml_utils;

pub use generate::{BaseDocument, generate};
pub use tree::{DocumentTree, Element, MAX_DEPTH, qualify};
pub use xml_utils::format_amount;

/// UBL version emitted in `cbc:UBLVersionID`.
pub const UBL_VERSION_ID: &str = "2.1";

/// SUNAT customization emitted in `cbc:CustomizationID`.
pub const SUNAT_CUSTOMIZATION_ID: &str = "2.0";

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}
