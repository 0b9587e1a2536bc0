use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// SUNAT catalogue 51 operation type for "Operación sujeta a detracción -
/// servicios de transporte de carga".
pub const OPERATION_DETRACCION_TRANSPORT: &str = "1004";

/// SUNAT catalogue 51 operation type for a plain domestic sale.
pub const OPERATION_INTERNAL_SALE: &str = "0101";

/// An invoice as seen by the UBL generator and the detracción pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Series and correlative number (e.g. "F001-00000123").
    pub number: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// SUNAT catalogue 01 document type ("01" factura, "03" boleta).
    pub invoice_type_code: String,
    /// SUNAT catalogue 51 operation type (e.g. "0101", "1004").
    pub operation_type: String,
    /// Document currency code (ISO 4217, e.g. "PEN").
    pub currency_code: String,
    /// Issuing party.
    pub supplier: Party,
    /// Receiving party.
    pub customer: Party,
    /// Invoice lines.
    pub lines: Vec<LineItem>,
    /// Freight origin ("dirección origen").
    pub origin_address: Option<Address>,
    /// Freight destination ("dirección destino").
    pub destination_address: Option<Address>,
    /// Calculated totals (set by `calculate_totals()`).
    pub totals: Option<Totals>,
}

impl Invoice {
    /// Payable amount, or zero when totals have not been calculated.
    pub fn total_amount(&self) -> Decimal {
        self.totals
            .as_ref()
            .map(|t| t.payable_amount)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Supplier or customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    /// Registered name (razón social).
    pub name: String,
    /// Identity document number (RUC, DNI, ...).
    pub document_id: Option<String>,
    /// SUNAT catalogue 06 document type ("6" = RUC, "1" = DNI).
    pub document_scheme: String,
}

/// A linked address record (origin or destination of a freight service).
///
/// The administrative code can come from three places; which ones are
/// consulted, and in which order, is decided by the caller's resolution
/// policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Display name, last-resort address text.
    pub name: String,
    /// Street line.
    pub street: Option<String>,
    /// Preformatted full address.
    pub contact_address: Option<String>,
    /// Code of the linked district record.
    pub district_code: Option<String>,
    /// Free ubigeo field.
    pub ubigeo: Option<String>,
    /// Postal code; only usable as ubigeo when it is six digits.
    pub postal_code: Option<String>,
}

impl Address {
    /// Free-text address line: street, then contact address, then name.
    pub fn address_line(&self) -> &str {
        [self.street.as_deref(), self.contact_address.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(self.name.as_str())
    }
}

/// Invoice line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Line identifier.
    pub id: String,
    /// Item description.
    pub description: String,
    /// Invoiced quantity.
    pub quantity: Decimal,
    /// Unit of measure (UN/ECE Rec 20, e.g. "ZZ" for services, "NIU" for units).
    pub unit: String,
    /// Net unit price.
    pub unit_price: Decimal,
    /// IGV rate in percent.
    pub igv_rate: Decimal,
    /// Calculated net line amount.
    pub line_amount: Option<Decimal>,
    /// Calculated IGV amount.
    pub tax_amount: Option<Decimal>,
}

/// Document totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line net amounts.
    pub net_total: Decimal,
    /// Sum of line IGV amounts.
    pub tax_total: Decimal,
    /// Net + IGV.
    pub payable_amount: Decimal,
}
