use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::FacturaError;
use super::types::*;
use super::validation;

/// Builder for constructing invoices.
///
/// ```
/// use factura_pe::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("F001-123", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
///     .operation_type(OPERATION_DETRACCION_TRANSPORT)
///     .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build())
///     .customer(PartyBuilder::ruc("Minera Sur SA", "20987654321").build())
///     .add_line(LineItemBuilder::new("1", "Flete Lima - Arequipa", dec!(1), dec!(100)).build())
///     .origin(AddressBuilder::new("Almacén Lima").ubigeo("150101").build())
///     .destination(AddressBuilder::new("Planta Arequipa").ubigeo("040101").build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.total_amount(), dec!(118.00));
/// ```
pub struct InvoiceBuilder {
    number: String,
    issue_date: NaiveDate,
    invoice_type_code: String,
    operation_type: String,
    currency_code: String,
    supplier: Option<Party>,
    customer: Option<Party>,
    lines: Vec<LineItem>,
    origin_address: Option<Address>,
    destination_address: Option<Address>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            issue_date,
            invoice_type_code: "01".to_string(),
            operation_type: OPERATION_INTERNAL_SALE.to_string(),
            currency_code: "PEN".to_string(),
            supplier: None,
            customer: None,
            lines: Vec::new(),
            origin_address: None,
            destination_address: None,
        }
    }

    pub fn invoice_type_code(mut self, code: impl Into<String>) -> Self {
        self.invoice_type_code = code.into();
        self
    }

    pub fn operation_type(mut self, code: impl Into<String>) -> Self {
        self.operation_type = code.into();
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn origin(mut self, address: Address) -> Self {
        self.origin_address = Some(address);
        self
    }

    pub fn destination(mut self, address: Address) -> Self {
        self.destination_address = Some(address);
        self
    }

    /// Build the invoice, calculating totals and running validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Invoice, FacturaError> {
        let invoice = self.build_unchecked()?;

        let errors = validation::validate_invoice(&invoice);
        if !errors.is_empty() {
            let msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FacturaError::Validation(msg));
        }

        Ok(invoice)
    }

    /// Build without validation, e.g. for importing external data.
    pub fn build_unchecked(self) -> Result<Invoice, FacturaError> {
        let supplier = self
            .supplier
            .ok_or_else(|| FacturaError::Builder("supplier is required".into()))?;
        let customer = self
            .customer
            .ok_or_else(|| FacturaError::Builder("customer is required".into()))?;

        if self.lines.is_empty() {
            return Err(FacturaError::Builder(
                "at least one line item is required".into(),
            ));
        }
        if self.lines.len() > 10_000 {
            return Err(FacturaError::Builder(
                "invoice cannot have more than 10,000 line items".into(),
            ));
        }

        let mut invoice = Invoice {
            number: self.number,
            issue_date: self.issue_date,
            invoice_type_code: self.invoice_type_code,
            operation_type: self.operation_type,
            currency_code: self.currency_code,
            supplier,
            customer,
            lines: self.lines,
            origin_address: self.origin_address,
            destination_address: self.destination_address,
            totals: None,
        };

        validation::calculate_totals(&mut invoice);
        Ok(invoice)
    }
}

/// Builder for Party (supplier/customer).
pub struct PartyBuilder {
    name: String,
    document_id: Option<String>,
    document_scheme: String,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document_id: None,
            document_scheme: "6".to_string(),
        }
    }

    /// Party identified by RUC (catalogue 06 scheme "6").
    pub fn ruc(name: impl Into<String>, ruc: impl Into<String>) -> Self {
        Self::new(name).document("6", ruc)
    }

    pub fn document(mut self, scheme: impl Into<String>, id: impl Into<String>) -> Self {
        self.document_scheme = scheme.into();
        self.document_id = Some(id.into());
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            document_id: self.document_id,
            document_scheme: self.document_scheme,
        }
    }
}

/// Builder for linked origin/destination addresses.
pub struct AddressBuilder {
    address: Address,
}

impl AddressBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            address: Address {
                name: name.into(),
                ..Address::default()
            },
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.address.street = Some(street.into());
        self
    }

    pub fn contact_address(mut self, text: impl Into<String>) -> Self {
        self.address.contact_address = Some(text.into());
        self
    }

    pub fn district_code(mut self, code: impl Into<String>) -> Self {
        self.address.district_code = Some(code.into());
        self
    }

    pub fn ubigeo(mut self, code: impl Into<String>) -> Self {
        self.address.ubigeo = Some(code.into());
        self
    }

    pub fn postal_code(mut self, code: impl Into<String>) -> Self {
        self.address.postal_code = Some(code.into());
        self
    }

    pub fn build(self) -> Address {
        self.address
    }
}

/// Builder for LineItem.
pub struct LineItemBuilder {
    id: String,
    description: String,
    quantity: Decimal,
    unit: String,
    unit_price: Decimal,
    igv_rate: Decimal,
}

impl LineItemBuilder {
    /// A service line ("ZZ") taxed at the standard 18% IGV.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            quantity,
            unit: "ZZ".to_string(),
            unit_price,
            igv_rate: Decimal::new(18, 0),
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn igv_rate(mut self, rate: Decimal) -> Self {
        self.igv_rate = rate;
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            id: self.id,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            unit_price: self.unit_price,
            igv_rate: self.igv_rate,
            line_amount: None,
            tax_amount: None,
        }
    }
}
