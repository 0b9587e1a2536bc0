use chrono::NaiveDate;
use factura_pe::core::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn supplier() -> Party {
    PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build()
}

fn customer() -> Party {
    PartyBuilder::ruc("Minera Sur SA", "20987654321").build()
}

// --- Domestic Invoice ---

#[test]
fn domestic_invoice_totals() {
    let inv = InvoiceBuilder::new("F001-00000123", date(2024, 5, 2))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineItemBuilder::new("1", "Transporte de mineral", dec!(3), dec!(1250.50))
                .unit("TNE")
                .build(),
        )
        .add_line(LineItemBuilder::new("2", "Estiba", dec!(1), dec!(99.99)).build())
        .build()
        .unwrap();

    let totals = inv.totals.as_ref().unwrap();
    assert_eq!(inv.lines[0].line_amount, Some(dec!(3751.50)));
    assert_eq!(inv.lines[0].tax_amount, Some(dec!(675.27)));
    assert_eq!(inv.lines[1].tax_amount, Some(dec!(18.00)));
    assert_eq!(totals.net_total, dec!(3851.49));
    assert_eq!(totals.tax_total, dec!(693.27));
    assert_eq!(totals.payable_amount, dec!(4544.76));
    assert_eq!(inv.total_amount(), dec!(4544.76));
    assert_eq!(inv.operation_type, OPERATION_INTERNAL_SALE);
    assert_eq!(inv.currency_code, "PEN");
}

#[test]
fn exonerated_line_has_no_igv() {
    let inv = InvoiceBuilder::new("F001-7", date(2024, 5, 2))
        .supplier(supplier())
        .customer(customer())
        .add_line(
            LineItemBuilder::new("1", "Libros", dec!(2), dec!(45))
                .igv_rate(dec!(0))
                .build(),
        )
        .build()
        .unwrap();
    assert_eq!(inv.total_amount(), dec!(90));
}

#[test]
fn freight_invoice_keeps_addresses() {
    let inv = InvoiceBuilder::new("F001-8", date(2024, 5, 2))
        .operation_type(OPERATION_DETRACCION_TRANSPORT)
        .currency("USD")
        .supplier(supplier())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Flete", dec!(1), dec!(500)).build())
        .origin(AddressBuilder::new("Almacén").district_code("150101").build())
        .destination(
            AddressBuilder::new("Planta")
                .contact_address("Km 12 Carretera Central")
                .build(),
        )
        .build()
        .unwrap();

    assert_eq!(inv.operation_type, "1004");
    assert_eq!(
        inv.origin_address.as_ref().unwrap().district_code.as_deref(),
        Some("150101")
    );
    assert_eq!(
        inv.destination_address.as_ref().unwrap().address_line(),
        "Km 12 Carretera Central"
    );
}

// --- Builder errors ---

#[test]
fn builder_requires_parties_and_lines() {
    let err = InvoiceBuilder::new("F001-1", date(2024, 5, 2))
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "x", dec!(1), dec!(1)).build())
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("supplier is required"));

    let err = InvoiceBuilder::new("F001-1", date(2024, 5, 2))
        .supplier(supplier())
        .customer(customer())
        .build()
        .unwrap_err();
    assert!(matches!(err, FacturaError::Builder(_)));
}

#[test]
fn build_reports_every_validation_error() {
    let err = InvoiceBuilder::new("123", date(2024, 5, 2))
        .currency("XXY")
        .supplier(PartyBuilder::ruc("", "2012").build())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", " ", dec!(1), dec!(-5)).build())
        .build()
        .unwrap_err();

    let FacturaError::Validation(msg) = err else {
        panic!("expected validation error");
    };
    for field in [
        "number",
        "currency_code",
        "supplier.name",
        "supplier.document_id",
        "lines[0].description",
        "lines[0].unit_price",
    ] {
        assert!(msg.contains(field), "{field} missing from {msg}");
    }
}

#[test]
fn build_unchecked_skips_validation() {
    let inv = InvoiceBuilder::new("not-a-number", date(2024, 5, 2))
        .supplier(PartyBuilder::new("Sin RUC").build())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Flete", dec!(1), dec!(10)).build())
        .build_unchecked()
        .unwrap();
    assert!(inv.totals.is_some());
    assert!(!validate_invoice(&inv).is_empty());
}

// --- Addresses ---

#[test]
fn address_line_fallbacks() {
    let full = AddressBuilder::new("Almacén")
        .street("Av. Test 123")
        .contact_address("Av. Test 123, Lima")
        .build();
    assert_eq!(full.address_line(), "Av. Test 123");

    let contact = AddressBuilder::new("Almacén")
        .contact_address("Av. Test 123, Lima")
        .build();
    assert_eq!(contact.address_line(), "Av. Test 123, Lima");

    let name_only = AddressBuilder::new("Almacén").contact_address("  ").build();
    assert_eq!(name_only.address_line(), "Almacén");
}

#[test]
fn ubigeo_checks() {
    assert!(is_valid_ubigeo("150101"));
    assert!(is_valid_ubigeo("250101"));
    assert!(!is_valid_ubigeo("260101"));
    assert!(!is_valid_ubigeo("150001"));
    assert!(!is_valid_ubigeo("15010"));
    assert!(!is_valid_ubigeo("15O101"));
}

// --- Errors ---

#[test]
fn precondition_messages_name_the_side() {
    let err: FacturaError = PreconditionError::MissingLink {
        side: AddressSide::Origin,
        operation_type: "1004".into(),
    }
    .into();
    assert_eq!(
        err.to_string(),
        "precondition failed: origin address is required for operation type 1004"
    );

    let as_validation: ValidationError = PreconditionError::InvalidCode {
        side: AddressSide::Destination,
        value: "LIMA".into(),
    }
    .into();
    assert_eq!(as_validation.field, "destination_address.ubigeo");
    assert_eq!(as_validation.rule.as_deref(), Some("detraccion"));
    assert!(as_validation.to_string().starts_with("[detraccion] destination_address.ubigeo"));
}

#[test]
fn invoice_serde_round_trip() {
    let inv = InvoiceBuilder::new("F001-9", date(2024, 5, 2))
        .supplier(supplier())
        .customer(customer())
        .add_line(LineItemBuilder::new("1", "Flete", dec!(1), dec!(10.10)).build())
        .build()
        .unwrap();
    let json = serde_json::to_string(&inv).unwrap();
    assert!(json.contains(r#""payable_amount":"11.92""#));
    let back: Invoice = serde_json::from_str(&json).unwrap();
    assert_eq!(back.total_amount(), inv.total_amount());
    assert_eq!(back.lines[0].line_amount, Some(dec!(10.10)));
}
