use chrono::NaiveDate;
use factura_pe::core::*;
use factura_pe::detraccion::{self, AugmentConfig, FailureMode};
use factura_pe::ubl::{self, DocumentTree};
use rust_decimal_macros::dec;

fn freight(builder: InvoiceBuilder) -> InvoiceBuilder {
    builder
        .operation_type(OPERATION_DETRACCION_TRANSPORT)
        .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build())
        .customer(PartyBuilder::ruc("Minera Sur SA", "20987654321").build())
        .add_line(LineItemBuilder::new("1", "Flete", dec!(1), dec!(1500)).build())
}

fn main() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

    // ── 1. Builder error: missing required fields ─────────────────────
    println!("=== Builder Error ===");
    let result = InvoiceBuilder::new("F001-1", date)
        .customer(PartyBuilder::ruc("Minera Sur SA", "20987654321").build())
        .add_line(LineItemBuilder::new("1", "Flete", dec!(1), dec!(100)).build())
        .build();
    if let Err(e) = result {
        println!("  Build failed: {e}");
    }

    // ── 2. Validation errors are reported together ────────────────────
    println!("\n=== Validation Errors ===");
    let result = InvoiceBuilder::new("F1", date)
        .currency("SOL")
        .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "2012345").build())
        .customer(PartyBuilder::ruc("Minera Sur SA", "20987654321").build())
        .add_line(LineItemBuilder::new("1", "Flete", dec!(1), dec!(100)).build())
        .build();
    if let Err(e) = result {
        println!("  {e}");
    }

    // ── 3. Precondition: destination missing on a 1004 invoice ────────
    println!("\n=== Precondition ===");
    let invoice = freight(InvoiceBuilder::new("F001-2", date))
        .origin(AddressBuilder::new("Almacén").street("Av. Test 123").ubigeo("150101").build())
        .build()
        .unwrap();
    for problem in detraccion::validate_detraccion(&invoice, &AugmentConfig::default()) {
        println!("  Pre-flight: {problem}");
    }
    match detraccion::to_ubl_xml(&invoice, &AugmentConfig::default()) {
        Ok(_) => println!("  unexpected success"),
        Err(FacturaError::Precondition(p)) => println!("  Blocked ({} side): {p}", p.side()),
        Err(e) => println!("  Other error: {e}"),
    }

    // ── 4. Best effort keeps the base document ────────────────────────
    println!("\n=== Best Effort ===");
    let invoice = freight(InvoiceBuilder::new("F001-3", date))
        .origin(AddressBuilder::new("Almacén").street("Av. Test 123").ubigeo("150101").build())
        .destination(AddressBuilder::new("Planta").street("Jr. Prueba 45").ubigeo("040101").build())
        .build()
        .unwrap();
    // A document from another generator that forgot the cac namespace
    let xml = ubl::generate(&invoice)
        .unwrap()
        .tree
        .to_xml()
        .unwrap()
        .replace(&format!(r#" xmlns:cac="{}""#, ubl::ubl_ns::CAC), "");
    let mut tree = DocumentTree::parse(&xml).unwrap();

    let strict = AugmentConfig::default();
    match detraccion::augment_document(&invoice, &mut tree, &strict) {
        Ok(_) => println!("  unexpected success"),
        Err(e) => println!("  Strict: {e}"),
    }

    let best_effort = AugmentConfig::default().with_failure_mode(FailureMode::BestEffort);
    let report = detraccion::augment_document(&invoice, &mut tree, &best_effort).unwrap();
    println!("  Best effort augmented: {}", report.augmented);
    print!("{}", report.audit.to_json_lines().unwrap());

    // ── 5. Bad configuration ──────────────────────────────────────────
    println!("\n=== Configuration ===");
    if let Err(e) = AugmentConfig::from_json(r#"{"country_code": "Peru"}"#) {
        println!("  {e}");
    }
}
