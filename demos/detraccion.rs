use chrono::NaiveDate;
use factura_pe::core::*;
use factura_pe::detraccion::{self, AnchorPolicy, AugmentConfig, ReferenceValuePlacement};
use factura_pe::ubl::DocumentTree;
use rust_decimal_macros::dec;

fn main() {
    // Freight transport subject to detracción (operation type 1004)
    let invoice = InvoiceBuilder::new("F001-00000456", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        .operation_type(OPERATION_DETRACCION_TRANSPORT)
        .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build())
        .customer(PartyBuilder::ruc("Minera Sur SA", "20987654321").build())
        .add_line(
            LineItemBuilder::new("1", "Flete Lima - Arequipa", dec!(12), dec!(180))
                .unit("TNE")
                .build(),
        )
        .origin(
            AddressBuilder::new("Almacén Lima")
                .street("Av. Test 123")
                .district_code("150101")
                .build(),
        )
        .destination(
            AddressBuilder::new("Planta Arequipa")
                .street("Jr. Prueba 45")
                .ubigeo("040101")
                .build(),
        )
        .build()
        .expect("invoice should be valid");

    // Pre-flight check, e.g. before showing a "render" button
    let problems = detraccion::validate_detraccion(&invoice, &AugmentConfig::default());
    println!("Pre-flight problems: {}", problems.len());

    // 1. Default configuration: blocks in every line, no reference value
    let rendered = detraccion::to_ubl_xml(&invoice, &AugmentConfig::default())
        .expect("rendering failed");
    println!("Augmented: {}", rendered.augmented);
    println!("{}", DocumentTree::parse(&rendered.xml).unwrap().to_xml_pretty().unwrap());

    // 2. Header and lines, reference value after the destination
    let config = AugmentConfig::default()
        .with_anchor_policy(AnchorPolicy::HeaderAndLines)
        .with_reference_value(ReferenceValuePlacement::AfterDestination);
    let rendered = detraccion::to_ubl_xml(&invoice, &config).expect("rendering failed");

    let tree = DocumentTree::parse(&rendered.xml).unwrap();
    println!("\n=== Blocks ===");
    for (scope, block) in detraccion::extract_blocks(&tree).unwrap() {
        println!("  {scope}: {:?}", block.kind());
    }

    println!("\n=== Audit trail ===");
    print!("{}", rendered.audit.to_json_lines().unwrap());

    // 3. Configuration from JSON
    let config = AugmentConfig::from_json(
        r#"{"anchor_policy": "header", "code_policy": {"strictness": "lenient"}}"#,
    )
    .expect("invalid configuration");
    println!("\nFrom JSON: {:?}", config.anchor_policy);
}
