#![no_main]

use chrono::NaiveDate;
use factura_pe::core::*;
use factura_pe::detraccion::{self, AugmentConfig, FailureMode};
use factura_pe::ubl::DocumentTree;
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

fn invoice() -> Invoice {
    InvoiceBuilder::new("F001-1", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        .operation_type(OPERATION_DETRACCION_TRANSPORT)
        .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build())
        .customer(PartyBuilder::ruc("Minera Sur SA", "20987654321").build())
        .add_line(LineItemBuilder::new("1", "Flete", Decimal::ONE, Decimal::ONE_HUNDRED).build())
        .origin(AddressBuilder::new("Origen").ubigeo("150101").build())
        .destination(AddressBuilder::new("Destino").ubigeo("040101").build())
        .build_unchecked()
        .unwrap()
}

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut tree) = DocumentTree::parse(s) else {
        return;
    };
    // Augmenting arbitrary documents must not panic and must be idempotent.
    let invoice = invoice();
    let config = AugmentConfig::default().with_failure_mode(FailureMode::BestEffort);
    if detraccion::augment_document(&invoice, &mut tree, &config).is_ok() {
        let once = tree.clone();
        let _ = detraccion::augment_document(&invoice, &mut tree, &config);
        assert_eq!(once, tree);
    }
});
