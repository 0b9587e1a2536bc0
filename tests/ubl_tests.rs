#![cfg(feature = "ubl")]

use chrono::NaiveDate;
use factura_pe::core::*;
use factura_pe::ubl::{self, DocumentTree, Element};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn invoice() -> Invoice {
    InvoiceBuilder::new("F001-123", date(2024, 5, 2))
        .operation_type(OPERATION_DETRACCION_TRANSPORT)
        .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build())
        .customer(PartyBuilder::ruc("Minera Sur SA & Cía", "20987654321").build())
        .add_line(
            LineItemBuilder::new("1", "Flete <Lima> - Arequipa", dec!(2.5), dec!(100))
                .unit("TNE")
                .build(),
        )
        .build()
        .unwrap()
}

// --- Base generation ---

#[test]
fn generates_sunat_header() {
    let base = ubl::generate(&invoice()).unwrap();
    let root = base.tree.root();

    assert_eq!(root.name(), "Invoice");
    assert_eq!(base.tree.prefix_for(ubl::ubl_ns::CAC), Some("cac"));
    assert_eq!(base.tree.prefix_for(ubl::ubl_ns::INVOICE), Some(""));
    assert_eq!(root.text_at(&["cbc:UBLVersionID"]), Some("2.1"));
    assert_eq!(root.text_at(&["cbc:CustomizationID"]), Some("2.0"));
    assert_eq!(root.text_at(&["cbc:ID"]), Some("F001-123"));
    assert_eq!(root.text_at(&["cbc:IssueDate"]), Some("2024-05-02"));

    let type_code = root.child("cbc:InvoiceTypeCode").unwrap();
    assert_eq!(type_code.text(), Some("01"));
    assert_eq!(type_code.attr("listID"), Some("1004"));

    assert_eq!(
        root.text_at(&[
            "cac:AccountingSupplierParty",
            "cac:Party",
            "cac:PartyIdentification",
            "cbc:ID"
        ]),
        Some("20123456789")
    );
    assert_eq!(
        root.text_at(&[
            "cac:AccountingCustomerParty",
            "cac:Party",
            "cac:PartyLegalEntity",
            "cbc:RegistrationName"
        ]),
        Some("Minera Sur SA & Cía")
    );
    assert!(base.warnings.is_empty());
}

#[test]
fn generates_totals_and_lines() {
    let base = ubl::generate(&invoice()).unwrap();
    let root = base.tree.root();

    assert_eq!(
        root.text_at(&["cac:TaxTotal", "cbc:TaxAmount"]),
        Some("45.00")
    );
    assert_eq!(
        root.text_at(&["cac:LegalMonetaryTotal", "cbc:PayableAmount"]),
        Some("295.00")
    );

    let line = root.child("cac:InvoiceLine").unwrap();
    let qty = line.child("cbc:InvoicedQuantity").unwrap();
    assert_eq!(qty.attr("unitCode"), Some("TNE"));
    assert_eq!(qty.text(), Some("2.50"));
    assert_eq!(line.text_at(&["cbc:LineExtensionAmount"]), Some("250.00"));
    assert_eq!(
        line.text_at(&["cac:TaxTotal", "cac:TaxSubtotal", "cac:TaxCategory", "cbc:Percent"]),
        Some("18.00")
    );
    assert_eq!(
        line.text_at(&["cac:Item", "cbc:Description"]),
        Some("Flete <Lima> - Arequipa")
    );
    assert_eq!(
        line.descend(&["cac:Price", "cbc:PriceAmount"])
            .unwrap()
            .attr("currencyID"),
        Some("PEN")
    );
}

#[test]
fn generation_requires_totals() {
    let mut inv = invoice();
    inv.totals = None;
    assert!(matches!(ubl::generate(&inv), Err(FacturaError::Builder(_))));
}

#[test]
fn generation_collects_warnings() {
    let inv = InvoiceBuilder::new("F001-1", date(2024, 5, 2))
        .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build())
        .customer(PartyBuilder::new("Cliente sin documento").build())
        .add_line(LineItemBuilder::new("1", "Flete", dec!(0), dec!(100)).build())
        .build()
        .unwrap();
    let base = ubl::generate(&inv).unwrap();
    let fields: Vec<&str> = base.warnings.iter().map(|w| w.field.as_str()).collect();
    assert_eq!(fields, ["customer.document_id", "lines[0].quantity"]);
}

#[test]
fn generated_xml_escapes_and_reparses() {
    let base = ubl::generate(&invoice()).unwrap();
    let xml = base.tree.to_xml().unwrap();
    assert!(xml.contains("Minera Sur SA &amp; Cía"));
    assert!(xml.contains("Flete &lt;Lima&gt; - Arequipa"));
    assert_eq!(DocumentTree::parse(&xml).unwrap(), base.tree);
}

// --- Document tree ---

#[test]
fn parse_keeps_order_and_attributes() {
    let tree = DocumentTree::parse(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated -->
<Invoice xmlns:cbc="urn:cbc">
  <cbc:Note languageID="es" b="2">  uno  </cbc:Note>
  <cbc:Note><![CDATA[dos & tres]]></cbc:Note>
  <Empty/>
</Invoice>"#,
    )
    .unwrap();

    let root = tree.root();
    let names: Vec<&str> = root.children().iter().map(Element::name).collect();
    assert_eq!(names, ["cbc:Note", "cbc:Note", "Empty"]);

    let first = &root.children()[0];
    assert_eq!(first.text(), Some("uno"));
    assert_eq!(first.prefix(), Some("cbc"));
    assert_eq!(first.local_name(), "Note");
    assert_eq!(
        first.attributes(),
        [
            ("languageID".to_string(), "es".to_string()),
            ("b".to_string(), "2".to_string())
        ]
    );
    assert_eq!(root.children()[1].text(), Some("dos & tres"));
    assert_eq!(root.children()[2].text(), None);
    assert_eq!(tree.namespace_of("cbc"), Some("urn:cbc"));
    assert_eq!(tree.namespace_of("cac"), None);
}

#[test]
fn serialization_is_compact_without_declaration() {
    let tree = DocumentTree::new(
        Element::new("Invoice")
            .with_attr("xmlns:cbc", "urn:cbc")
            .with_child(Element::new("cbc:ID").with_text("F001-1"))
            .with_child(Element::new("cbc:Note").with_text("")),
    );
    assert_eq!(
        tree.to_xml().unwrap(),
        r#"<Invoice xmlns:cbc="urn:cbc"><cbc:ID>F001-1</cbc:ID><cbc:Note/></Invoice>"#
    );
    assert_eq!(tree.to_bytes().unwrap(), tree.to_xml().unwrap().into_bytes());
}

#[test]
fn pretty_output_reparses_to_same_tree() {
    let base = ubl::generate(&invoice()).unwrap();
    let pretty = base.tree.to_xml_pretty().unwrap();
    assert!(pretty.contains("\n  <cbc:UBLVersionID>2.1</cbc:UBLVersionID>"));
    assert_eq!(DocumentTree::parse(&pretty).unwrap(), base.tree);
}

#[test]
fn broken_documents_are_xml_errors() {
    for xml in [
        "",
        "<Invoice>",
        "<Invoice></Other>",
        "<a/><b/>",
        "text<a/>",
    ] {
        assert!(
            matches!(DocumentTree::parse(xml), Err(FacturaError::Xml(_))),
            "{xml:?} should not parse"
        );
    }
}

#[test]
fn editing_children() {
    let mut el = Element::new("cac:InvoiceLine")
        .with_child(Element::new("cbc:ID").with_text("1"))
        .with_child(Element::new("cac:TaxTotal"));

    el.insert_child(1, Element::new("cac:Delivery"));
    el.insert_child(99, Element::new("cac:Item"));
    let names: Vec<&str> = el.children().iter().map(Element::name).collect();
    assert_eq!(names, ["cbc:ID", "cac:Delivery", "cac:TaxTotal", "cac:Item"]);

    assert_eq!(el.remove_children(|c| c.local_name() == "Delivery"), 1);
    assert_eq!(el.children().len(), 3);

    el.set_attr("id", "a");
    el.set_attr("id", "b");
    assert_eq!(el.attr("id"), Some("b"));
    assert_eq!(el.attributes().len(), 1);
}

#[test]
fn qualify_names() {
    assert_eq!(ubl::qualify("cac", "Delivery"), "cac:Delivery");
    assert_eq!(ubl::qualify("", "Delivery"), "Delivery");
}

#[test]
fn amounts_have_two_decimals() {
    assert_eq!(ubl::format_amount(dec!(118)), "118.00");
    assert_eq!(ubl::format_amount(dec!(0.005)), "0.01");
    assert_eq!(ubl::format_amount(dec!(-2.345)), "-2.35");
}
