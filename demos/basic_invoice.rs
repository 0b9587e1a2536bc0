use chrono::NaiveDate;
use factura_pe::core::*;
use factura_pe::ubl;
use rust_decimal_macros::dec;

fn main() {
    // Create a plain domestic sale (operation type 0101)
    let invoice = InvoiceBuilder::new("F001-00000123", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        .supplier(PartyBuilder::ruc("Transportes Andinos SAC", "20123456789").build())
        .customer(PartyBuilder::ruc("Minera Sur SA", "20987654321").build())
        .add_line(
            LineItemBuilder::new("1", "Alquiler de montacargas", dec!(8), dec!(95.50))
                .unit("HUR")
                .build(),
        )
        .add_line(LineItemBuilder::new("2", "Embalaje", dec!(1), dec!(49.90)).build())
        .build()
        .expect("invoice should be valid");

    let totals = invoice.totals.as_ref().unwrap();
    println!("Invoice:  {}", invoice.number);
    println!("Date:     {}", invoice.issue_date);
    println!("Supplier: {}", invoice.supplier.name);
    println!("Customer: {}", invoice.customer.name);
    println!("---");
    for line in &invoice.lines {
        println!(
            "  {} x {} {} @ {} = {}",
            line.quantity,
            line.unit,
            line.description,
            line.unit_price,
            line.line_amount.unwrap()
        );
    }
    println!("---");
    println!("Net:      {} {}", totals.net_total, invoice.currency_code);
    println!("IGV:      {} {}", totals.tax_total, invoice.currency_code);
    println!("Payable:  {} {}", totals.payable_amount, invoice.currency_code);

    let base = ubl::generate(&invoice).expect("UBL generation failed");
    for w in &base.warnings {
        println!("warning: {w}");
    }
    println!("\n{}", base.tree.to_xml_pretty().unwrap());
}
