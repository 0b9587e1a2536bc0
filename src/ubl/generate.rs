use rust_decimal::Decimal;

use super::tree::{DocumentTree, Element};
use super::xml_utils::{format_amount, format_decimal};
use super::{SUNAT_CUSTOMIZATION_ID, UBL_VERSION_ID, ubl_ns};
use crate::core::*;

/// SUNAT catalogue 05 tax scheme for IGV.
const IGV_SCHEME_ID: &str = "1000";

/// An unmodified UBL invoice plus the non-fatal findings collected while
/// generating it.
#[derive(Debug, Clone)]
pub struct BaseDocument {
    pub tree: DocumentTree,
    pub warnings: Vec<ValidationError>,
}

/// Generate the base SUNAT UBL 2.1 invoice tree for an invoice.
///
/// The tree carries no detracción delivery data; that is added afterwards by
/// `detraccion::augment_document`.
pub fn generate(invoice: &Invoice) -> Result<BaseDocument, FacturaError> {
    let totals = invoice.totals.as_ref().ok_or_else(|| {
        FacturaError::Builder("totals must be calculated before XML generation".into())
    })?;
    let currency = invoice.currency_code.as_str();

    let mut warnings = validate_invoice(invoice);
    if invoice.customer.document_id.is_none() {
        warnings.push(ValidationError::new(
            "customer.document_id",
            "customer has no identity document; SUNAT will reject facturas without one",
        ));
    }

    let mut root = Element::new("Invoice")
        .with_attr("xmlns", ubl_ns::INVOICE)
        .with_attr("xmlns:cac", ubl_ns::CAC)
        .with_attr("xmlns:cbc", ubl_ns::CBC)
        .with_child(cbc("UBLVersionID", UBL_VERSION_ID))
        .with_child(cbc("CustomizationID", SUNAT_CUSTOMIZATION_ID))
        .with_child(cbc("ID", &invoice.number))
        .with_child(cbc("IssueDate", &invoice.issue_date.to_string()))
        // Catalogue 51 operation type travels as the listID of the type code
        .with_child(
            cbc("InvoiceTypeCode", &invoice.invoice_type_code)
                .with_attr("listID", invoice.operation_type.as_str()),
        )
        .with_child(cbc("DocumentCurrencyCode", currency))
        .with_child(party("AccountingSupplierParty", &invoice.supplier))
        .with_child(party("AccountingCustomerParty", &invoice.customer))
        .with_child(tax_total(
            totals.net_total,
            totals.tax_total,
            None,
            currency,
        ))
        .with_child(
            Element::new("cac:LegalMonetaryTotal")
                .with_child(amount("LineExtensionAmount", totals.net_total, currency))
                .with_child(amount(
                    "TaxInclusiveAmount",
                    totals.payable_amount,
                    currency,
                ))
                .with_child(amount("PayableAmount", totals.payable_amount, currency)),
        );

    for (i, line) in invoice.lines.iter().enumerate() {
        if line.quantity.is_zero() {
            warnings.push(ValidationError::new(
                format!("lines[{i}].quantity"),
                "line has zero quantity",
            ));
        }
        root.push_child(invoice_line(line, currency)?);
    }

    Ok(BaseDocument {
        tree: DocumentTree::new(root),
        warnings,
    })
}

fn cbc(local: &str, text: &str) -> Element {
    Element::new(format!("cbc:{local}")).with_text(text)
}

fn amount(local: &str, value: Decimal, currency: &str) -> Element {
    cbc(local, &format_amount(value)).with_attr("currencyID", currency)
}

fn party(wrapper: &str, party: &Party) -> Element {
    let mut inner = Element::new("cac:Party");
    if let Some(id) = &party.document_id {
        inner.push_child(
            Element::new("cac:PartyIdentification")
                .with_child(cbc("ID", id).with_attr("schemeID", party.document_scheme.as_str())),
        );
    }
    inner.push_child(
        Element::new("cac:PartyLegalEntity").with_child(cbc("RegistrationName", &party.name)),
    );
    Element::new(format!("cac:{wrapper}")).with_child(inner)
}

fn tax_total(
    taxable: Decimal,
    tax: Decimal,
    percent: Option<Decimal>,
    currency: &str,
) -> Element {
    let mut category = Element::new("cac:TaxCategory");
    if let Some(percent) = percent {
        category.push_child(cbc("Percent", &format_decimal(percent)));
    }
    category.push_child(
        Element::new("cac:TaxScheme")
            .with_child(cbc("ID", IGV_SCHEME_ID))
            .with_child(cbc("Name", "IGV"))
            .with_child(cbc("TaxTypeCode", "VAT")),
    );

    Element::new("cac:TaxTotal")
        .with_child(amount("TaxAmount", tax, currency))
        .with_child(
            Element::new("cac:TaxSubtotal")
                .with_child(amount("TaxableAmount", taxable, currency))
                .with_child(amount("TaxAmount", tax, currency))
                .with_child(category),
        )
}

fn invoice_line(line: &LineItem, currency: &str) -> Result<Element, FacturaError> {
    let (Some(net), Some(tax)) = (line.line_amount, line.tax_amount) else {
        return Err(FacturaError::Builder(format!(
            "line {} has no calculated amounts",
            line.id
        )));
    };

    Ok(Element::new("cac:InvoiceLine")
        .with_child(cbc("ID", &line.id))
        .with_child(
            cbc("InvoicedQuantity", &format_decimal(line.quantity))
                .with_attr("unitCode", line.unit.as_str()),
        )
        .with_child(amount("LineExtensionAmount", net, currency))
        .with_child(tax_total(net, tax, Some(line.igv_rate), currency))
        .with_child(Element::new("cac:Item").with_child(cbc("Description", &line.description)))
        .with_child(
            Element::new("cac:Price").with_child(amount("PriceAmount", line.unit_price, currency)),
        ))
}
