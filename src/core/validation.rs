use rust_decimal::{Decimal, RoundingStrategy};

use super::currencies::is_known_currency_code;
use super::error::ValidationError;
use super::types::*;

/// Round a monetary amount to cents, half away from zero.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Calculate line amounts, IGV and document totals in place.
pub fn calculate_totals(invoice: &mut Invoice) {
    for line in &mut invoice.lines {
        let net = round_amount(line.quantity * line.unit_price);
        line.line_amount = Some(net);
        line.tax_amount = Some(round_amount(net * line.igv_rate / Decimal::ONE_HUNDRED));
    }

    let net_total: Decimal = invoice.lines.iter().filter_map(|l| l.line_amount).sum();
    let tax_total: Decimal = invoice.lines.iter().filter_map(|l| l.tax_amount).sum();

    invoice.totals = Some(Totals {
        net_total,
        tax_total,
        payable_amount: net_total + tax_total,
    });
}

/// Validate the invoice fields the UBL generator relies on.
///
/// Returns all errors found. Detracción-specific checks live in
/// `detraccion::validate_detraccion`.
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_document_number(&invoice.number) {
        errors.push(ValidationError::with_rule(
            "number",
            format!(
                "document number {:?} must be a 4-character series, '-' and up to 8 digits",
                invoice.number
            ),
            "SUNAT-1001",
        ));
    }

    if !is_known_currency_code(&invoice.currency_code) {
        errors.push(ValidationError::new(
            "currency_code",
            format!("unknown currency code {:?}", invoice.currency_code),
        ));
    }

    if invoice.operation_type.len() != 4
        || !invoice.operation_type.bytes().all(|b| b.is_ascii_digit())
    {
        errors.push(ValidationError::with_rule(
            "operation_type",
            format!(
                "operation type {:?} is not a catalogue 51 code",
                invoice.operation_type
            ),
            "catalogue-51",
        ));
    }

    if invoice.supplier.name.trim().is_empty() {
        errors.push(ValidationError::new("supplier.name", "supplier name is required"));
    }
    match invoice.supplier.document_id.as_deref() {
        Some(ruc) if is_ruc(ruc) => {}
        Some(ruc) => errors.push(ValidationError::new(
            "supplier.document_id",
            format!("supplier RUC {ruc:?} must be 11 digits"),
        )),
        None => errors.push(ValidationError::new(
            "supplier.document_id",
            "supplier RUC is required",
        )),
    }

    if invoice.customer.name.trim().is_empty() {
        errors.push(ValidationError::new("customer.name", "customer name is required"));
    }

    for (i, line) in invoice.lines.iter().enumerate() {
        if line.description.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("lines[{i}].description"),
                "line description is required",
            ));
        }
        if line.unit_price < Decimal::ZERO {
            errors.push(ValidationError::new(
                format!("lines[{i}].unit_price"),
                "unit price must not be negative",
            ));
        }
        if line.igv_rate < Decimal::ZERO {
            errors.push(ValidationError::new(
                format!("lines[{i}].igv_rate"),
                "IGV rate must not be negative",
            ));
        }
    }

    errors
}

/// `F001-123`, `B002-00004567`, `E001-1`.
fn is_document_number(number: &str) -> bool {
    let Some((series, correlative)) = number.split_once('-') else {
        return false;
    };
    series.len() == 4
        && series.bytes().all(|b| b.is_ascii_alphanumeric())
        && (1..=8).contains(&correlative.len())
        && correlative.bytes().all(|b| b.is_ascii_digit())
}

fn is_ruc(ruc: &str) -> bool {
    ruc.len() == 11 && ruc.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(round_amount(dec!(0.005)), dec!(0.01));
        assert_eq!(round_amount(dec!(2.345)), dec!(2.35));
        assert_eq!(round_amount(dec!(-2.345)), dec!(-2.35));
        assert_eq!(round_amount(dec!(18)), dec!(18));
    }

    #[test]
    fn document_numbers() {
        assert!(is_document_number("F001-123"));
        assert!(is_document_number("B002-00004567"));
        assert!(!is_document_number("F001123"));
        assert!(!is_document_number("F01-123"));
        assert!(!is_document_number("F001-123456789"));
        assert!(!is_document_number("F001-12a"));
    }
}
