use rust_decimal::Decimal;

use crate::core::{FacturaError, round_amount};

pub(crate) fn xml_io(e: std::io::Error) -> FacturaError {
    FacturaError::Xml(format!("XML write error: {e}"))
}

pub(crate) fn xml_parse(e: impl std::fmt::Display) -> FacturaError {
    FacturaError::Xml(format!("XML parse error: {e}"))
}

/// Format a monetary amount with exactly two decimal places, rounding half
/// away from zero.
pub fn format_amount(d: Decimal) -> String {
    let mut rounded = round_amount(d);
    rounded.rescale(2);
    rounded.to_string()
}

/// Format a quantity or rate: at least two decimal places, trailing zeros
/// beyond that stripped.
pub(crate) fn format_decimal(d: Decimal) -> String {
    let s = d.normalize().to_string();
    if let Some(dot_pos) = s.find('.') {
        let decimals = s.len() - dot_pos - 1;
        if decimals < 2 {
            format!("{s}{}", "0".repeat(2 - decimals))
        } else {
            s
        }
    } else {
        format!("{s}.00")
    }
}
