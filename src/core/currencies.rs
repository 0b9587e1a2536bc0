//! ISO 4217 currency codes accepted on SUNAT electronic invoices.

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// True when `code` has the shape of an ISO 4217 code (three uppercase letters).
pub fn is_currency_code_shape(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Currencies commonly used in Peruvian trade.
/// Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "ARS", // Argentine Peso
    "BOB", // Boliviano
    "BRL", // Brazilian Real
    "CAD", // Canadian Dollar
    "CHF", // Swiss Franc
    "CLP", // Chilean Peso
    "CNY", // Chinese Yuan
    "COP", // Colombian Peso
    "EUR", // Euro
    "GBP", // Pound Sterling
    "JPY", // Japanese Yen
    "MXN", // Mexican Peso
    "PEN", // Sol
    "USD", // US Dollar
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_currencies() {
        assert!(is_known_currency_code("PEN"));
        assert!(is_known_currency_code("USD"));
        assert!(is_known_currency_code("EUR"));
    }

    #[test]
    fn unknown_currencies() {
        assert!(!is_known_currency_code("XYZ"));
        assert!(!is_known_currency_code(""));
        assert!(!is_known_currency_code("pen"));
    }

    #[test]
    fn currency_shape() {
        assert!(is_currency_code_shape("PEN"));
        assert!(is_currency_code_shape("XYZ"));
        assert!(!is_currency_code_shape("Pen"));
        assert!(!is_currency_code_shape("PE"));
        assert!(!is_currency_code_shape("SOLES"));
    }

    #[test]
    fn list_is_sorted() {
        for window in CURRENCY_CODES.windows(2) {
            assert!(
                window[0] < window[1],
                "currency codes not sorted: {} >= {}",
                window[0],
                window[1]
            );
        }
    }
}
