//! INEI ubigeo (geographic location code) checks.
//!
//! A ubigeo is six digits: department (`01`–`25`), province and district,
//! two digits each. `150101` is Lima/Lima/Lima, `040101` Arequipa.

/// Number of digits in a ubigeo.
pub const UBIGEO_LEN: usize = 6;

/// Highest department number (Callao is `07`, Ucayali `25`).
const MAX_DEPARTMENT: u8 = 25;

/// True when `code` is exactly six ASCII digits.
pub fn is_six_digit_code(code: &str) -> bool {
    code.len() == UBIGEO_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// Check whether `code` is a well-formed INEI ubigeo.
pub fn is_valid_ubigeo(code: &str) -> bool {
    if !is_six_digit_code(code) {
        return false;
    }
    let pair = |i: usize| (code.as_bytes()[i] - b'0') * 10 + (code.as_bytes()[i + 1] - b'0');
    let (department, province, district) = (pair(0), pair(2), pair(4));
    (1..=MAX_DEPARTMENT).contains(&department) && province > 0 && district > 0
}
