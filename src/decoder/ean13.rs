//! EAN-13 check-digit arithmetic
//!
//! Digits 0-11 are weighted 1,3,1,3,... from the left; the check digit is the
//! amount needed to bring the weighted sum up to the next multiple of ten.

/// Number of digits in an EAN-13 code
pub const EAN13_LEN: usize = 13;

/// Compute the check digit for the first 12 digits of an EAN-13 code.
///
/// Returns `None` unless `first12` is exactly 12 ASCII digits.
pub fn ean13_check_digit(first12: &str) -> Option<u8> {
    let bytes = first12.as_bytes();
    if bytes.len() != EAN13_LEN - 1 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(check_digit(bytes))
}

fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .take(EAN13_LEN - 1)
        .enumerate()
        .map(|(i, &b)| {
            let digit = (b - b'0') as u32;
            if i % 2 == 0 { digit } else { digit * 3 }
        })
        .sum();

    let rem = (sum % 10) as u8;
    if rem == 0 { 0 } else { 10 - rem }
}

/// Validate an EAN-13 barcode number.
///
/// Fails closed: anything other than exactly 13 ASCII digits is invalid.
pub fn is_valid_ean13(barcode: &str) -> bool {
    let bytes = barcode.as_bytes();
    if bytes.len() != EAN13_LEN || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    check_digit(bytes) == bytes[EAN13_LEN - 1] - b'0'
}
