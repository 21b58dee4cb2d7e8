//! Payload to barcode-number extraction
//!
//! Detection backends report payloads tagged with their symbology, e.g.
//! `[EAN_13] 4006381333931`. The tag is a symbology prefix and never part of
//! the number, so it is discarded whole before digits are collected.

/// Concatenate all ASCII digits of `payload`, ignoring a leading `[...]`
/// symbology tag.
///
/// Order is preserved and everything else (tag, brackets, whitespace,
/// separators) is dropped. Input without digits yields an empty string.
pub fn extract_digits(payload: &str) -> String {
    strip_symbology_tag(payload)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Drop `count` leading digits from an extracted number.
///
/// Some payload formats carry extra leading digits ahead of the barcode
/// number. Dropping more digits than exist yields an empty string.
pub fn strip_prefix_digits(digits: &str, count: usize) -> &str {
    // `digits` is ASCII, so byte and char offsets agree
    digits.get(count..).unwrap_or("")
}

/// Format a payload with its symbology tag, as the localizer labels regions
pub fn tagged_payload(kind: &str, payload: &str) -> String {
    format!("[{}] {}", kind, payload)
}

fn strip_symbology_tag(payload: &str) -> &str {
    let trimmed = payload.trim_start();
    if let Some(rest) = trimmed.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return &rest[end + 1..];
        }
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tagged_payload() {
        assert_eq!(extract_digits("[EAN13] 4006381333931"), "4006381333931");
        assert_eq!(extract_digits("[EAN_13] 4006381333931"), "4006381333931");
        assert_eq!(
            extract_digits(&tagged_payload("EAN_13", "4006381333931")),
            "4006381333931"
        );
    }

    #[test]
    fn test_empty_and_no_digits() {
        assert_eq!(extract_digits(""), "");
        assert_eq!(extract_digits("abc"), "");
        assert_eq!(extract_digits("[EAN13]"), "");
    }

    #[test]
    fn test_untagged_payload_keeps_all_digits() {
        assert_eq!(extract_digits("40-0638 1333931"), "4006381333931");
        // An unterminated bracket is not a tag
        assert_eq!(extract_digits("[13 4006381333931"), "134006381333931");
    }

    #[test]
    fn test_strip_prefix_digits() {
        assert_eq!(strip_prefix_digits("134006381333931", 2), "4006381333931");
        assert_eq!(strip_prefix_digits("4006381333931", 0), "4006381333931");
        assert_eq!(strip_prefix_digits("1", 2), "");
        assert_eq!(strip_prefix_digits("", 2), "");
    }

    proptest! {
        #[test]
        fn prop_output_is_only_digits(s in ".*") {
            let digits = extract_digits(&s);
            prop_assert!(digits.chars().all(|c| c.is_ascii_digit()));
            prop_assert!(digits.len() <= s.len());
        }

        #[test]
        fn prop_untagged_digits_survive(d in "[0-9]{1,20}", noise in "[a-z ]{0,5}") {
            let payload = format!("{}{}{}", noise, d, noise);
            prop_assert_eq!(extract_digits(&payload), d);
        }
    }
}
