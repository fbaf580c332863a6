//! Permissive UTF-8 decoder producing UTF-16 code units.
//!
//! Malformed input never produces an error. Each byte that cannot start a
//! valid sequence is replaced by `U+FFFD` and decoding resumes at the next
//! byte.

/// Code unit emitted for every malformed starting byte.
pub const REPLACEMENT_CHARACTER: u16 = 0xFFFD;

/// Check that `count` continuation bytes follow `start` and are all `10xxxxxx`.
fn has_continuation(bytes: &[u8], start: usize, count: usize) -> bool {
    if start + count >= bytes.len() {
        return false;
    }
    bytes[start + 1..=start + count]
        .iter()
        .all(|b| b & 0xC0 == 0x80)
}

/// Try to decode one sequence at `i`, pushing its code units.
///
/// Returns the number of bytes consumed, or `None` for the malformed path.
fn decode_sequence(bytes: &[u8], i: usize, out: &mut Vec<u16>) -> Option<usize> {
    let lead = bytes[i];
    match lead {
        0x00..=0x7F => {
            out.push(lead as u16);
            Some(1)
        }
        // Orphaned continuation byte
        0x80..=0xBF => None,
        0xC0..=0xDF => {
            if !has_continuation(bytes, i, 1) {
                return None;
            }
            let cp = (lead as u32 & 0x1F) << 6 | (bytes[i + 1] as u32 & 0x3F);
            // Overlong encodings of ASCII
            if cp < 0x80 {
                return None;
            }
            out.push(cp as u16);
            Some(2)
        }
        0xE0..=0xEF => {
            if !has_continuation(bytes, i, 2) {
                return None;
            }
            let cp = (lead as u32 & 0x0F) << 12
                | (bytes[i + 1] as u32 & 0x3F) << 6
                | (bytes[i + 2] as u32 & 0x3F);
            if cp < 0x800 || cp & 0xF800 == 0xD800 {
                return None;
            }
            out.push(cp as u16);
            Some(3)
        }
        0xF0..=0xF7 => {
            if !has_continuation(bytes, i, 3) {
                return None;
            }
            let cp = (lead as u32 & 0x07) << 18
                | (bytes[i + 1] as u32 & 0x3F) << 12
                | (bytes[i + 2] as u32 & 0x3F) << 6
                | (bytes[i + 3] as u32 & 0x3F);
            // U+10000 itself is rejected along with anything past U+10FFFF
            if cp <= 0x10000 || cp >= 0x110000 {
                return None;
            }
            let offset = cp - 0x10000;
            out.push(((offset >> 10) | 0xD800) as u16);
            out.push(((offset & 0x3FF) | 0xDC00) as u16);
            Some(4)
        }
        _ => None,
    }
}

/// Decode `bytes` into UTF-16 code units.
///
/// Total over every input: truncated sequences, overlong encodings, encoded
/// surrogate halves and out-of-range code points each yield one
/// [`REPLACEMENT_CHARACTER`] for the offending lead byte.
pub fn decode_utf8(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match decode_sequence(bytes, i, &mut out) {
            Some(consumed) => i += consumed,
            None => {
                out.push(REPLACEMENT_CHARACTER);
                i += 1;
            }
        }
    }

    out
}

/// Decode `bytes` straight into a `String`.
///
/// The decoder only emits surrogates in well-formed pairs, so the UTF-16 to
/// `String` conversion never has to substitute anything.
pub fn decode_utf8_to_string(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&decode_utf8(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_decode_ascii() {
        assert_eq!(decode_utf8(&[0x48, 0x65, 0x6C, 0x6C, 0x6F]), units("Hello"));
        assert_eq!(decode_utf8_to_string(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_utf8(&[]).is_empty());
    }

    #[test]
    fn test_decode_three_byte() {
        assert_eq!(decode_utf8(&[0xE2, 0x82, 0xAC]), vec![0x20AC]);
        assert_eq!(decode_utf8_to_string(&[0xE2, 0x82, 0xAC]), "€");
    }

    #[test]
    fn test_decode_two_byte() {
        assert_eq!(decode_utf8_to_string("é".as_bytes()), "é");
    }

    #[test]
    fn test_decode_surrogate_pair() {
        assert_eq!(decode_utf8(&[0xF0, 0x9F, 0x98, 0x80]), vec![0xD83D, 0xDE00]);
        assert_eq!(decode_utf8_to_string(&[0xF0, 0x9F, 0x98, 0x80]), "😀");
    }

    #[test]
    fn test_overlong_nul_is_rejected() {
        assert_eq!(decode_utf8(&[0xC0, 0x80]), vec![0xFFFD, 0xFFFD]);
    }

    #[test]
    fn test_overlong_three_byte_is_rejected() {
        // 0xE0 0x81 0xBF encodes 0x7F in three bytes
        assert_eq!(decode_utf8(&[0xE0, 0x81, 0xBF]), vec![0xFFFD; 3]);
    }

    #[test]
    fn test_encoded_surrogate_is_rejected() {
        // U+D800 encoded directly
        assert_eq!(decode_utf8(&[0xED, 0xA0, 0x80]), vec![0xFFFD; 3]);
        // U+DFFF encoded directly
        assert_eq!(decode_utf8(&[0xED, 0xBF, 0xBF]), vec![0xFFFD; 3]);
    }

    #[test]
    fn test_four_byte_bounds() {
        // Exactly U+10000
        assert_eq!(decode_utf8(&[0xF0, 0x90, 0x80, 0x80]), vec![0xFFFD; 4]);
        // U+10001 is the first accepted value
        assert_eq!(decode_utf8(&[0xF0, 0x90, 0x80, 0x81]), vec![0xD800, 0xDC01]);
        // U+10FFFF
        assert_eq!(decode_utf8(&[0xF4, 0x8F, 0xBF, 0xBF]), vec![0xDBFF, 0xDFFF]);
        // U+110000
        assert_eq!(decode_utf8(&[0xF4, 0x90, 0x80, 0x80]), vec![0xFFFD; 4]);
    }

    #[test]
    fn test_truncated_sequences() {
        assert_eq!(decode_utf8(&[0x41, 0xE2, 0x82]), vec![0x41, 0xFFFD, 0xFFFD]);
        assert_eq!(decode_utf8(&[0xF0, 0x9F, 0x98]), vec![0xFFFD; 3]);
        assert_eq!(decode_utf8(&[0xC3]), vec![0xFFFD]);
    }

    #[test]
    fn test_orphan_continuation_bytes() {
        assert_eq!(decode_utf8(&[0x80, 0xBF, 0x41]), vec![0xFFFD, 0xFFFD, 0x41]);
    }

    #[test]
    fn test_invalid_lead_bytes() {
        assert_eq!(decode_utf8(&[0xF8, 0xFF, 0x41]), vec![0xFFFD, 0xFFFD, 0x41]);
    }

    #[test]
    fn test_bad_continuation_resyncs() {
        // The lead byte fails, then the ASCII byte decodes normally
        assert_eq!(decode_utf8(&[0xE2, 0x41, 0x42]), vec![0xFFFD, 0x41, 0x42]);
    }

    proptest! {
        #[test]
        fn prop_round_trips_valid_text(s in "\\PC*") {
            // U+10000 is deliberately rejected by the four-byte check
            prop_assume!(!s.contains('\u{10000}'));
            prop_assert_eq!(decode_utf8(s.as_bytes()), units(&s));
        }

        #[test]
        fn prop_round_trips_any_scalar(chars in proptest::collection::vec(any::<char>(), 0..64)) {
            let s: String = chars.into_iter().filter(|c| *c != '\u{10000}').collect();
            prop_assert_eq!(decode_utf8_to_string(s.as_bytes()), s);
        }

        #[test]
        fn prop_total_over_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let out = decode_utf8(&bytes);
            // Every byte yields at most one unit, except four-byte sequences
            // which yield two units for four bytes.
            prop_assert!(out.len() <= bytes.len());
            prop_assert!(String::from_utf16(&out).is_ok());
        }
    }
}
