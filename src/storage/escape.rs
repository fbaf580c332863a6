//! Legacy `escape` / `unescape` percent encoding used for cookie values.
//!
//! Works on UTF-16 code units: units below 256 become `%XX`, larger ones
//! `%uXXXX`. ASCII alphanumerics and `@*_+-./` pass through.

const UNRESERVED: &[u8] = b"@*_+-./";

/// Percent-encode `value` the way the legacy `escape` global does.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match u8::try_from(unit) {
            Ok(byte) if byte.is_ascii_alphanumeric() || UNRESERVED.contains(&byte) => {
                out.push(byte as char)
            }
            Ok(byte) => out.push_str(&format!("%{:02X}", byte)),
            Err(_) => out.push_str(&format!("%u{:04X}", unit)),
        }
    }
    out
}

/// Reverse [`escape`]. Malformed escapes are kept literally.
pub fn unescape(value: &str) -> String {
    let units: Vec<u16> = value.encode_utf16().collect();
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;

    while i < units.len() {
        if units[i] == u16::from(b'%') {
            if units.get(i + 1) == Some(&u16::from(b'u')) {
                if let Some(decoded) = hex_value(units.get(i + 2..i + 6)) {
                    out.push(decoded);
                    i += 6;
                    continue;
                }
            }
            if let Some(decoded) = hex_value(units.get(i + 1..i + 3)) {
                out.push(decoded);
                i += 3;
                continue;
            }
        }
        out.push(units[i]);
        i += 1;
    }

    String::from_utf16_lossy(&out)
}

fn hex_value(digits: Option<&[u16]>) -> Option<u16> {
    digits?.iter().try_fold(0u16, |acc, &unit| {
        let digit = char::from_u32(u32::from(unit))?.to_digit(16)?;
        Some(acc << 4 | digit as u16)
    })
}
