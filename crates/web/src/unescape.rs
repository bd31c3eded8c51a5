use std::borrow::Cow;

use crate::UnescapeError;

/// Decodes `%XX` escapes in a captured URL value.
///
/// `+` is kept as is. A `%` not followed by two hex digits, or a result that
/// is not valid UTF-8, is an error.
pub fn unescape(value: &str) -> Result<Cow<'_, str>, UnescapeError> {
    if !value.contains('%') {
        return Ok(Cow::Borrowed(value));
    }

    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).copied().and_then(hex_value);
            let lo = bytes.get(i + 2).copied().and_then(hex_value);
            match (hi, lo) {
                (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                _ => return Err(UnescapeError::InvalidEscape { position: i }),
            }
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    match String::from_utf8(out) {
        Ok(value) => Ok(Cow::Owned(value)),
        Err(_) => Err(UnescapeError::InvalidUtf8),
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
