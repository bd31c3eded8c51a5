//! Utility macros and byte helpers for the HTTP crate.
//!
//! This module provides helper macros and functions that are used internally
//! by the request head parser and the response writer.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// It's useful for validation checks where you want to return early with an error
/// if some condition is not satisfied.
///
/// # Arguments
///
/// * `$predicate` - A boolean expression that should evaluate to true
/// * `$error` - The error value to return if the predicate is false
///
/// # Example
///
/// ```ignore
/// ensure!(header_count <= MAX_HEADER_COUNT, ParseError::too_many_headers(MAX_HEADER_COUNT));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Whitespace as understood by the header grammar.
#[inline]
pub(crate) fn is_space_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c)
}

/// `tchar` from RFC 9110, section 5.6.2.
#[inline]
pub(crate) fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}

#[inline]
pub(crate) fn trim_ws_left(p: &[u8]) -> &[u8] {
    let start = p.iter().position(|b| !is_space_byte(*b)).unwrap_or(p.len());
    &p[start..]
}

#[inline]
pub(crate) fn trim_ws_right(p: &[u8]) -> &[u8] {
    let end = p.iter().rposition(|b| !is_space_byte(*b)).map_or(0, |i| i + 1);
    &p[..end]
}

#[inline]
pub(crate) fn trim_ws(p: &[u8]) -> &[u8] {
    trim_ws_left(trim_ws_right(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_both_sides() {
        assert_eq!(trim_ws(b" \t foo bar \r\n"), b"foo bar");
        assert_eq!(trim_ws_left(b"  x "), b"x ");
        assert_eq!(trim_ws_right(b"  x \t"), b"  x");
        assert_eq!(trim_ws(b" \t "), b"");
        assert_eq!(trim_ws(b""), b"");
    }

    #[test]
    fn token_bytes() {
        assert!(b"Content-Type".iter().all(|b| is_token_byte(*b)));
        assert!(b"x_custom.header~1".iter().all(|b| is_token_byte(*b)));
        assert!(!is_token_byte(b':'));
        assert!(!is_token_byte(b' '));
        assert!(!is_token_byte(b'('));
    }
}
