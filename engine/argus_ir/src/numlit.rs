//! Integer-literal radix detection and decimal rewriting.
//!
//! Token creation rewrites hexadecimal, octal, and binary integer literals
//! to their decimal spelling so analysis passes compare values textually.
//! Integer suffixes (`u`, `U`, `l`, `L`) are tolerated and dropped by the
//! rewrite.

/// Strip trailing integer suffix characters.
fn strip_suffix(text: &str) -> &str {
    text.trim_end_matches(['u', 'U', 'l', 'L'])
}

/// Hexadecimal integer literal (`0x...`).
pub fn is_hex(text: &str) -> bool {
    let body = strip_suffix(text);
    let Some(digits) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Octal integer literal: leading zero followed by octal digits.
pub fn is_oct(text: &str) -> bool {
    let body = strip_suffix(text);
    let Some(digits) = body.strip_prefix('0') else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| ('0'..='7').contains(&c))
}

/// Binary integer literal (`0b...`).
pub fn is_bin(text: &str) -> bool {
    let body = strip_suffix(text);
    let Some(digits) = body
        .strip_prefix("0b")
        .or_else(|| body.strip_prefix("0B"))
    else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| c == '0' || c == '1')
}

/// Rewrite a hex/oct/bin literal to decimal.
///
/// Returns `None` for literals of other forms, and for values that do not
/// fit `u64` (the literal is then left textually unchanged by the caller).
pub fn to_decimal(text: &str) -> Option<String> {
    let body = strip_suffix(text);
    let (digits, radix) = if is_hex(text) {
        (&body[2..], 16)
    } else if is_bin(text) {
        (&body[2..], 2)
    } else if is_oct(text) {
        (&body[1..], 8)
    } else {
        return None;
    };
    let value = u64::from_str_radix(digits, radix).ok()?;
    Some(value.to_string())
}
