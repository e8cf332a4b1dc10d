//! Numeric conversion and formatting
//!
//! The string-to-number side follows the script numeric-literal grammar:
//! optional whitespace, optional sign, `Infinity`, hex, or a decimal
//! literal; the empty string is zero and anything else is NaN. Rust's own
//! `f64` parser is more permissive (`inf`, `nan`, exponent-less `1e`), so
//! input is validated before it is handed over.
//!
//! The number-to-string side produces the canonical shortest round-trip
//! form: `ryu` supplies the shortest digit run, which is then reshaped into
//! plain or exponent notation by the decimal-point position.

/// Whitespace as the numeric grammar sees it (Unicode whitespace plus the
/// BOM, which script source treats as format control).
fn is_script_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Parse a string per the numeric-literal grammar (the ToNumber string rule).
///
/// Empty or whitespace-only input yields `0`; unparseable input yields NaN.
pub fn parse_number(s: &str) -> f64 {
    let t = s.trim_matches(is_script_whitespace);
    if t.is_empty() {
        return 0.0;
    }
    let (sign, rest) = match t.strip_prefix('-') {
        Some(r) => (-1.0, r),
        None => (1.0, t.strip_prefix('+').unwrap_or(t)),
    };
    if rest == "Infinity" {
        return sign * f64::INFINITY;
    }
    if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return f64::NAN;
        }
        let mut v = 0.0f64;
        for b in hex.bytes() {
            let digit = (b as char).to_digit(16).unwrap();
            v = v * 16.0 + digit as f64;
        }
        return sign * v;
    }
    if !is_decimal_literal(rest) {
        return f64::NAN;
    }
    match rest.parse::<f64>() {
        Ok(v) => sign * v,
        Err(_) => f64::NAN,
    }
}

/// Strict decimal-literal check: digits, optional fraction, optional
/// exponent, nothing else. Keeps Rust's `inf`/`nan` spellings out.
fn is_decimal_literal(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    let mut digits = false;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
        digits = true;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
            digits = true;
        }
    }
    if !digits {
        return false;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let mut exp_digits = false;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
            exp_digits = true;
        }
        if !exp_digits {
            return false;
        }
    }
    i == b.len()
}

/// Format a number in the canonical shortest round-trip form.
///
/// `-0` prints as `"0"`; non-finite values print as the literal words.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == f64::INFINITY {
        return "Infinity".to_string();
    }
    if n == f64::NEG_INFINITY {
        return "-Infinity".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        // Integral and below the exponent-notation cutoff: plain digits.
        let mut buf = itoa::Buffer::new();
        return buf.format(n as i128).to_string();
    }
    let mut buf = ryu::Buffer::new();
    reshape(buf.format(n))
}

/// Reshape ryu's shortest form into canonical notation.
///
/// `digits` below is the shortest digit run with value `0.digits * 10^point`.
/// Plain notation is used while `point` stays in `(-6, 21]`, exponent
/// notation (with an explicit `+`) outside of it.
fn reshape(shortest: &str) -> String {
    let (negative, rest) = match shortest.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, shortest),
    };
    let (mantissa, exp) = match rest.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i32>().expect("ryu exponent")),
        None => (rest, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut digits = String::with_capacity(int_part.len() + frac_part.len());
    digits.push_str(int_part);
    digits.push_str(frac_part);
    let mut point = int_part.len() as i32 + exp;

    let leading = digits.len() - digits.trim_start_matches('0').len();
    digits.drain(..leading);
    point -= leading as i32;
    digits.truncate(digits.trim_end_matches('0').len());
    debug_assert!(!digits.is_empty(), "zero is handled before reshape");

    let k = digits.len() as i32;
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if (1..=21).contains(&point) {
        if k <= point {
            out.push_str(&digits);
            for _ in 0..(point - k) {
                out.push('0');
            }
        } else {
            out.push_str(&digits[..point as usize]);
            out.push('.');
            out.push_str(&digits[point as usize..]);
        }
    } else if (-5..=0).contains(&point) {
        out.push_str("0.");
        for _ in 0..(-point) {
            out.push('0');
        }
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        let e = point - 1;
        if e >= 0 {
            out.push('+');
        }
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(e));
    }
    out
}

/// ToInteger: NaN becomes zero, infinities pass through, finite values
/// truncate toward zero.
pub fn to_integer(n: f64) -> f64 {
    if n.is_nan() { 0.0 } else { n.trunc() }
}

/// ToInt32: modulo 2^32 wraparound into the signed range; NaN and
/// infinities map to zero.
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ToUint32: modulo 2^32 wraparound; NaN and infinities map to zero.
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// ToInt16: modulo 2^16 wraparound into the signed range.
pub fn to_int16(n: f64) -> i16 {
    to_uint16(n) as i16
}

/// ToUint16: modulo 2^16 wraparound.
pub fn to_uint16(n: f64) -> u16 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(65_536.0) as u16
}
