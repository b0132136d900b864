/// Enough fractional digits to print any finite `f64` exactly.
const EXACT_DIGITS: usize = 1074;

/// Formats `value` with `digits` decimals the way JavaScript's
/// `Number.prototype.toFixed` does: the exact binary value is rounded with
/// halves going up, where `{:.N}` would round halves to even.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut kept: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(digits))
        .collect();
    let round_up = fraction.as_bytes().get(digits).is_some_and(|d| *d >= b'5');
    if round_up {
        carry(&mut kept);
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(kept[..split].iter().map(|&d| char::from(d)));
    if digits > 0 {
        out.push('.');
        out.extend(kept[split..].iter().map(|&d| char::from(d)));
    }
    out
}

fn carry(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}
