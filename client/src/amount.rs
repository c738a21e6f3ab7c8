//! Display formatting for atomic XESS amounts.
//!
//! Amounts stay integers everywhere else; this is the only place a decimal
//! point appears, and it is produced by integer division, not floats.

use xess_claim::XESS_DECIMALS;

const ATOMIC_PER_XESS: u128 = 10u128.pow(XESS_DECIMALS as u32);

/// Formats `atomic` as XESS with thousands separators, truncating (not
/// rounding) to `decimals` fractional digits and dropping trailing zeros.
///
/// `format_xess(3_500_000_000, 2) == "3.5"`
pub fn format_xess(atomic: u128, decimals: usize) -> String {
    let whole = group_thousands(atomic / ATOMIC_PER_XESS);
    let decimals = decimals.min(XESS_DECIMALS as usize);
    if decimals == 0 {
        return whole;
    }
    let fraction = format!(
        "{:0width$}",
        atomic % ATOMIC_PER_XESS,
        width = XESS_DECIMALS as usize
    );
    let shown = fraction[..decimals].trim_end_matches('0');
    if shown.is_empty() {
        whole
    } else {
        format!("{whole}.{shown}")
    }
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
