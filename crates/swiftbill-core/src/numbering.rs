//! # Invoice Numbering
//!
//! Sequential `prefix + zero-padded counter` invoice numbers.
//!
//! ## Max-Scan
//! ```text
//! prefix = "INV", padding = 4
//!
//!   existing          strip "INV"    digits only?   value
//!   ───────────       ───────────    ────────────   ─────
//!   INV0001           "0001"         yes            1
//!   INV0009           "0009"         yes            9   ◄── max
//!   INV-DRAFT         "-DRAFT"       no             skipped
//!   BILL0042          (no prefix)    -              skipped
//!   INV               ""             no             skipped
//!
//!   next = 9 + 1 = 10  ──►  "INV0010"
//! ```
//!
//! Numbers written under an older prefix never feed the scan, so changing
//! the prefix restarts the sequence at 1 without touching history. A
//! counter wider than the padding is never truncated (`INV10000` follows
//! `INV9999`).

/// Extracts the sequence value from `candidate` when it is exactly
/// `prefix` followed by one or more ASCII digits.
///
/// ## Example
/// ```rust
/// use swiftbill_core::numbering::parse_sequence;
///
/// assert_eq!(parse_sequence("INV", "INV0042"), Some(42));
/// assert_eq!(parse_sequence("INV", "INV-7"), None);
/// assert_eq!(parse_sequence("INV", "BILL0001"), None);
/// ```
pub fn parse_sequence(prefix: &str, candidate: &str) -> Option<u64> {
    let suffix = candidate.strip_prefix(prefix)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Formats a sequence value under the numbering scheme.
#[inline]
pub fn format_invoice_number(prefix: &str, padding: u32, sequence: u64) -> String {
    format!("{}{:0width$}", prefix, sequence, width = padding as usize)
}

/// Computes the next invoice number from the numbers already issued.
///
/// ## Arguments
/// * `prefix` - Current `settings.invoice_prefix`
/// * `padding` - Current `settings.invoice_padding`
/// * `existing` - Invoice numbers to scan (any prefix; non-matching ones are ignored)
///
/// ## Example
/// ```rust
/// use swiftbill_core::numbering::next_invoice_number;
///
/// let issued = ["INV0001", "INV0002", "OLD0099"];
/// assert_eq!(next_invoice_number("INV", 4, issued), "INV0003");
/// assert_eq!(next_invoice_number("BILL", 4, issued), "BILL0001");
/// ```
pub fn next_invoice_number<I, S>(prefix: &str, padding: u32, existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let next = existing
        .into_iter()
        .filter_map(|no| parse_sequence(prefix, no.as_ref()))
        .max()
        .map_or(1, |max| max.saturating_add(1));

    format_invoice_number(prefix, padding, next)
}

// =============================================================================
// Unit Tests
// =============================================================================
