//! Fixed-layout text rendering of a market snapshot

use crate::{
    constants::{BASE_ASSET, REPORT_COLUMN_WIDTH},
    snapshot::MarketSnapshot,
};
use std::fmt::Write;

/// Renders the report shown in the widget
///
/// Layout and labels are fixed; every figure is rounded to a whole
/// number, comma-grouped and right-aligned in an 11-wide column.
pub fn render_report(snapshot: &MarketSnapshot) -> String {
    let mut out = String::with_capacity(256);

    // Writing into a String cannot fail
    let _ = writeln!(out, "{} ➔ {}", BASE_ASSET, snapshot.quote.code());
    out.push('\n');
    push_line(&mut out, "Bitcoin", snapshot.price);
    push_line(&mut out, "Moscow Time", snapshot.sats_per_unit);
    out.push('\n');
    push_line(&mut out, "No Fee", snapshot.fees.economy as f64);
    push_line(&mut out, "Low Fee", snapshot.fees.hour as f64);
    push_line(&mut out, "Medium Fee", snapshot.fees.half_hour as f64);
    push_line(&mut out, "High Fee", snapshot.fees.fastest as f64);
    out.push('\n');
    push_line(&mut out, "Block Height", snapshot.block_height as f64);
    push_line(&mut out, "Hashrate (PH)", snapshot.hashrate_phs);
    push_line(&mut out, "Unconfirmed", snapshot.unconfirmed as f64);

    // Last line carries no newline
    out.pop();
    out
}

fn push_line(out: &mut String, label: &str, value: f64) {
    let _ = writeln!(
        out,
        "{:<14}:{:>width$}",
        label,
        group_thousands(value),
        width = REPORT_COLUMN_WIDTH
    );
}

/// Formats `value` with no decimals and comma thousands separators
pub fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    grouped.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
