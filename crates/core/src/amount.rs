//! Decimal formatting for wire documents and messages.

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats with exactly two decimal places, rounding half away from zero.
#[must_use]
pub fn fixed2(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Formats without trailing zeros (`2.50` becomes `2.5`, `3.00` becomes `3`).
#[must_use]
pub fn plain(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Formats a percentage for display, e.g. `5.00 %`.
#[must_use]
pub fn percent(value: Decimal) -> String {
    format!("{} %", fixed2(value))
}
