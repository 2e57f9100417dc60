//! Sales tax rates known to the company file.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::protocol::Element;

/// One sales tax item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    /// Item name, matched against declared tax codes.
    pub name: String,
    /// Rate in percent.
    pub rate: Decimal,
    /// Inactive items are ignored when matching.
    pub is_active: bool,
}

impl TaxRate {
    /// Creates an active rate.
    #[must_use]
    pub fn active(name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            name: name.into(),
            rate,
            is_active: true,
        }
    }

    /// Creates an inactive rate.
    #[must_use]
    pub fn inactive(name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            is_active: false,
            ..Self::active(name, rate)
        }
    }

    /// Reads an `ItemSalesTaxRet` record.
    ///
    /// Returns `None` when the record has no name or an unreadable rate.
    #[must_use]
    pub fn from_record(record: &Element) -> Option<Self> {
        let name = record.child_text("Name")?.to_string();
        let rate = Decimal::from_str(record.child_text("TaxRate").unwrap_or("0").trim()).ok()?;
        let is_active = record
            .child_text("IsActive")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        Some(Self {
            name,
            rate,
            is_active,
        })
    }
}

/// Tax rates fetched once per session and reused for every document in the
/// batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxSnapshot {
    rates: Vec<TaxRate>,
}

impl TaxSnapshot {
    /// Creates a snapshot from a list of rates.
    #[must_use]
    pub fn new(rates: Vec<TaxRate>) -> Self {
        Self { rates }
    }

    /// Finds an active rate by exact name.
    #[must_use]
    pub fn active(&self, name: &str) -> Option<&TaxRate> {
        self.rates.iter().find(|r| r.is_active && r.name == name)
    }

    /// Number of rates, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// True when the snapshot holds no rates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
