//! Document kind discriminator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of transactional document tracked by the sync ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Sales invoice keyed by work order id.
    Invoice,
    /// Vendor bill keyed by purchase order id.
    Bill,
}

impl DocumentKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Bill => "bill",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(Self::Invoice),
            "bill" => Ok(Self::Bill),
            other => Err(format!("unknown document kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_storage_form() {
        assert_eq!("invoice".parse::<DocumentKind>(), Ok(DocumentKind::Invoice));
        assert_eq!("bill".parse::<DocumentKind>(), Ok(DocumentKind::Bill));
        assert!("Invoice".parse::<DocumentKind>().is_err());
    }
}
