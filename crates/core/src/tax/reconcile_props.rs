//! Property-based tests for tax reconciliation.
//!
//! Property 1: one mismatch per unmatched declaration
//! Property 2: inactive rates never satisfy a declaration

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reconcile::{MismatchKind, reconcile};
use super::snapshot::{TaxRate, TaxSnapshot};
use crate::document::DeclaredTax;
use crate::testing::sample_invoice;

/// Strategy to generate a rate between 0.00 and 30.00 percent.
fn rate() -> impl Strategy<Value = Decimal> {
    (0i64..3000i64).prop_map(|basis| Decimal::new(basis, 2))
}

/// Strategy to generate a short tax code.
fn code() -> impl Strategy<Value = String> {
    "[A-Z]{2,4}"
}

fn declared(code: &str, tax: Decimal) -> DeclaredTax {
    DeclaredTax {
        name: code.to_string(),
        code: code.to_string(),
        tax,
        tax_amount: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: For any declarations against a snapshot holding the same
    /// codes, the mismatch count equals the number of differing rates.
    #[test]
    fn prop_mismatch_count_matches_rate_differences(
        entries in prop::collection::btree_map(code(), (rate(), rate()), 0..6),
    ) {
        let mut invoice = sample_invoice("WO-P");
        invoice.parts_tax = entries
            .iter()
            .map(|(code, (declared_rate, _))| declared(code, *declared_rate))
            .collect();
        let snapshot = TaxSnapshot::new(
            entries
                .iter()
                .map(|(code, (_, known_rate))| TaxRate::active(code.clone(), *known_rate))
                .collect(),
        );

        let expected = entries.values().filter(|(d, k)| d != k).count();
        let mismatches = reconcile(&invoice, &snapshot, "Labor Tax");

        prop_assert_eq!(mismatches.len(), expected);
        prop_assert!(mismatches.iter().all(|m| m.kind == MismatchKind::RateMismatch));
    }

    /// Property 2: For any declaration whose only match is inactive, the
    /// result is a single NOT_FOUND entry regardless of rate.
    #[test]
    fn prop_inactive_rate_never_matches(code in code(), tax in rate()) {
        let mut invoice = sample_invoice("WO-P");
        invoice.parts_tax = vec![declared(&code, tax)];
        let snapshot = TaxSnapshot::new(vec![TaxRate::inactive(code.clone(), tax)]);

        let mismatches = reconcile(&invoice, &snapshot, "Labor Tax");

        prop_assert_eq!(mismatches.len(), 1);
        prop_assert_eq!(mismatches[0].kind, MismatchKind::NotFound);
    }
}
