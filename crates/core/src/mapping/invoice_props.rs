//! Property-based tests for invoice line ordering.
//!
//! Property 3: every tax line is immediately followed by a subtotal
//! Property 4: priced lines are never dropped or duplicated
//! Property 5: catalog lines precede the parts subtotal

use proptest::prelude::*;
use qbsync_shared::config::CatalogConfig;
use rust_decimal::Decimal;

use super::invoice::{LineKind, invoice_lines};
use crate::document::{DeclaredTax, DisposalFee, LaborLine, MiscCharge, PartLine, WorkLine};
use crate::testing::sample_invoice;

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn work_line() -> impl Strategy<Value = WorkLine> {
    (
        prop::collection::vec(amount(), 0..3),
        prop::collection::vec(amount(), 0..3),
        prop::collection::vec(amount(), 0..2),
        prop::collection::vec(amount(), 0..2),
    )
        .prop_map(|(parts, labors, misc, disposal)| WorkLine {
            item: "Unit".to_string(),
            parts: parts
                .into_iter()
                .map(|price| PartLine {
                    name: "Part".into(),
                    selling_price: price,
                    quantity: Decimal::ONE,
                    unit: String::new(),
                })
                .collect(),
            labors: labors
                .into_iter()
                .map(|rate| LaborLine {
                    name: "Labor".into(),
                    labor_per_hour: rate,
                    hours: Decimal::ONE,
                })
                .collect(),
            misc_charges: misc
                .into_iter()
                .map(|total| MiscCharge {
                    name: "Misc".into(),
                    total_amount: total,
                })
                .collect(),
            disposal_fees: disposal
                .into_iter()
                .map(|fee| DisposalFee {
                    name: "Fee".into(),
                    fee_amount: fee,
                    quantity: Decimal::ONE,
                    unit: String::new(),
                })
                .collect(),
        })
}

fn tax_codes() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Z]{3}", 0..3)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 3: For any invoice, a tax line is never the last line and is
    /// always followed by a subtotal.
    #[test]
    fn prop_tax_lines_followed_by_subtotal(
        work in prop::collection::vec(work_line(), 0..4),
        codes in tax_codes(),
        separate in any::<bool>(),
        labor_rate in prop::option::of(amount()),
    ) {
        let mut invoice = sample_invoice("WO-P");
        invoice.lines = work;
        invoice.parts_tax = codes.iter().map(|c| DeclaredTax {
            name: c.clone(),
            code: c.clone(),
            tax: Decimal::ONE,
            tax_amount: None,
        }).collect();
        invoice.labor_tax_same_as_part = !separate;
        invoice.labor_tax_percentage = labor_rate;

        let lines = invoice_lines(&invoice, &CatalogConfig::default());

        for (index, line) in lines.iter().enumerate() {
            if line.kind == LineKind::Tax {
                prop_assert!(lines.get(index + 1).is_some_and(|next| next.kind == LineKind::Subtotal));
            }
        }
    }

    /// Property 4: For any invoice, each part, labor, misc charge and
    /// disposal fee maps to exactly one line.
    #[test]
    fn prop_priced_lines_preserved(
        work in prop::collection::vec(work_line(), 0..4),
        separate in any::<bool>(),
    ) {
        let mut invoice = sample_invoice("WO-P");
        invoice.lines = work;
        invoice.labor_tax_same_as_part = !separate;

        let lines = invoice_lines(&invoice, &CatalogConfig::default());
        let count = |kind: LineKind| lines.iter().filter(|l| l.kind == kind).count();

        prop_assert_eq!(count(LineKind::Part), invoice.lines.iter().map(|w| w.parts.len()).sum::<usize>());
        prop_assert_eq!(count(LineKind::Labor), invoice.lines.iter().map(|w| w.labors.len()).sum::<usize>());
        prop_assert_eq!(count(LineKind::MiscCharge), invoice.lines.iter().map(|w| w.misc_charges.len()).sum::<usize>());
        prop_assert_eq!(count(LineKind::DisposalFee), invoice.lines.iter().map(|w| w.disposal_fees.len()).sum::<usize>());
    }

    /// Property 5: For any invoice, parts, misc charges and disposal fees all
    /// appear before the first subtotal.
    #[test]
    fn prop_catalog_lines_precede_parts_subtotal(
        work in prop::collection::vec(work_line(), 0..4),
        separate in any::<bool>(),
    ) {
        let mut invoice = sample_invoice("WO-P");
        invoice.lines = work;
        invoice.labor_tax_same_as_part = !separate;

        let lines = invoice_lines(&invoice, &CatalogConfig::default());
        let first_subtotal = lines.iter().position(|l| l.kind == LineKind::Subtotal).unwrap_or(lines.len());

        for line in &lines[first_subtotal..] {
            prop_assert!(!matches!(line.kind, LineKind::Part | LineKind::MiscCharge | LineKind::DisposalFee));
        }
    }
}
