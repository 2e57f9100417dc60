//! `SeaORM` entity definitions.

pub mod sync_ledger;
