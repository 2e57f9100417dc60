//! `SeaORM` Entity for the sync_ledger table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub document_kind: String,
    pub business_key: String,
    pub tenant: String,
    pub status: String,
    pub txn_id: Option<String>,
    pub ref_number: Option<String>,
    pub document_date: Option<Date>,
    pub processed_at: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
