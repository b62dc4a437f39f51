use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `reposition_folio_counters` table: one row per month prefix
/// (`JN-REQ-MM-YY-`), incremented inside the reposition-creation
/// transaction. Replaces counting folios by table scan, which raced
/// under concurrent creation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reposition_folio_counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub prefix: String,
    pub counter: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
