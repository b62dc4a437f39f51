use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The `reposition_pieces` table: size/quantity lines attached to a
/// reposition. Informational only — not conserved like the order ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reposition_pieces")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reposition_id: Uuid,
    pub talla: String,
    pub cantidad: i32,
    pub folio_original: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reposition::Entity",
        from = "Column::RepositionId",
        to = "super::reposition::Column::Id"
    )]
    Reposition,
}

impl Related<super::reposition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reposition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
