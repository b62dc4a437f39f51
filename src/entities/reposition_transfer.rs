use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Area;
use crate::entities::transfer::TransferStatus;

/// The `reposition_transfers` table: moves an entire reposition between
/// areas. Same pending/accepted/rejected shape as order transfers, but no
/// piece counts — only approved repositions may travel.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reposition_transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reposition_id: Uuid,
    pub from_area: Area,
    pub to_area: Area,
    pub notes: Option<String>,
    pub status: TransferStatus,
    pub created_by: i32,
    pub processed_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
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
