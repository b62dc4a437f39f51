use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "transfer_request")]
    TransferRequest,
    #[sea_orm(string_value = "transfer_accepted")]
    TransferAccepted,
    #[sea_orm(string_value = "transfer_rejected")]
    TransferRejected,
    #[sea_orm(string_value = "order_completed")]
    OrderCompleted,
    #[sea_orm(string_value = "reposition_created")]
    RepositionCreated,
    #[sea_orm(string_value = "reposition_reviewed")]
    RepositionReviewed,
    #[sea_orm(string_value = "reposition_transfer")]
    RepositionTransfer,
    #[sea_orm(string_value = "completion_requested")]
    CompletionRequested,
    #[sea_orm(string_value = "reposition_completed")]
    RepositionCompleted,
    #[sea_orm(string_value = "reposition_deleted")]
    RepositionDeleted,
}

/// The `notifications` table: per-user inbox rows written as a best-effort
/// side effect of state transitions. Not part of the state machine's
/// correctness.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: i32,
    #[sea_orm(column_name = "type")]
    pub r#type: NotificationType,
    pub title: String,
    pub message: String,
    pub transfer_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub reposition_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
