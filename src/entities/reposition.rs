use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Area;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RepositionType {
    #[sea_orm(string_value = "repocision")]
    Repocision,
    #[sea_orm(string_value = "reproceso")]
    Reproceso,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[sea_orm(string_value = "urgente")]
    Urgente,
    #[sea_orm(string_value = "intermedio")]
    Intermedio,
    #[sea_orm(string_value = "poco_urgente")]
    PocoUrgente,
}

/// Lifecycle of a rework ticket. `Completado` and `Eliminado` are
/// absorbing: no transition leaves them.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RepositionStatus {
    #[sea_orm(string_value = "pendiente")]
    Pendiente,
    #[sea_orm(string_value = "aprobado")]
    Aprobado,
    #[sea_orm(string_value = "rechazado")]
    Rechazado,
    #[sea_orm(string_value = "en_proceso")]
    EnProceso,
    #[sea_orm(string_value = "completado")]
    Completado,
    #[sea_orm(string_value = "eliminado")]
    Eliminado,
}

impl RepositionStatus {
    /// No operation ever proceeds from these states.
    pub fn is_terminal(self) -> bool {
        matches!(self, RepositionStatus::Completado | RepositionStatus::Eliminado)
    }
}

/// The `repositions` table: a rework/replacement ticket moving wholesale
/// between areas, independent of the order piece ledger.
///
/// Deletion is soft and carries its own `deleted_at`/`deletion_reason`
/// columns; `completed_at` means completion and nothing else.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repositions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `JN-REQ-{MM}-{YY}-{seq:03}`, sequence restarting monthly.
    #[sea_orm(unique)]
    pub folio: String,
    #[sea_orm(column_name = "type")]
    pub r#type: RepositionType,
    pub solicitante_nombre: String,
    pub solicitante_area: Area,
    pub no_solicitud: String,
    pub no_hoja: Option<String>,
    pub causante_dano: String,
    pub descripcion_suceso: String,
    pub modelo_prenda: String,
    pub tela: String,
    pub color: String,
    pub tipo_pieza: String,
    pub urgencia: Urgency,
    pub observaciones: Option<String>,
    pub current_area: Area,
    pub status: RepositionStatus,
    pub created_by: i32,
    pub approved_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deletion_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reposition_piece::Entity")]
    RepositionPieces,
    #[sea_orm(has_many = "super::reposition_transfer::Entity")]
    RepositionTransfers,
    #[sea_orm(has_many = "super::reposition_history::Entity")]
    RepositionHistory,
}

impl Related<super::reposition_piece::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RepositionPieces.def()
    }
}

impl Related<super::reposition_transfer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RepositionTransfers.def()
    }
}

impl Related<super::reposition_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RepositionHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
