use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::{Area, TRACKING_SEQUENCE};
use crate::entities::reposition::{Entity as RepositionEntity, RepositionStatus};
use crate::entities::reposition_history::{
    self, Entity as RepositionHistoryEntity, RepositionAction,
};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Pending,
}

#[derive(Debug, Serialize)]
pub struct TrackingStep {
    pub area: Area,
    pub state: StepState,
}

/// Step-by-step progress of one reposition across the fixed area
/// sequence, plus a completion percentage for the progress bar.
#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub reposition_id: Uuid,
    pub folio: String,
    pub status: RepositionStatus,
    pub current_area: Area,
    pub steps: Vec<TrackingStep>,
    pub progress_pct: f32,
}

/// Read-only projection over reposition history + `current_area`. No
/// stored state of its own: re-deriving it after any transition is always
/// consistent.
#[derive(Clone)]
pub struct TrackingService {
    db: Arc<DbPool>,
}

impl TrackingService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn tracking(&self, reposition_id: Uuid) -> Result<TrackingResponse, ServiceError> {
        let reposition = RepositionEntity::find_by_id(reposition_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Reposition {reposition_id} not found"))
            })?;

        let history = RepositionHistoryEntity::find()
            .filter(reposition_history::Column::RepositionId.eq(reposition_id))
            .filter(reposition_history::Column::Action.eq(RepositionAction::TransferAccepted))
            .order_by_asc(reposition_history::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let visited: Vec<Area> = history.iter().filter_map(|entry| entry.to_area).collect();

        let steps: Vec<TrackingStep> = TRACKING_SEQUENCE
            .iter()
            .map(|&area| {
                let state = if area == reposition.current_area {
                    StepState::Current
                } else if visited.contains(&area)
                    || (area == reposition.solicitante_area
                        && reposition.current_area != reposition.solicitante_area)
                {
                    // the ticket started in the requester's area, so that
                    // step counts as done once it has moved on
                    StepState::Completed
                } else {
                    StepState::Pending
                };
                TrackingStep { area, state }
            })
            .collect();

        let completed = steps
            .iter()
            .filter(|s| s.state == StepState::Completed)
            .count() as f32;
        let has_current = steps.iter().any(|s| s.state == StepState::Current);
        let progress_pct = (completed + if has_current { 0.5 } else { 0.0 })
            / TRACKING_SEQUENCE.len() as f32
            * 100.0;

        Ok(TrackingResponse {
            reposition_id,
            folio: reposition.folio,
            status: reposition.status,
            current_area: reposition.current_area,
            steps,
            progress_pct,
        })
    }
}
