use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::{Actor, Area};
use crate::entities::notification::NotificationType;
use crate::entities::reposition::{self, Entity as RepositionEntity, RepositionStatus};
use crate::entities::reposition_history::RepositionAction;
use crate::entities::reposition_transfer::{self, Entity as RepositionTransferEntity};
use crate::entities::transfer::TransferStatus;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::notifications::{NewNotification, NotificationService};
use crate::services::repositions::append_history;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessDecision {
    Accepted,
    Rejected,
}

/// Transfer state machine for repositions: same pending/accepted/rejected
/// shape as order transfers, but the ticket moves wholesale — acceptance
/// rewrites `current_area`, nothing is counted or split.
#[derive(Clone)]
pub struct RepositionTransferService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    notifier: Arc<NotificationService>,
}

impl RepositionTransferService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        notifier: Arc<NotificationService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            notifier,
        }
    }

    /// Creates a pending transfer out of the requester's area. Only an
    /// approved ticket may travel; every other status is spelled out so a
    /// new status forces this gate to be revisited.
    #[instrument(skip(self, notes), fields(reposition_id = %reposition_id, to_area = %to_area, actor_id = actor.id))]
    pub async fn request_transfer(
        &self,
        actor: Actor,
        reposition_id: Uuid,
        to_area: Area,
        notes: Option<String>,
    ) -> Result<reposition_transfer::Model, ServiceError> {
        let reposition = RepositionEntity::find_by_id(reposition_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Reposition {reposition_id} not found"))
            })?;

        match reposition.status {
            RepositionStatus::Aprobado => {}
            RepositionStatus::Pendiente => {
                return Err(ServiceError::ValidationError(format!(
                    "La solicitud {} aún no está aprobada",
                    reposition.folio
                )));
            }
            RepositionStatus::Rechazado => {
                return Err(ServiceError::ValidationError(format!(
                    "La solicitud {} fue rechazada y no puede transferirse",
                    reposition.folio
                )));
            }
            RepositionStatus::EnProceso => {
                return Err(ServiceError::ValidationError(format!(
                    "La solicitud {} está en proceso y no puede transferirse",
                    reposition.folio
                )));
            }
            RepositionStatus::Completado | RepositionStatus::Eliminado => {
                return Err(ServiceError::AlreadyProcessed(format!(
                    "La solicitud {} ya fue finalizada",
                    reposition.folio
                )));
            }
        }

        let now = Utc::now();
        let transfer_id = Uuid::new_v4();
        let from_area = actor.area;
        let txn = self.db.begin().await?;

        let model = reposition_transfer::ActiveModel {
            id: Set(transfer_id),
            reposition_id: Set(reposition_id),
            from_area: Set(from_area),
            to_area: Set(to_area),
            notes: Set(notes),
            status: Set(TransferStatus::Pending),
            created_by: Set(actor.id),
            processed_by: Set(None),
            created_at: Set(now),
            processed_at: Set(None),
        }
        .insert(&txn)
        .await?;

        append_history(
            &txn,
            reposition_id,
            RepositionAction::TransferRequested,
            format!(
                "Transferencia solicitada de {} a {}",
                from_area, to_area
            ),
            actor.id,
            Some(from_area),
            Some(to_area),
        )
        .await?;

        txn.commit().await?;

        info!(transfer_id = %transfer_id, folio = %reposition.folio, "Reposition transfer requested");

        if let Err(e) = self
            .event_sender
            .send(Event::RepositionTransferRequested {
                reposition_id,
                transfer_id,
                from_area,
                to_area,
            })
            .await
        {
            warn!(error = %e, transfer_id = %transfer_id, "Failed to send reposition transfer event");
        }

        self.notifier
            .notify_areas(
                &[to_area],
                NewNotification::new(
                    NotificationType::RepositionTransfer,
                    "Reposición en camino",
                    format!(
                        "La solicitud {} espera aceptación en {}",
                        reposition.folio, to_area
                    ),
                )
                .for_reposition(reposition_id),
            )
            .await;

        Ok(model)
    }

    /// Resolves a pending transfer. Acceptance moves the whole ticket:
    /// `current_area := to_area`. Rejection only records the outcome.
    #[instrument(skip(self), fields(transfer_id = %transfer_id, actor_id = actor.id, decision = ?decision))]
    pub async fn process(
        &self,
        actor: Actor,
        transfer_id: Uuid,
        decision: ProcessDecision,
    ) -> Result<reposition_transfer::Model, ServiceError> {
        let transfer = RepositionTransferEntity::find_by_id(transfer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Reposition transfer {transfer_id} not found"))
            })?;

        if !actor.can_process_transfer_to(transfer.to_area) {
            return Err(ServiceError::Forbidden(format!(
                "Only {} can resolve this transfer",
                transfer.to_area
            )));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let current = RepositionTransferEntity::find_by_id(transfer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Reposition transfer {transfer_id} not found"))
            })?;

        match current.status {
            TransferStatus::Pending => {}
            TransferStatus::Accepted | TransferStatus::Rejected => {
                return Err(ServiceError::AlreadyProcessed(format!(
                    "Reposition transfer {transfer_id} was already resolved"
                )));
            }
        }

        let reposition = RepositionEntity::find_by_id(current.reposition_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Reposition {} not found", current.reposition_id))
            })?;

        // The ticket may have been finalized between request and resolution.
        if reposition.status.is_terminal() {
            return Err(ServiceError::AlreadyProcessed(format!(
                "La solicitud {} ya fue finalizada",
                reposition.folio
            )));
        }

        let folio = reposition.folio.clone();
        let (status, action) = match decision {
            ProcessDecision::Accepted => (TransferStatus::Accepted, RepositionAction::TransferAccepted),
            ProcessDecision::Rejected => (TransferStatus::Rejected, RepositionAction::TransferRejected),
        };

        if decision == ProcessDecision::Accepted {
            let mut active: reposition::ActiveModel = reposition.into();
            active.current_area = Set(current.to_area);
            active.update(&txn).await?;
        }

        let verdict = match decision {
            ProcessDecision::Accepted => "aceptada",
            ProcessDecision::Rejected => "rechazada",
        };
        append_history(
            &txn,
            current.reposition_id,
            action,
            format!(
                "Transferencia {verdict} de {} a {}",
                current.from_area, current.to_area
            ),
            actor.id,
            Some(current.from_area),
            Some(current.to_area),
        )
        .await?;

        let mut resolved: reposition_transfer::ActiveModel = current.clone().into();
        resolved.status = Set(status);
        resolved.processed_by = Set(Some(actor.id));
        resolved.processed_at = Set(Some(now));
        let resolved = resolved.update(&txn).await?;

        txn.commit().await?;

        info!(transfer_id = %transfer_id, folio = %folio, ?decision, "Reposition transfer resolved");

        let event = match decision {
            ProcessDecision::Accepted => Event::RepositionTransferAccepted {
                reposition_id: current.reposition_id,
                transfer_id,
                to_area: current.to_area,
            },
            ProcessDecision::Rejected => Event::RepositionTransferRejected {
                reposition_id: current.reposition_id,
                transfer_id,
            },
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, transfer_id = %transfer_id, "Failed to send reposition transfer event");
        }

        self.notifier
            .notify(
                current.created_by,
                NewNotification::new(
                    NotificationType::RepositionTransfer,
                    "Transferencia de reposición resuelta",
                    format!("La transferencia de {folio} a {} fue {verdict}", current.to_area),
                )
                .for_reposition(current.reposition_id),
            )
            .await;

        Ok(resolved)
    }

    /// Pending inbox for an area.
    #[instrument(skip(self))]
    pub async fn pending_for_area(
        &self,
        area: Area,
    ) -> Result<Vec<reposition_transfer::Model>, ServiceError> {
        let rows = RepositionTransferEntity::find()
            .filter(reposition_transfer::Column::ToArea.eq(area))
            .filter(reposition_transfer::Column::Status.eq(TransferStatus::Pending))
            .order_by_desc(reposition_transfer::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }
}
