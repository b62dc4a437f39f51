use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::domain::{folio, Actor, Area};
use crate::entities::notification::NotificationType;
use crate::entities::reposition::{
    self, Entity as RepositionEntity, RepositionStatus, RepositionType, Urgency,
};
use crate::entities::reposition_folio_counter::{self, Entity as FolioCounterEntity};
use crate::entities::reposition_history::{
    self, Entity as RepositionHistoryEntity, RepositionAction,
};
use crate::entities::reposition_piece::{self, Entity as RepositionPieceEntity};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::notifications::{NewNotification, NotificationService};

/// Minimum trimmed length of a deletion reason.
const MIN_DELETE_REASON_LEN: usize = 10;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RepositionPieceInput {
    #[validate(length(min = 1, message = "La talla es obligatoria"))]
    pub talla: String,
    #[validate(range(min = 1, message = "La cantidad debe ser al menos 1"))]
    pub cantidad: i32,
    pub folio_original: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateRepositionRequest {
    pub r#type: RepositionType,
    #[validate(length(min = 1, message = "El nombre del solicitante es obligatorio"))]
    pub solicitante_nombre: String,
    #[validate(length(min = 1, message = "El número de solicitud es obligatorio"))]
    pub no_solicitud: String,
    pub no_hoja: Option<String>,
    #[validate(length(min = 1, message = "El causante del daño es obligatorio"))]
    pub causante_dano: String,
    #[validate(length(min = 1, message = "La descripción del suceso es obligatoria"))]
    pub descripcion_suceso: String,
    pub modelo_prenda: String,
    pub tela: String,
    pub color: String,
    pub tipo_pieza: String,
    pub urgencia: Urgency,
    pub observaciones: Option<String>,
    #[validate]
    pub pieces: Vec<RepositionPieceInput>,
}

/// Outcome of an approval review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Aprobado,
    Rechazado,
}

/// Reposition ticket lifecycle: creation with a month-scoped folio,
/// review, the completion sub-flow, and soft deletion. Transfers between
/// areas live in `reposition_transfers`.
#[derive(Clone)]
pub struct RepositionService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    notifier: Arc<NotificationService>,
}

impl RepositionService {
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

    /// Creates a pendiente ticket in the requester's area.
    ///
    /// The folio sequence comes from the per-month counter row, bumped
    /// inside this same transaction; the unique index on `folio` is the
    /// backstop if two creations ever race on the same prefix.
    #[instrument(skip(self, request), fields(actor_id = actor.id, area = %actor.area))]
    pub async fn create_reposition(
        &self,
        actor: Actor,
        request: CreateRepositionRequest,
    ) -> Result<reposition::Model, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let reposition_id = Uuid::new_v4();
        let txn = self.db.begin().await?;

        let seq = self.next_folio_seq(&txn, now).await?;
        let folio = folio::reposition_folio(now, seq);

        let model = reposition::ActiveModel {
            id: Set(reposition_id),
            folio: Set(folio.clone()),
            r#type: Set(request.r#type),
            solicitante_nombre: Set(request.solicitante_nombre),
            solicitante_area: Set(actor.area),
            no_solicitud: Set(request.no_solicitud),
            no_hoja: Set(request.no_hoja),
            causante_dano: Set(request.causante_dano),
            descripcion_suceso: Set(request.descripcion_suceso),
            modelo_prenda: Set(request.modelo_prenda),
            tela: Set(request.tela),
            color: Set(request.color),
            tipo_pieza: Set(request.tipo_pieza),
            urgencia: Set(request.urgencia),
            observaciones: Set(request.observaciones),
            current_area: Set(actor.area),
            status: Set(RepositionStatus::Pendiente),
            created_by: Set(actor.id),
            approved_by: Set(None),
            created_at: Set(now),
            approved_at: Set(None),
            completed_at: Set(None),
            deleted_at: Set(None),
            deletion_reason: Set(None),
        }
        .insert(&txn)
        .await?;

        for piece in &request.pieces {
            reposition_piece::ActiveModel {
                id: Set(Uuid::new_v4()),
                reposition_id: Set(reposition_id),
                talla: Set(piece.talla.clone()),
                cantidad: Set(piece.cantidad),
                folio_original: Set(piece.folio_original.clone()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        append_history(
            &txn,
            reposition_id,
            RepositionAction::Created,
            format!("Solicitud {folio} creada en {}", actor.area),
            actor.id,
            None,
            None,
        )
        .await?;

        txn.commit().await?;

        info!(reposition_id = %reposition_id, folio = %folio, "Reposition created");

        if let Err(e) = self
            .event_sender
            .send(Event::RepositionCreated(reposition_id))
            .await
        {
            warn!(error = %e, reposition_id = %reposition_id, "Failed to send reposition created event");
        }

        self.notifier
            .notify_areas(
                &[Area::Admin, Area::Operaciones],
                NewNotification::new(
                    NotificationType::RepositionCreated,
                    "Nueva solicitud de reposición",
                    format!("La solicitud {folio} espera aprobación"),
                )
                .for_reposition(reposition_id),
            )
            .await;

        Ok(model)
    }

    /// Reviews a pendiente ticket: aprobado opens the transfer loop,
    /// rechazado parks it permanently.
    #[instrument(skip(self, notes), fields(reposition_id = %reposition_id, actor_id = actor.id, decision = ?decision))]
    pub async fn review(
        &self,
        actor: Actor,
        reposition_id: Uuid,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<reposition::Model, ServiceError> {
        if !actor.can_review_repositions() {
            return Err(ServiceError::Forbidden(
                "Solo Operaciones, Administración o Envíos pueden aprobar o rechazar".into(),
            ));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;
        let current = load_reposition(&txn, reposition_id).await?;

        match current.status {
            RepositionStatus::Pendiente => {}
            RepositionStatus::Aprobado
            | RepositionStatus::Rechazado
            | RepositionStatus::EnProceso
            | RepositionStatus::Completado
            | RepositionStatus::Eliminado => {
                return Err(ServiceError::AlreadyProcessed(format!(
                    "La solicitud {} ya fue procesada",
                    current.folio
                )));
            }
        }

        let folio = current.folio.clone();
        let created_by = current.created_by;
        let (status, action, event) = match decision {
            ReviewDecision::Aprobado => (
                RepositionStatus::Aprobado,
                RepositionAction::Approved,
                Event::RepositionApproved(reposition_id),
            ),
            ReviewDecision::Rechazado => (
                RepositionStatus::Rechazado,
                RepositionAction::Rejected,
                Event::RepositionRejected(reposition_id),
            ),
        };

        let mut active: reposition::ActiveModel = current.into();
        active.status = Set(status);
        active.approved_by = Set(Some(actor.id));
        active.approved_at = Set(Some(now));
        let model = active.update(&txn).await?;

        let description = match &notes {
            Some(notes) => format!("Solicitud {folio} revisada: {notes}"),
            None => format!("Solicitud {folio} revisada"),
        };
        append_history(&txn, reposition_id, action, description, actor.id, None, None).await?;

        txn.commit().await?;

        info!(reposition_id = %reposition_id, folio = %folio, ?decision, "Reposition reviewed");

        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, reposition_id = %reposition_id, "Failed to send reposition review event");
        }

        let verdict = match decision {
            ReviewDecision::Aprobado => "aprobada",
            ReviewDecision::Rechazado => "rechazada",
        };
        self.notifier
            .notify(
                created_by,
                NewNotification::new(
                    NotificationType::RepositionReviewed,
                    "Solicitud revisada",
                    format!("Tu solicitud {folio} fue {verdict}"),
                )
                .for_reposition(reposition_id),
            )
            .await;

        Ok(model)
    }

    /// Completion-approval sub-flow for non-privileged areas: leaves the
    /// status untouched, records the request and pings the areas that can
    /// actually complete.
    #[instrument(skip(self, notes), fields(reposition_id = %reposition_id, actor_id = actor.id))]
    pub async fn request_completion(
        &self,
        actor: Actor,
        reposition_id: Uuid,
        notes: Option<String>,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let current = load_reposition(&txn, reposition_id).await?;

        match current.status {
            RepositionStatus::Aprobado => {}
            RepositionStatus::Completado | RepositionStatus::Eliminado => {
                return Err(ServiceError::AlreadyProcessed(format!(
                    "La solicitud {} ya fue finalizada",
                    current.folio
                )));
            }
            RepositionStatus::Pendiente
            | RepositionStatus::Rechazado
            | RepositionStatus::EnProceso => {
                return Err(ServiceError::ValidationError(format!(
                    "Solo solicitudes aprobadas pueden pedir finalización (estado actual de {}: {:?})",
                    current.folio, current.status
                )));
            }
        }

        let folio = current.folio.clone();
        let description = match &notes {
            Some(notes) => format!("Finalización solicitada para {folio}: {notes}"),
            None => format!("Finalización solicitada para {folio}"),
        };
        append_history(
            &txn,
            reposition_id,
            RepositionAction::CompletionRequested,
            description,
            actor.id,
            None,
            None,
        )
        .await?;

        txn.commit().await?;

        info!(reposition_id = %reposition_id, folio = %folio, "Completion requested");

        if let Err(e) = self
            .event_sender
            .send(Event::RepositionCompletionRequested(reposition_id))
            .await
        {
            warn!(error = %e, reposition_id = %reposition_id, "Failed to send completion requested event");
        }

        // Fan out by capability, not by a person's name.
        self.notifier
            .notify_areas(
                &[Area::Admin, Area::Operaciones],
                NewNotification::new(
                    NotificationType::CompletionRequested,
                    "Finalización solicitada",
                    format!("{} pide dar por terminada la solicitud {folio}", actor.area),
                )
                .for_reposition(reposition_id),
            )
            .await;

        Ok(())
    }

    /// Marks an approved ticket completado. Privileged areas only.
    #[instrument(skip(self, notes), fields(reposition_id = %reposition_id, actor_id = actor.id))]
    pub async fn complete(
        &self,
        actor: Actor,
        reposition_id: Uuid,
        notes: Option<String>,
    ) -> Result<reposition::Model, ServiceError> {
        if !actor.can_finalize_repositions() {
            return Err(ServiceError::Forbidden(
                "Solo Administración o Envíos pueden finalizar la solicitud".into(),
            ));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;
        let current = load_reposition(&txn, reposition_id).await?;

        match current.status {
            RepositionStatus::Aprobado => {}
            RepositionStatus::Completado | RepositionStatus::Eliminado => {
                return Err(ServiceError::AlreadyProcessed(format!(
                    "La solicitud {} ya fue finalizada",
                    current.folio
                )));
            }
            RepositionStatus::Pendiente
            | RepositionStatus::Rechazado
            | RepositionStatus::EnProceso => {
                return Err(ServiceError::ValidationError(format!(
                    "Solo solicitudes aprobadas pueden completarse (estado actual de {}: {:?})",
                    current.folio, current.status
                )));
            }
        }

        let folio = current.folio.clone();
        let created_by = current.created_by;

        let mut active: reposition::ActiveModel = current.into();
        active.status = Set(RepositionStatus::Completado);
        active.completed_at = Set(Some(now));
        active.approved_by = Set(Some(actor.id));
        let model = active.update(&txn).await?;

        let description = match &notes {
            Some(notes) => format!("Solicitud {folio} completada: {notes}"),
            None => format!("Solicitud {folio} completada"),
        };
        append_history(
            &txn,
            reposition_id,
            RepositionAction::Completed,
            description,
            actor.id,
            None,
            None,
        )
        .await?;

        txn.commit().await?;

        info!(reposition_id = %reposition_id, folio = %folio, "Reposition completed");

        if let Err(e) = self
            .event_sender
            .send(Event::RepositionCompleted(reposition_id))
            .await
        {
            warn!(error = %e, reposition_id = %reposition_id, "Failed to send reposition completed event");
        }

        self.notifier
            .notify(
                created_by,
                NewNotification::new(
                    NotificationType::RepositionCompleted,
                    "Solicitud completada",
                    format!("Tu solicitud {folio} fue dada por terminada"),
                )
                .for_reposition(reposition_id),
            )
            .await;

        Ok(model)
    }

    /// Soft-deletes a ticket: eliminado is absorbing and irreversible, so
    /// a real reason is mandatory. The audit trail stays behind.
    #[instrument(skip(self, reason), fields(reposition_id = %reposition_id, actor_id = actor.id))]
    pub async fn delete(
        &self,
        actor: Actor,
        reposition_id: Uuid,
        reason: &str,
    ) -> Result<reposition::Model, ServiceError> {
        if !actor.can_finalize_repositions() {
            return Err(ServiceError::Forbidden(
                "Solo Administración o Envíos pueden eliminar solicitudes".into(),
            ));
        }

        let reason = reason.trim();
        if reason.len() < MIN_DELETE_REASON_LEN {
            return Err(ServiceError::ValidationError(format!(
                "El motivo de eliminación debe tener al menos {MIN_DELETE_REASON_LEN} caracteres"
            )));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;
        let current = load_reposition(&txn, reposition_id).await?;

        if current.status.is_terminal() {
            return Err(ServiceError::AlreadyProcessed(format!(
                "La solicitud {} ya fue finalizada",
                current.folio
            )));
        }

        let folio = current.folio.clone();
        let created_by = current.created_by;

        let mut active: reposition::ActiveModel = current.into();
        active.status = Set(RepositionStatus::Eliminado);
        active.deleted_at = Set(Some(now));
        active.deletion_reason = Set(Some(reason.to_string()));
        let model = active.update(&txn).await?;

        append_history(
            &txn,
            reposition_id,
            RepositionAction::Deleted,
            format!("Solicitud {folio} eliminada: {reason}"),
            actor.id,
            None,
            None,
        )
        .await?;

        txn.commit().await?;

        info!(reposition_id = %reposition_id, folio = %folio, "Reposition soft-deleted");

        if let Err(e) = self
            .event_sender
            .send(Event::RepositionDeleted(reposition_id))
            .await
        {
            warn!(error = %e, reposition_id = %reposition_id, "Failed to send reposition deleted event");
        }

        if created_by != actor.id {
            self.notifier
                .notify(
                    created_by,
                    NewNotification::new(
                        NotificationType::RepositionDeleted,
                        "Solicitud eliminada",
                        format!("Tu solicitud {folio} fue eliminada: {reason}"),
                    )
                    .for_reposition(reposition_id),
                )
                .await;
        }

        Ok(model)
    }

    /// Lists tickets, newest first. Finished tickets (completado and
    /// eliminado) appear only for admin/envios callers who ask for the
    /// full history.
    #[instrument(skip(self), fields(actor_id = actor.id))]
    pub async fn list(
        &self,
        actor: Actor,
        area: Option<Area>,
        include_finished: bool,
    ) -> Result<Vec<reposition::Model>, ServiceError> {
        let mut query = RepositionEntity::find();

        if let Some(area) = area {
            if !actor.is_admin() {
                query = query.filter(reposition::Column::CurrentArea.eq(area));
            }
        }

        let show_finished = include_finished && actor.can_finalize_repositions();
        if !show_finished {
            query = query.filter(
                Condition::all()
                    .add(reposition::Column::Status.ne(RepositionStatus::Eliminado))
                    .add(reposition::Column::Status.ne(RepositionStatus::Completado)),
            );
        }

        let rows = query
            .order_by_desc(reposition::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, reposition_id: Uuid) -> Result<Option<reposition::Model>, ServiceError> {
        let row = RepositionEntity::find_by_id(reposition_id)
            .one(&*self.db)
            .await?;
        Ok(row)
    }

    /// Size/quantity lines attached to a ticket.
    #[instrument(skip(self))]
    pub async fn pieces(
        &self,
        reposition_id: Uuid,
    ) -> Result<Vec<reposition_piece::Model>, ServiceError> {
        let rows = RepositionPieceEntity::find()
            .filter(reposition_piece::Column::RepositionId.eq(reposition_id))
            .all(&*self.db)
            .await?;
        Ok(rows)
    }

    /// Audit trail, oldest first.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        reposition_id: Uuid,
    ) -> Result<Vec<reposition_history::Model>, ServiceError> {
        let rows = RepositionHistoryEntity::find()
            .filter(reposition_history::Column::RepositionId.eq(reposition_id))
            .order_by_asc(reposition_history::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }

    /// Bumps and returns the sequence for this month's folio prefix.
    async fn next_folio_seq(
        &self,
        txn: &DatabaseTransaction,
        now: chrono::DateTime<Utc>,
    ) -> Result<i32, ServiceError> {
        let prefix = folio::reposition_folio_prefix(now);

        let row = FolioCounterEntity::find_by_id(prefix.clone())
            .one(txn)
            .await?;

        match row {
            Some(row) => {
                let next = row.counter + 1;
                let mut active: reposition_folio_counter::ActiveModel = row.into();
                active.counter = Set(next);
                active.update(txn).await?;
                Ok(next)
            }
            None => {
                reposition_folio_counter::ActiveModel {
                    prefix: Set(prefix),
                    counter: Set(1),
                }
                .insert(txn)
                .await?;
                Ok(1)
            }
        }
    }
}

async fn load_reposition(
    txn: &DatabaseTransaction,
    reposition_id: Uuid,
) -> Result<reposition::Model, ServiceError> {
    RepositionEntity::find_by_id(reposition_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Reposition {reposition_id} not found")))
}

pub(crate) async fn append_history(
    txn: &DatabaseTransaction,
    reposition_id: Uuid,
    action: RepositionAction,
    description: String,
    user_id: i32,
    from_area: Option<Area>,
    to_area: Option<Area>,
) -> Result<(), ServiceError> {
    reposition_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        reposition_id: Set(reposition_id),
        action: Set(action),
        description: Set(description),
        from_area: Set(from_area),
        to_area: Set(to_area),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await?;

    Ok(())
}
