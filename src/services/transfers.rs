use chrono::Utc;
use dashmap::DashMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::domain::{Actor, Area};
use crate::entities::notification::NotificationType;
use crate::entities::order::{self, Entity as OrderEntity};
use crate::entities::order_history::{self, OrderAction};
use crate::entities::transfer::{self, Entity as TransferEntity, TransferStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::ledger;
use crate::services::notifications::{NewNotification, NotificationService};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestTransferRequest {
    pub order_id: Uuid,
    pub to_area: Area,
    #[validate(range(min = 1, message = "Debe transferir al menos una pieza"))]
    pub pieces: i32,
    pub notes: Option<String>,
}

/// State machine for order piece transfers: pending -> accepted/rejected,
/// resolved exactly once, with the ledger mutation and the audit entry in
/// the same transaction as the status flip.
#[derive(Clone)]
pub struct TransferService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    notifier: Arc<NotificationService>,
    /// Per-order locks serializing acceptance. Two accepts draining the
    /// same source area must observe each other's commit; the in-transaction
    /// balance re-read is the backstop when they run on separate replicas.
    order_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl TransferService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        notifier: Arc<NotificationService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            notifier,
            order_locks: Arc::new(DashMap::new()),
        }
    }

    fn lock_for(&self, order_id: Uuid) -> Arc<Mutex<()>> {
        self.order_locks.entry(order_id).or_default().clone()
    }

    /// Creates a pending transfer from the requester's own area.
    ///
    /// The availability check runs against the live ledger, never a cached
    /// balance; acceptance re-checks it anyway, so an overdraft can slip
    /// through here at worst as a pending request that will fail to accept.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, to_area = %request.to_area, pieces = request.pieces))]
    pub async fn request_transfer(
        &self,
        actor: Actor,
        request: RequestTransferRequest,
    ) -> Result<transfer::Model, ServiceError> {
        request.validate()?;

        let from_area = actor.area;
        let order = OrderEntity::find_by_id(request.order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", request.order_id))
            })?;

        let available = ledger::balance(&*self.db, order.id, from_area).await?;
        if available < request.pieces {
            return Err(ServiceError::InsufficientBalance {
                requested: request.pieces,
                available,
            });
        }

        let now = Utc::now();
        let transfer_id = Uuid::new_v4();
        let txn = self.db.begin().await?;

        let model = transfer::ActiveModel {
            id: Set(transfer_id),
            order_id: Set(order.id),
            from_area: Set(from_area),
            to_area: Set(request.to_area),
            pieces: Set(request.pieces),
            status: Set(TransferStatus::Pending),
            notes: Set(request.notes.clone()),
            created_by: Set(actor.id),
            processed_by: Set(None),
            created_at: Set(now),
            processed_at: Set(None),
        }
        .insert(&txn)
        .await?;

        append_history(
            &txn,
            order.id,
            OrderAction::TransferCreated,
            format!("{} piezas enviadas a {}", request.pieces, request.to_area),
            actor.id,
            Some(from_area),
            Some(request.to_area),
            Some(request.pieces),
        )
        .await?;

        txn.commit().await?;

        info!(transfer_id = %transfer_id, folio = %order.folio, "Transfer requested");

        if let Err(e) = self
            .event_sender
            .send(Event::TransferRequested {
                order_id: order.id,
                transfer_id,
                from_area,
                to_area: request.to_area,
                pieces: request.pieces,
            })
            .await
        {
            warn!(error = %e, transfer_id = %transfer_id, "Failed to send transfer requested event");
        }

        self.notifier
            .notify_areas(
                &[request.to_area],
                NewNotification::new(
                    NotificationType::TransferRequest,
                    "Transferencia pendiente",
                    format!(
                        "{} piezas del pedido {} esperan aceptación en {}",
                        request.pieces, order.folio, request.to_area
                    ),
                )
                .for_order(order.id)
                .for_transfer(transfer_id),
            )
            .await;

        Ok(model)
    }

    /// Accepts a pending transfer: flips the status, applies the ledger
    /// movement and consolidates the order's `current_area` when the
    /// destination now holds every piece — all in one transaction.
    #[instrument(skip(self), fields(transfer_id = %transfer_id, actor_id = actor.id))]
    pub async fn accept(
        &self,
        actor: Actor,
        transfer_id: Uuid,
    ) -> Result<transfer::Model, ServiceError> {
        let pending = self.load_for_processing(actor, transfer_id).await?;

        let lock = self.lock_for(pending.order_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        // Re-read under the lock: the first conflicting accept may have
        // resolved this transfer or drained the source area meanwhile.
        let current = TransferEntity::find_by_id(transfer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {transfer_id} not found")))?;

        match current.status {
            TransferStatus::Pending => {}
            TransferStatus::Accepted | TransferStatus::Rejected => {
                return Err(ServiceError::AlreadyProcessed(format!(
                    "Transfer {transfer_id} was already resolved"
                )));
            }
        }

        let order = OrderEntity::find_by_id(current.order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", current.order_id))
            })?;

        ledger::apply_transfer(
            &txn,
            current.order_id,
            current.from_area,
            current.to_area,
            current.pieces,
        )
        .await?;

        // Conservation check before anything commits.
        let ledger_sum = ledger::total(&txn, current.order_id).await?;
        if ledger_sum != order.total_piezas {
            error!(
                order_id = %current.order_id,
                ledger_sum,
                total_piezas = order.total_piezas,
                "Ledger sum diverged from order total"
            );
            return Err(ServiceError::InvariantViolation(format!(
                "ledger sum {ledger_sum} diverged from order total {}",
                order.total_piezas
            )));
        }

        let consolidated = ledger::resident_area(&txn, current.order_id).await?;
        if let Some(area) = consolidated {
            if area == current.to_area {
                let mut order: order::ActiveModel = order.into();
                order.current_area = Set(area);
                order.update(&txn).await?;
            } else {
                // A single-row ledger after a transfer into to_area can only
                // be the destination row; anything else is corruption.
                error!(order_id = %current.order_id, ?area, "Resident area disagrees with accepted destination");
                return Err(ServiceError::InvariantViolation(format!(
                    "resident area {area} does not match accepted destination {}",
                    current.to_area
                )));
            }
        }

        append_history(
            &txn,
            current.order_id,
            OrderAction::TransferAccepted,
            format!(
                "Transferencia aceptada - {} piezas movidas de {} a {}",
                current.pieces, current.from_area, current.to_area
            ),
            actor.id,
            Some(current.from_area),
            Some(current.to_area),
            Some(current.pieces),
        )
        .await?;

        let mut resolved: transfer::ActiveModel = current.clone().into();
        resolved.status = Set(TransferStatus::Accepted);
        resolved.processed_by = Set(Some(actor.id));
        resolved.processed_at = Set(Some(now));
        let resolved = resolved.update(&txn).await?;

        txn.commit().await?;

        info!(
            transfer_id = %transfer_id,
            order_id = %current.order_id,
            consolidated = ?consolidated,
            "Transfer accepted"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::TransferAccepted {
                order_id: current.order_id,
                transfer_id,
                to_area: current.to_area,
                consolidated_area: consolidated,
            })
            .await
        {
            warn!(error = %e, transfer_id = %transfer_id, "Failed to send transfer accepted event");
        }

        self.notifier
            .notify(
                current.created_by,
                NewNotification::new(
                    NotificationType::TransferAccepted,
                    "Transferencia aceptada",
                    format!(
                        "{} piezas fueron recibidas en {}",
                        current.pieces, current.to_area
                    ),
                )
                .for_order(current.order_id)
                .for_transfer(transfer_id),
            )
            .await;

        Ok(resolved)
    }

    /// Rejects a pending transfer. No ledger movement: the pieces stay in
    /// the source area; only the resolution and the audit entry are
    /// recorded.
    #[instrument(skip(self), fields(transfer_id = %transfer_id, actor_id = actor.id))]
    pub async fn reject(
        &self,
        actor: Actor,
        transfer_id: Uuid,
    ) -> Result<transfer::Model, ServiceError> {
        let pending = self.load_for_processing(actor, transfer_id).await?;

        let lock = self.lock_for(pending.order_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let current = TransferEntity::find_by_id(transfer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {transfer_id} not found")))?;

        match current.status {
            TransferStatus::Pending => {}
            TransferStatus::Accepted | TransferStatus::Rejected => {
                return Err(ServiceError::AlreadyProcessed(format!(
                    "Transfer {transfer_id} was already resolved"
                )));
            }
        }

        append_history(
            &txn,
            current.order_id,
            OrderAction::TransferRejected,
            format!(
                "Transferencia rechazada - {} piezas devueltas a {}",
                current.pieces, current.from_area
            ),
            actor.id,
            Some(current.from_area),
            Some(current.to_area),
            Some(current.pieces),
        )
        .await?;

        let mut resolved: transfer::ActiveModel = current.clone().into();
        resolved.status = Set(TransferStatus::Rejected);
        resolved.processed_by = Set(Some(actor.id));
        resolved.processed_at = Set(Some(now));
        let resolved = resolved.update(&txn).await?;

        txn.commit().await?;

        info!(transfer_id = %transfer_id, order_id = %current.order_id, "Transfer rejected");

        if let Err(e) = self
            .event_sender
            .send(Event::TransferRejected {
                order_id: current.order_id,
                transfer_id,
            })
            .await
        {
            warn!(error = %e, transfer_id = %transfer_id, "Failed to send transfer rejected event");
        }

        self.notifier
            .notify(
                current.created_by,
                NewNotification::new(
                    NotificationType::TransferRejected,
                    "Transferencia rechazada",
                    format!(
                        "{} rechazó {} piezas; permanecen en {}",
                        current.to_area, current.pieces, current.from_area
                    ),
                )
                .for_order(current.order_id)
                .for_transfer(transfer_id),
            )
            .await;

        Ok(resolved)
    }

    /// Pending inbox for an area: transfers waiting on someone there.
    #[instrument(skip(self))]
    pub async fn pending_for_area(&self, area: Area) -> Result<Vec<transfer::Model>, ServiceError> {
        let rows = TransferEntity::find()
            .filter(transfer::Column::ToArea.eq(area))
            .filter(transfer::Column::Status.eq(TransferStatus::Pending))
            .order_by_desc(transfer::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }

    /// All transfers touching an area, incoming or outgoing.
    #[instrument(skip(self))]
    pub async fn list_for_area(&self, area: Area) -> Result<Vec<transfer::Model>, ServiceError> {
        let rows = TransferEntity::find()
            .filter(
                Condition::any()
                    .add(transfer::Column::FromArea.eq(area))
                    .add(transfer::Column::ToArea.eq(area)),
            )
            .order_by_desc(transfer::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }

    /// Shared precondition for accept/reject: the transfer exists and the
    /// actor belongs to its destination area.
    async fn load_for_processing(
        &self,
        actor: Actor,
        transfer_id: Uuid,
    ) -> Result<transfer::Model, ServiceError> {
        let transfer = TransferEntity::find_by_id(transfer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {transfer_id} not found")))?;

        if !actor.can_process_transfer_to(transfer.to_area) {
            return Err(ServiceError::Forbidden(format!(
                "Only {} can resolve this transfer",
                transfer.to_area
            )));
        }

        Ok(transfer)
    }
}

#[allow(clippy::too_many_arguments)]
async fn append_history(
    txn: &sea_orm::DatabaseTransaction,
    order_id: Uuid,
    action: OrderAction,
    description: String,
    user_id: i32,
    from_area: Option<Area>,
    to_area: Option<Area>,
    pieces: Option<i32>,
) -> Result<(), ServiceError> {
    order_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        action: Set(action),
        description: Set(description),
        from_area: Set(from_area),
        to_area: Set(to_area),
        pieces: Set(pieces),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await?;

    Ok(())
}
