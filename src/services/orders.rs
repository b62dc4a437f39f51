use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::domain::{Actor, Area};
use crate::entities::notification::{self, NotificationType};
use crate::entities::order::{self, Entity as OrderEntity, OrderStatus};
use crate::entities::order_history::{self, Entity as OrderHistoryEntity, OrderAction};
use crate::entities::order_piece;
use crate::entities::transfer::{self, Entity as TransferEntity, TransferStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::ledger;
use crate::services::notifications::{NewNotification, NotificationService};

/// Area where every new order physically starts.
const INTAKE_AREA: Area = Area::Corte;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "El folio es obligatorio"))]
    pub folio: String,
    #[validate(length(min = 1, message = "El cliente/hotel es obligatorio"))]
    pub cliente_hotel: String,
    #[validate(length(min = 1, message = "El número de solicitud es obligatorio"))]
    pub no_solicitud: String,
    pub no_hoja: Option<String>,
    pub modelo: String,
    pub tipo_prenda: String,
    pub color: String,
    pub tela: String,
    #[validate(range(min = 1, message = "El pedido debe tener al menos una pieza"))]
    pub total_piezas: i32,
}

/// Ledger breakdown plus the derived residency for one order.
///
/// `resident_area` is `Some` exactly when one area holds 100% of the
/// pieces; while split, callers get `None` here instead of trusting the
/// order's denormalized `current_area` (which keeps its last consolidated
/// value).
#[derive(Debug, Serialize)]
pub struct OrderPiecesResponse {
    pub order_id: Uuid,
    pub distribution: Vec<order_piece::Model>,
    pub resident_area: Option<Area>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub active_orders: u64,
    pub my_area_orders: u64,
    pub pending_transfers: u64,
    pub completed_today: u64,
}

/// Order lifecycle: intake, completion by shipping, and admin hard delete
/// with full cascade.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    notifier: Arc<NotificationService>,
}

impl OrderService {
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

    /// Registers a new order and seeds its ledger: all pieces in the
    /// intake area, one history entry, one transaction.
    #[instrument(skip(self, request), fields(folio = %request.folio, actor_id = actor.id))]
    pub async fn create_order(
        &self,
        actor: Actor,
        request: CreateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        if !actor.can_manage_orders() {
            return Err(ServiceError::Forbidden(
                "Área no autorizada para registrar pedidos".into(),
            ));
        }
        request.validate()?;

        let duplicate = OrderEntity::find()
            .filter(order::Column::Folio.eq(request.folio.clone()))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Ya existe un pedido con folio {}",
                request.folio
            )));
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let txn = self.db.begin().await?;

        let model = order::ActiveModel {
            id: Set(order_id),
            folio: Set(request.folio.clone()),
            cliente_hotel: Set(request.cliente_hotel),
            no_solicitud: Set(request.no_solicitud),
            no_hoja: Set(request.no_hoja),
            modelo: Set(request.modelo),
            tipo_prenda: Set(request.tipo_prenda),
            color: Set(request.color),
            tela: Set(request.tela),
            total_piezas: Set(request.total_piezas),
            current_area: Set(INTAKE_AREA),
            status: Set(OrderStatus::Active),
            created_by: Set(actor.id),
            created_at: Set(now),
            completed_at: Set(None),
        }
        .insert(&txn)
        .await?;

        ledger::initialize(&txn, order_id, request.total_piezas, INTAKE_AREA).await?;

        self.append_history(
            &txn,
            order_id,
            OrderAction::Created,
            format!("Pedido creado con {} piezas", request.total_piezas),
            actor.id,
            None,
            None,
            None,
        )
        .await?;

        txn.commit().await?;

        info!(order_id = %order_id, folio = %model.folio, pieces = request.total_piezas, "Order created");

        if let Err(e) = self.event_sender.send(Event::OrderCreated(order_id)).await {
            warn!(error = %e, order_id = %order_id, "Failed to send order created event");
        }

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<order::Model>, ServiceError> {
        let order = OrderEntity::find_by_id(order_id).one(&*self.db).await?;
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get_order_by_folio(
        &self,
        folio: &str,
    ) -> Result<Option<order::Model>, ServiceError> {
        let order = OrderEntity::find()
            .filter(order::Column::Folio.eq(folio))
            .one(&*self.db)
            .await?;
        Ok(order)
    }

    /// Orders, optionally narrowed to those currently resident in an area.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, area: Option<Area>) -> Result<Vec<order::Model>, ServiceError> {
        let mut query = OrderEntity::find();
        if let Some(area) = area {
            query = query.filter(order::Column::CurrentArea.eq(area));
        }

        let rows = query
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }

    /// Live ledger breakdown plus derived residency.
    #[instrument(skip(self))]
    pub async fn order_pieces(&self, order_id: Uuid) -> Result<OrderPiecesResponse, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let distribution = ledger::distribution(&*self.db, order.id).await?;
        let resident_area = ledger::resident_area(&*self.db, order.id).await?;

        Ok(OrderPiecesResponse {
            order_id: order.id,
            distribution,
            resident_area,
        })
    }

    /// Audit trail, oldest first.
    #[instrument(skip(self))]
    pub async fn order_history(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_history::Model>, ServiceError> {
        let rows = OrderHistoryEntity::find()
            .filter(order_history::Column::OrderId.eq(order_id))
            .order_by_asc(order_history::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }

    /// Marks an active order completed. Shipping only; completing twice is
    /// an explicit error, not a silent no-op.
    #[instrument(skip(self), fields(order_id = %order_id, actor_id = actor.id))]
    pub async fn complete_order(
        &self,
        actor: Actor,
        order_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        if !actor.can_complete_orders() {
            return Err(ServiceError::Forbidden(
                "Solo el área de envíos puede completar el pedido".into(),
            ));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        match order.status {
            OrderStatus::Active => {}
            OrderStatus::Completed => {
                return Err(ServiceError::AlreadyProcessed(format!(
                    "Order {} is already completed",
                    order.folio
                )));
            }
        }

        let created_by = order.created_by;
        let folio = order.folio.clone();

        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Completed);
        active.completed_at = Set(Some(now));
        let model = active.update(&txn).await?;

        self.append_history(
            &txn,
            order_id,
            OrderAction::Completed,
            "Pedido finalizado".to_string(),
            actor.id,
            None,
            None,
            None,
        )
        .await?;

        txn.commit().await?;

        info!(order_id = %order_id, folio = %folio, "Order completed");

        if let Err(e) = self.event_sender.send(Event::OrderCompleted(order_id)).await {
            warn!(error = %e, order_id = %order_id, "Failed to send order completed event");
        }

        self.notifier
            .notify(
                created_by,
                NewNotification::new(
                    NotificationType::OrderCompleted,
                    "Pedido completado",
                    format!("El pedido {folio} fue finalizado por envíos"),
                )
                .for_order(order_id),
            )
            .await;

        Ok(model)
    }

    /// Hard-deletes an order and everything hanging off it: ledger rows,
    /// transfers, history and notifications, then the order itself.
    /// Irreversible by contract — repositions are the soft-delete side.
    #[instrument(skip(self), fields(order_id = %order_id, actor_id = actor.id))]
    pub async fn delete_order(&self, actor: Actor, order_id: Uuid) -> Result<(), ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::Forbidden(
                "Se requiere acceso de administrador".into(),
            ));
        }

        let txn = self.db.begin().await?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;
        let folio = order.folio.clone();

        order_piece::Entity::delete_many()
            .filter(order_piece::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        TransferEntity::delete_many()
            .filter(transfer::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        OrderHistoryEntity::delete_many()
            .filter(order_history::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        notification::Entity::delete_many()
            .filter(notification::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        OrderEntity::delete_by_id(order_id).exec(&txn).await?;

        txn.commit().await?;

        info!(order_id = %order_id, folio = %folio, "Order hard-deleted with cascade");

        if let Err(e) = self
            .event_sender
            .send(Event::OrderDeleted { order_id, folio })
            .await
        {
            warn!(error = %e, order_id = %order_id, "Failed to send order deleted event");
        }

        Ok(())
    }

    /// Counters for the landing dashboard.
    #[instrument(skip(self), fields(actor_id = actor.id))]
    pub async fn dashboard_stats(&self, actor: Actor) -> Result<DashboardStats, ServiceError> {
        let active_orders = OrderEntity::find()
            .filter(order::Column::Status.eq(OrderStatus::Active))
            .count(&*self.db)
            .await?;

        let my_area_orders = OrderEntity::find()
            .filter(order::Column::CurrentArea.eq(actor.area))
            .count(&*self.db)
            .await?;

        let pending_transfers = TransferEntity::find()
            .filter(transfer::Column::ToArea.eq(actor.area))
            .filter(transfer::Column::Status.eq(TransferStatus::Pending))
            .count(&*self.db)
            .await?;

        let today_start = Utc::now()
            .date_naive()
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        let completed_today = OrderEntity::find()
            .filter(order::Column::Status.eq(OrderStatus::Completed))
            .filter(order::Column::CompletedAt.gte(today_start))
            .count(&*self.db)
            .await?;

        Ok(DashboardStats {
            active_orders,
            my_area_orders,
            pending_transfers,
            completed_today,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn append_history(
        &self,
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
}
