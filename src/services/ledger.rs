//! Piece ledger helpers working directly with the `order_pieces` entity.
//!
//! Every function takes the caller's connection, which for mutations is
//! always an open transaction: the balance check and the row updates must
//! commit or roll back together with the transfer that triggered them.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};
use tracing::error;
use uuid::Uuid;

use crate::domain::Area;
use crate::entities::order_piece::{self, Entity as OrderPieceEntity};
use crate::errors::ServiceError;

/// Seeds the ledger with a single row holding the order's full count.
///
/// Not idempotent: calling it twice for the same order is a bug in the
/// caller and fails as an invariant violation.
pub async fn initialize<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    total_pieces: i32,
    seed_area: Area,
) -> Result<(), ServiceError> {
    let existing = OrderPieceEntity::find()
        .filter(order_piece::Column::OrderId.eq(order_id))
        .one(conn)
        .await?;

    if existing.is_some() {
        error!(%order_id, "Ledger already initialized for order");
        return Err(ServiceError::InvariantViolation(format!(
            "ledger already initialized for order {order_id}"
        )));
    }

    order_piece::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        area: Set(seed_area),
        pieces: Set(total_pieces),
        updated_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    Ok(())
}

/// Live piece count for (order, area); 0 when no row exists.
pub async fn balance<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    area: Area,
) -> Result<i32, ServiceError> {
    let row = OrderPieceEntity::find()
        .filter(order_piece::Column::OrderId.eq(order_id))
        .filter(order_piece::Column::Area.eq(area))
        .one(conn)
        .await?;

    Ok(row.map(|r| r.pieces).unwrap_or(0))
}

/// Moves `pieces` from one area row to another, atomically with respect to
/// the surrounding transaction.
///
/// The source balance is re-read here — not taken from the request — so
/// two conflicting acceptances cannot overdraw the area: the loser sees
/// the post-commit balance and fails. The source row is deleted when it
/// reaches zero; the destination row is created on demand. The ledger sum
/// is unchanged by construction.
pub async fn apply_transfer<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    from_area: Area,
    to_area: Area,
    pieces: i32,
) -> Result<(), ServiceError> {
    if pieces < 1 {
        return Err(ServiceError::ValidationError(
            "transfer must move at least one piece".into(),
        ));
    }

    let source = OrderPieceEntity::find()
        .filter(order_piece::Column::OrderId.eq(order_id))
        .filter(order_piece::Column::Area.eq(from_area))
        .one(conn)
        .await?;

    let source = match source {
        Some(row) => row,
        None => {
            return Err(ServiceError::InsufficientBalance {
                requested: pieces,
                available: 0,
            })
        }
    };

    if source.pieces < pieces {
        return Err(ServiceError::InsufficientBalance {
            requested: pieces,
            available: source.pieces,
        });
    }

    let remaining = source.pieces - pieces;
    if remaining == 0 {
        source.delete(conn).await?;
    } else {
        let mut source: order_piece::ActiveModel = source.into();
        source.pieces = Set(remaining);
        source.updated_at = Set(Utc::now());
        source.update(conn).await?;
    }

    let destination = OrderPieceEntity::find()
        .filter(order_piece::Column::OrderId.eq(order_id))
        .filter(order_piece::Column::Area.eq(to_area))
        .one(conn)
        .await?;

    match destination {
        Some(row) => {
            let total = row.pieces + pieces;
            let mut row: order_piece::ActiveModel = row.into();
            row.pieces = Set(total);
            row.updated_at = Set(Utc::now());
            row.update(conn).await?;
        }
        None => {
            order_piece::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                area: Set(to_area),
                pieces: Set(pieces),
                updated_at: Set(Utc::now()),
            }
            .insert(conn)
            .await?;
        }
    }

    Ok(())
}

/// The single area holding 100% of the order's pieces, or `None` while
/// the order is split across two or more areas.
pub async fn resident_area<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Option<Area>, ServiceError> {
    let rows = OrderPieceEntity::find()
        .filter(order_piece::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;

    match rows.as_slice() {
        [only] => Ok(Some(only.area)),
        _ => Ok(None),
    }
}

/// Full (area, pieces) breakdown for an order.
pub async fn distribution<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<order_piece::Model>, ServiceError> {
    let rows = OrderPieceEntity::find()
        .filter(order_piece::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;

    Ok(rows)
}

/// Sum of all ledger rows for an order. Conservation means this always
/// equals the order's `total_piezas`.
pub async fn total<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> Result<i32, ServiceError> {
    let rows = distribution(conn, order_id).await?;
    Ok(rows.iter().map(|r| r.pieces).sum())
}
