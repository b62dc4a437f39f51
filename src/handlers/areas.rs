use axum::{extract::Path, Json};

use crate::domain::{Actor, Area};
use crate::{ApiResponse, ApiResult};

/// Downstream fan-out for an area. Guidance for the transfer form only —
/// the server never enforces this set (validation is against the live
/// ledger and transfer state).
pub async fn legal_destinations(
    _actor: Actor,
    Path(area): Path<Area>,
) -> ApiResult<Vec<Area>> {
    Ok(Json(ApiResponse::success(
        area.legal_destinations().to_vec(),
    )))
}
