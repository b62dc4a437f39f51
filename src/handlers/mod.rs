use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::db::DbPool;
use crate::domain::{Actor, Area};
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::notifications::{NotificationService, UserDirectory};
use crate::services::orders::OrderService;
use crate::services::reposition_transfers::RepositionTransferService;
use crate::services::repositions::RepositionService;
use crate::services::tracking::TrackingService;
use crate::services::transfers::TransferService;

pub mod areas;
pub mod notifications;
pub mod orders;
pub mod repositions;
pub mod transfers;

/// Aggregated service container used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub transfers: Arc<TransferService>,
    pub repositions: Arc<RepositionService>,
    pub reposition_transfers: Arc<RepositionTransferService>,
    pub tracking: Arc<TrackingService>,
    pub notifications: Arc<NotificationService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        let notifications = Arc::new(NotificationService::new(
            db.clone(),
            directory,
            event_sender.clone(),
        ));

        Self {
            orders: Arc::new(OrderService::new(
                db.clone(),
                event_sender.clone(),
                notifications.clone(),
            )),
            transfers: Arc::new(TransferService::new(
                db.clone(),
                event_sender.clone(),
                notifications.clone(),
            )),
            repositions: Arc::new(RepositionService::new(
                db.clone(),
                event_sender.clone(),
                notifications.clone(),
            )),
            reposition_transfers: Arc::new(RepositionTransferService::new(
                db.clone(),
                event_sender.clone(),
                notifications.clone(),
            )),
            tracking: Arc::new(TrackingService::new(db)),
            notifications,
        }
    }
}

/// Extracts the authenticated actor from the identity headers set by the
/// upstream gateway (`x-user-id`, `x-user-area`). Authentication itself
/// is out of this crate's hands; the claim is trusted as-is.
#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i32>().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Autenticación requerida".into()))?;

        let area = parts
            .headers
            .get("x-user-area")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<Area>().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Autenticación requerida".into()))?;

        Ok(Actor::new(id, area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<Actor, ServiceError> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn actor_extraction_reads_identity_headers() {
        let actor = extract(&[("x-user-id", "42"), ("x-user-area", "bordado")])
            .await
            .unwrap();
        assert_eq!(actor.id, 42);
        assert_eq!(actor.area, Area::Bordado);
    }

    #[tokio::test]
    async fn missing_or_malformed_headers_are_unauthorized() {
        assert!(extract(&[]).await.is_err());
        assert!(extract(&[("x-user-id", "42")]).await.is_err());
        assert!(extract(&[("x-user-id", "42"), ("x-user-area", "warehouse")])
            .await
            .is_err());
    }
}
