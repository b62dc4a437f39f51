use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::Area;
use crate::entities::notification::{self, Entity as NotificationEntity, NotificationType};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Directory of known users, queried only to fan notifications out by
/// area. Identity and authentication live outside this crate; this trait
/// is the one slice of that world the core needs.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn users_in_areas(&self, areas: &[Area]) -> Result<Vec<i32>, ServiceError>;
}

/// In-memory directory built from configuration. Enough for a single
/// plant; swap in a directory backed by the identity provider when one
/// exists.
#[derive(Debug, Default, Clone)]
pub struct StaticUserDirectory {
    entries: Vec<(i32, Area)>,
}

impl StaticUserDirectory {
    pub fn new(entries: Vec<(i32, Area)>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn users_in_areas(&self, areas: &[Area]) -> Result<Vec<i32>, ServiceError> {
        Ok(self
            .entries
            .iter()
            .filter(|(_, area)| areas.contains(area))
            .map(|(id, _)| *id)
            .collect())
    }
}

/// A notification about to be written, minus its recipient.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub r#type: NotificationType,
    pub title: String,
    pub message: String,
    pub transfer_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub reposition_id: Option<Uuid>,
}

impl NewNotification {
    pub fn new(
        r#type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            r#type,
            title: title.into(),
            message: message.into(),
            transfer_id: None,
            order_id: None,
            reposition_id: None,
        }
    }

    pub fn for_order(mut self, order_id: Uuid) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn for_transfer(mut self, transfer_id: Uuid) -> Self {
        self.transfer_id = Some(transfer_id);
        self
    }

    pub fn for_reposition(mut self, reposition_id: Uuid) -> Self {
        self.reposition_id = Some(reposition_id);
        self
    }
}

/// Writes per-user inbox rows and publishes the realtime ping.
///
/// The sink is best-effort by contract: `notify` and `notify_areas` are
/// always called after the owning transaction has committed, and their
/// failures are logged and swallowed — a broken inbox must never roll
/// back a state transition.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DbPool>,
    directory: Arc<dyn UserDirectory>,
    event_sender: Arc<EventSender>,
}

impl NotificationService {
    pub fn new(
        db: Arc<DbPool>,
        directory: Arc<dyn UserDirectory>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            directory,
            event_sender,
        }
    }

    /// Best-effort delivery to a single user.
    #[instrument(skip(self, notification), fields(user_id = user_id, kind = ?notification.r#type))]
    pub async fn notify(&self, user_id: i32, notification: NewNotification) {
        if let Err(e) = self.insert(user_id, &notification).await {
            warn!(error = %e, user_id, "Failed to deliver notification");
        }
    }

    /// Best-effort fan-out to every directory user in the given areas.
    #[instrument(skip(self, notification), fields(kind = ?notification.r#type))]
    pub async fn notify_areas(&self, areas: &[Area], notification: NewNotification) {
        let recipients = match self.directory.users_in_areas(areas).await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(error = %e, ?areas, "User directory lookup failed; dropping notification");
                return;
            }
        };

        for user_id in recipients {
            if let Err(e) = self.insert(user_id, &notification).await {
                warn!(error = %e, user_id, "Failed to deliver notification");
            }
        }
    }

    async fn insert(
        &self,
        user_id: i32,
        notification: &NewNotification,
    ) -> Result<(), ServiceError> {
        let id = Uuid::new_v4();
        notification::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            r#type: Set(notification.r#type),
            title: Set(notification.title.clone()),
            message: Set(notification.message.clone()),
            transfer_id: Set(notification.transfer_id),
            order_id: Set(notification.order_id),
            reposition_id: Set(notification.reposition_id),
            read: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        if let Err(e) = self
            .event_sender
            .send(Event::NotificationCreated {
                user_id,
                notification_id: id,
            })
            .await
        {
            warn!(error = %e, user_id, "Failed to publish notification event");
        }

        Ok(())
    }

    /// Inbox for one user, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        let rows = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, notification_id: Uuid) -> Result<(), ServiceError> {
        let row = NotificationEntity::find_by_id(notification_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Notification {notification_id} not found"))
            })?;

        if !row.read {
            let mut row: notification::ActiveModel = row.into();
            row.read = Set(true);
            row.update(&*self.db).await?;
        }

        Ok(())
    }
}
