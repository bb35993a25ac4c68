//! Notification inbox read side.

use api_types::notification::{NotificationList, NotificationListResponse, NotificationView};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, pets::map_severity, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<NotificationList>,
) -> Result<Json<NotificationListResponse>, ServerError> {
    let notifications = state
        .engine
        .notifications_for(
            &user.username,
            query.unread_only.unwrap_or(false),
            query.limit.unwrap_or(50),
        )
        .await?;

    Ok(Json(NotificationListResponse {
        notifications: notifications
            .into_iter()
            .map(|notification| NotificationView {
                id: notification.id,
                pet_id: notification.pet_id,
                severity: map_severity(notification.severity),
                message: notification.message,
                action_hint: notification.action_hint,
                created_at: notification.created_at.fixed_offset(),
                read: notification.read_at.is_some(),
            })
            .collect(),
    }))
}
