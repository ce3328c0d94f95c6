use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, param::Query, payload::Json};

use crate::{
    domain::models::NotificationFilter,
    presentation::{
        http::{
            endpoints::root::{ApiState, EndpointsTags},
            errors::{domain_error, internal_error},
            mappers::{map_notification, map_pagination, map_stats},
            requests::MarkNotificationsReadDto,
            responses::{MarkReadResponseDto, NotificationListDto},
            security::JwtAuth,
        },
        models::{NotificationKind, NotificationStatusKind},
    },
};

#[derive(Clone)]
pub struct NotificationEndpoints {
    state: Arc<ApiState>,
}

impl NotificationEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl NotificationEndpoints {
    /// Notifications of the signed-in user, newest first.
    #[oai(path = "/notifications", method = "get", tag = EndpointsTags::Notifications)]
    pub async fn list(
        &self,
        auth: JwtAuth,
        #[oai(name = "type")] notification_type: Query<Option<NotificationKind>>,
        status: Query<Option<NotificationStatusKind>>,
        page: Query<Option<u32>>,
        limit: Query<Option<u32>>,
    ) -> PoemResult<Json<NotificationListDto>> {
        let user = auth.into_user(&self.state.jwt_config)?;
        let filter = NotificationFilter {
            notification_type: notification_type.0.map(Into::into),
            status: status.0.map(Into::into),
        };

        let response = self
            .state
            .list_notifications_usecase
            .execute(user.user_id, filter, page.0, limit.0)
            .await
            .map_err(internal_error)?;

        Ok(Json(NotificationListDto {
            notifications: response.notifications.iter().map(map_notification).collect(),
            stats: map_stats(&response.stats),
            pagination: map_pagination(&response.pagination),
        }))
    }

    #[oai(path = "/notifications/read", method = "post", tag = EndpointsTags::Notifications)]
    pub async fn mark_read(
        &self,
        auth: JwtAuth,
        body: Json<MarkNotificationsReadDto>,
    ) -> PoemResult<Json<MarkReadResponseDto>> {
        let user = auth.into_user(&self.state.jwt_config)?;
        let updated = self
            .state
            .mark_notifications_read_usecase
            .execute(user.user_id, &body.0.ids)
            .await
            .map_err(domain_error)?;
        Ok(Json(MarkReadResponseDto { updated }))
    }

    #[oai(path = "/notifications/read-all", method = "post", tag = EndpointsTags::Notifications)]
    pub async fn mark_all_read(&self, auth: JwtAuth) -> PoemResult<Json<MarkReadResponseDto>> {
        let user = auth.into_user(&self.state.jwt_config)?;
        let updated = self
            .state
            .mark_notifications_read_usecase
            .execute_all(user.user_id)
            .await
            .map_err(domain_error)?;
        Ok(Json(MarkReadResponseDto { updated }))
    }
}
