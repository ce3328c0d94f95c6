use crate::{
    application::usecases::list_notifications::Pagination,
    domain::{
        models::{Category, Notification},
        repositories::NotificationStats,
    },
    presentation::http::responses::{
        CategoryDto, NotificationDto, NotificationStatsDto, PaginationDto, PriorityCountDto,
        TypeCountDto,
    },
};

pub fn map_notification(notification: &Notification) -> NotificationDto {
    NotificationDto {
        id: notification.id,
        notification_type: notification.notification_type.into(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        priority: notification.priority.into(),
        status: notification.status.into(),
        metadata: notification.metadata.clone(),
        read_at: notification.read_at.map(|at| at.to_rfc3339()),
        created_at: notification.created_at.to_rfc3339(),
    }
}

pub fn map_stats(stats: &NotificationStats) -> NotificationStatsDto {
    NotificationStatsDto {
        total: stats.total,
        unread: stats.unread,
        by_type: stats
            .by_type
            .iter()
            .map(|(notification_type, count)| TypeCountDto {
                notification_type: (*notification_type).into(),
                count: *count,
            })
            .collect(),
        by_priority: stats
            .by_priority
            .iter()
            .map(|(priority, count)| PriorityCountDto {
                priority: (*priority).into(),
                count: *count,
            })
            .collect(),
    }
}

pub fn map_pagination(pagination: &Pagination) -> PaginationDto {
    PaginationDto {
        page: pagination.page,
        limit: pagination.limit,
        total: pagination.total,
        total_pages: pagination.total_pages,
        has_next: pagination.has_next,
        has_prev: pagination.has_prev,
    }
}

pub fn map_category(category: &Category) -> CategoryDto {
    CategoryDto {
        id: category.id,
        name: category.name.clone(),
        description: category.description.clone(),
        parent_id: category.parent_id,
    }
}
