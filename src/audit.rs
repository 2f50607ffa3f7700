use actix_web::{web, HttpRequest};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::models::activity_log::NewActivityLog;
use crate::schema::activity_logs;

/// One audit record, built with the fields the caller knows about.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    action: String,
    user_id: Option<Uuid>,
    username: Option<String>,
    entity_type: Option<String>,
    entity_id: Option<String>,
    details: Option<Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl ActivityEvent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            user_id: None,
            username: None,
            entity_type: None,
            entity_id: None,
            details: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn by(mut self, user: &AuthenticatedUser) -> Self {
        self.user_id = Some(user.id);
        self.username = Some(user.username.clone());
        self
    }

    pub fn on(mut self, entity_type: &str, entity_id: impl ToString) -> Self {
        self.entity_type = Some(entity_type.to_string());
        self.entity_id = Some(entity_id.to_string());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn from_request(mut self, req: &HttpRequest) -> Self {
        self.ip_address = req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_string);
        self.user_agent = req
            .headers()
            .get(actix_web::http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self
    }
}

/// Fire-and-forget recording from a request handler: the insert runs on
/// the blocking pool after the response is already on its way, and a
/// failure is logged, never surfaced. An audit problem must not fail or
/// roll back the business operation it describes.
pub fn dispatch(pool: DbPool, event: ActivityEvent) {
    actix_web::rt::spawn(async move {
        if let Err(e) = web::block(move || record(&pool, event)).await {
            log::warn!("activity log dispatch failed: {e}");
        }
    });
}

/// Synchronous insert for callers already on a blocking thread (the
/// scheduled jobs). Errors are logged and swallowed.
pub fn record(pool: &DbPool, event: ActivityEvent) {
    let action = event.action.clone();
    let row = NewActivityLog {
        id: Uuid::new_v4(),
        user_id: event.user_id,
        username: event.username.or_else(|| Some("Anonymous".to_string())),
        action: event.action,
        entity_type: event.entity_type,
        entity_id: event.entity_id,
        details: event.details,
        ip_address: event.ip_address,
        user_agent: event.user_agent,
    };
    let result = pool
        .get()
        .map_err(DomainError::from)
        .and_then(|mut conn| {
            diesel::insert_into(activity_logs::table)
                .values(&row)
                .execute(&mut conn)
                .map_err(DomainError::from)
        });
    if let Err(e) = result {
        log::warn!("failed to record activity '{action}': {e}");
    }
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;
    use serde_json::json;
    use uuid::Uuid;

    use super::{record, ActivityEvent};
    use crate::auth::{AuthenticatedUser, UserRole};
    use crate::infrastructure::testing::setup_db;
    use crate::models::activity_log::ActivityLog;
    use crate::schema::activity_logs;

    #[tokio::test]
    async fn record_persists_the_event_with_actor_details() {
        let (_container, pool) = setup_db().await;
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            role: UserRole::Customer,
        };

        record(
            &pool,
            ActivityEvent::new("order_created")
                .by(&user)
                .on("order", Uuid::new_v4())
                .with_details(json!({"total_amount": "19.98"})),
        );

        let mut conn = pool.get().expect("Failed to get connection");
        let rows: Vec<ActivityLog> = activity_logs::table
            .select(ActivityLog::as_select())
            .load(&mut conn)
            .expect("query failed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action, "order_created");
        assert_eq!(rows[0].user_id, Some(user.id));
        assert_eq!(rows[0].username.as_deref(), Some("alice"));
        assert_eq!(rows[0].entity_type.as_deref(), Some("order"));
    }

    #[tokio::test]
    async fn record_without_actor_falls_back_to_anonymous() {
        let (_container, pool) = setup_db().await;

        record(&pool, ActivityEvent::new("low_stock_alert").on("system", ""));

        let mut conn = pool.get().expect("Failed to get connection");
        let row: ActivityLog = activity_logs::table
            .select(ActivityLog::as_select())
            .first(&mut conn)
            .expect("query failed");
        assert_eq!(row.username.as_deref(), Some("Anonymous"));
        assert!(row.user_id.is_none());
    }
}
