use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::activity_log::ActivityLog;
use crate::schema::activity_logs;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActivityLogListParams {
    pub user_id: Option<Uuid>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    #[serde(default = "super::default_page")]
    pub page: i64,
    #[serde(default = "super::default_page_size")]
    pub page_size: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityLogResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: String,
}

impl From<ActivityLog> for ActivityLogResponse {
    fn from(log: ActivityLog) -> Self {
        ActivityLogResponse {
            id: log.id,
            user_id: log.user_id,
            username: log.username,
            action: log.action,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            details: log.details,
            ip_address: log.ip_address,
            user_agent: log.user_agent,
            timestamp: log.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityLogListResponse {
    pub count: i64,
    pub num_pages: i64,
    pub current_page: i64,
    pub results: Vec<ActivityLogResponse>,
}

/// GET /activity-logs
///
/// Administrative audit trail, newest first, with substring filters on
/// action, entity type, and entity id.
#[utoipa::path(
    get,
    path = "/activity-logs",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Filter by acting user"),
        ("action" = Option<String>, Query, description = "Substring match on action"),
        ("entity_type" = Option<String>, Query, description = "Substring match on entity type"),
        ("entity_id" = Option<String>, Query, description = "Substring match on entity id"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("page_size" = Option<i64>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated audit records", body = ActivityLogListResponse),
        (status = 403, description = "Caller is not an administrator"),
    ),
    tag = "activity-logs"
)]
pub async fn list_activity_logs(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    query: web::Query<ActivityLogListParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, page_size, offset) = super::clamp_page(params.page, params.page_size);

    let (count, rows) = web::block(move || -> Result<(i64, Vec<ActivityLog>), AppError> {
        let mut conn = pool.get()?;
        let filtered = || {
            let mut q = activity_logs::table.into_boxed();
            if let Some(user_id) = params.user_id {
                q = q.filter(activity_logs::user_id.eq(user_id));
            }
            if let Some(action) = &params.action {
                q = q.filter(activity_logs::action.ilike(format!("%{action}%")));
            }
            if let Some(entity_type) = &params.entity_type {
                q = q.filter(activity_logs::entity_type.ilike(format!("%{entity_type}%")));
            }
            if let Some(entity_id) = &params.entity_id {
                q = q.filter(activity_logs::entity_id.ilike(format!("%{entity_id}%")));
            }
            q
        };

        let count: i64 = filtered().count().get_result(&mut conn)?;
        let rows = filtered()
            .select(ActivityLog::as_select())
            .order(activity_logs::timestamp.desc())
            .limit(page_size)
            .offset(offset)
            .load(&mut conn)?;
        Ok((count, rows))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ActivityLogListResponse {
        count,
        num_pages: super::num_pages(count, page_size),
        current_page: page,
        results: rows.into_iter().map(ActivityLogResponse::from).collect(),
    }))
}
