use actix_web::{web, HttpRequest, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::{self, ActivityEvent};
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::domain::product::slugify;
use crate::errors::AppError;
use crate::models::category::{Category, NewCategory};
use crate::schema::categories;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Derived from the name when omitted; immutable afterwards.
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        CategoryResponse {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
        }
    }
}

/// GET /categories
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories", body = [CategoryResponse]),
    ),
    tag = "categories"
)]
pub async fn list_categories(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || -> Result<Vec<Category>, AppError> {
        let mut conn = pool.get()?;
        Ok(categories::table
            .select(Category::as_select())
            .order(categories::name.asc())
            .load(&mut conn)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let responses: Vec<CategoryResponse> = rows.into_iter().map(CategoryResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// POST /categories
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 403, description = "Caller is not an administrator"),
        (status = 409, description = "Duplicate slug"),
    ),
    tag = "categories"
)]
pub async fn create_category(
    pool: web::Data<DbPool>,
    admin: AdminUser,
    body: web::Json<CreateCategoryRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let slug = match body.slug {
        Some(slug) => slug,
        None => slugify(&body.name),
    };
    if slug.is_empty() {
        return Err(AppError::InvalidInput(
            "a slug could not be derived from the name".to_string(),
        ));
    }

    let db = pool.get_ref().clone();
    let category = web::block(move || -> Result<Category, AppError> {
        let mut conn = db.get()?;
        let category = diesel::insert_into(categories::table)
            .values(&NewCategory {
                id: Uuid::new_v4(),
                name: body.name,
                slug,
                description: body.description,
            })
            .returning(Category::as_returning())
            .get_result(&mut conn)?;
        Ok(category)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    audit::dispatch(
        pool.get_ref().clone(),
        ActivityEvent::new("category_created")
            .by(&admin.0)
            .on("category", category.id)
            .with_details(json!({ "name": category.name.clone(), "slug": category.slug.clone() }))
            .from_request(&req),
    );

    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}
