pub mod application;
pub mod audit;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod jobs;
pub mod models;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::orders::OrderService;
use infrastructure::catalog::DieselCatalogStore;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::low_stock_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::adjust_product_stock,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::cancel_order,
        handlers::orders::admin_list_orders,
        handlers::activity_logs::list_activity_logs,
        handlers::analytics::list_daily_sales,
    ),
    tags(
        (name = "categories", description = "Category catalog"),
        (name = "products", description = "Product catalog and stock"),
        (name = "orders", description = "Order placement and fulfillment"),
        (name = "activity-logs", description = "Administrative audit trail"),
        (name = "analytics", description = "Sales aggregates"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let orders = web::Data::new(OrderService::new(DieselOrderRepository::new(pool.clone())));
    let catalog = web::Data::new(DieselCatalogStore::new(pool.clone()));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(orders.clone())
            .app_data(catalog.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/categories")
                    .route("", web::get().to(handlers::categories::list_categories))
                    .route("", web::post().to(handlers::categories::create_category)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("", web::post().to(handlers::products::create_product))
                    .route("/low-stock", web::get().to(handlers::products::low_stock_products))
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::put().to(handlers::products::update_product))
                    .route("/{id}", web::delete().to(handlers::products::delete_product))
                    .route(
                        "/{id}/adjust-stock",
                        web::post().to(handlers::products::adjust_product_stock),
                    ),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/admin/all", web::get().to(handlers::orders::admin_list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/{id}/status",
                        web::patch().to(handlers::orders::update_order_status),
                    )
                    .route(
                        "/{id}/cancel",
                        web::delete().to(handlers::orders::cancel_order),
                    ),
            )
            .service(
                web::scope("/activity-logs")
                    .route("", web::get().to(handlers::activity_logs::list_activity_logs)),
            )
            .service(
                web::scope("/analytics")
                    .route("/daily-sales", web::get().to(handlers::analytics::list_daily_sales)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
