pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::ingest::load_orders,
        handlers::ingest::load_order_items,
        handlers::ingest::load_orders_with_items,
    ),
    components(schemas(
        domain::records::OrderRecord,
        domain::records::OrderItemRecord,
        domain::records::OrderWithItemsRecord,
        domain::records::EmbeddedItemRecord,
        domain::records::OrderItemKey,
        domain::report::OrderSnapshot,
        domain::report::OrderItemSnapshot,
        domain::report::SkippedOrder,
        domain::report::RecordError,
        domain::report::OrderBatchSummary,
        domain::report::OrderBatchReport,
        domain::report::OrderItemBatchSummary,
        domain::report::OrderItemBatchReport,
    )),
    tags((name = "bulk_load", description = "Idempotent bulk ingestion of commerce records"))
)]
struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/bulk_load")
                    .route("/orders", web::post().to(handlers::ingest::load_orders))
                    .route(
                        "/order_items",
                        web::post().to(handlers::ingest::load_order_items),
                    )
                    .route(
                        "/orders_with_items",
                        web::post().to(handlers::ingest::load_orders_with_items),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
