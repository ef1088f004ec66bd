pub mod application;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod models;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::checkout_service::CheckoutService;
use auth::token::TokenSigner;
use infrastructure::order_repo::DieselOrderRepository;

pub use config::AppConfig;
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
        handlers::auth::register,
        handlers::auth::login,
        handlers::products::list_products,
        handlers::products::trending_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::cart::list_cart,
        handlers::cart::add_to_cart,
        handlers::cart::remove_from_cart,
        handlers::cart::checkout,
        handlers::orders::list_orders,
        handlers::reviews::list_product_reviews,
        handlers::reviews::product_rating,
        handlers::reviews::create_review,
        handlers::reviews::delete_review,
        handlers::wishlist::list_wishlist,
        handlers::wishlist::add_to_wishlist,
        handlers::wishlist::remove_from_wishlist,
        handlers::wishlist::check_wishlist,
    ),
    components(schemas(
        handlers::auth::RegisterRequest,
        handlers::auth::RegisterResponse,
        handlers::auth::LoginRequest,
        handlers::auth::LoginResponse,
        handlers::auth::UserResponse,
        handlers::products::ProductResponse,
        handlers::products::CreateProductRequest,
        handlers::products::UpdateProductRequest,
        handlers::cart::AddCartItemRequest,
        handlers::cart::CartLineResponse,
        handlers::orders::OrderResponse,
        handlers::orders::OrderLineResponse,
        handlers::orders::ListOrdersResponse,
        handlers::reviews::CreateReviewRequest,
        handlers::reviews::ReviewResponse,
        handlers::reviews::RatingResponse,
        handlers::wishlist::AddWishlistItemRequest,
        handlers::wishlist::WishlistEntryResponse,
        handlers::wishlist::WishlistCheckResponse,
    )),
    tags(
        (name = "auth", description = "Account registration and token issue"),
        (name = "products", description = "Catalog browsing and admin product management"),
        (name = "cart", description = "Per-user cart and atomic checkout"),
        (name = "orders", description = "Admin sales log"),
        (name = "reviews", description = "Product reviews and derived ratings"),
        (name = "wishlist", description = "Per-user wishlist"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to the configured host/port.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: &AppConfig) -> std::io::Result<actix_web::dev::Server> {
    let signer = web::Data::new(TokenSigner::new(&config.jwt_secret, config.token_ttl_secs));
    let checkout_service = web::Data::new(CheckoutService::new(DieselOrderRepository::new(
        pool.clone(),
    )));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(signer.clone())
            .app_data(checkout_service.clone())
            .wrap(Logger::default())
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("", web::post().to(handlers::products::create_product))
                    // "/trending" must be registered before "/{id}"
                    .route("/trending", web::get().to(handlers::products::trending_products))
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::put().to(handlers::products::update_product)),
            )
            .service(
                web::scope("/cart")
                    .route("", web::get().to(handlers::cart::list_cart))
                    .route("", web::post().to(handlers::cart::add_to_cart))
                    .route("/checkout", web::post().to(handlers::cart::checkout))
                    .route("/{id}", web::delete().to(handlers::cart::remove_from_cart)),
            )
            .service(
                web::scope("/orders").route("", web::get().to(handlers::orders::list_orders)),
            )
            .service(
                web::scope("/reviews")
                    .route(
                        "/product/{product_id}",
                        web::get().to(handlers::reviews::list_product_reviews),
                    )
                    .route(
                        "/rating/{product_id}",
                        web::get().to(handlers::reviews::product_rating),
                    )
                    .route("", web::post().to(handlers::reviews::create_review))
                    .route("/{id}", web::delete().to(handlers::reviews::delete_review)),
            )
            .service(
                web::scope("/wishlist")
                    .route("", web::get().to(handlers::wishlist::list_wishlist))
                    .route("", web::post().to(handlers::wishlist::add_to_wishlist))
                    .route(
                        "/check/{product_id}",
                        web::get().to(handlers::wishlist::check_wishlist),
                    )
                    .route(
                        "/{product_id}",
                        web::delete().to(handlers::wishlist::remove_from_wishlist),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((config.host.clone(), config.port))?
    .run())
}
