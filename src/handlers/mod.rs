pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use actix_web::HttpResponse;

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("Storefront API is running")
}
