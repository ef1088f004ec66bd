use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::checkout_service::CheckoutService;
use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::infrastructure::order_repo::DieselOrderRepository;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub product_name: String,
    pub price_at_purchase: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub username: String,
    pub total_price: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders (admin)
///
/// Full sales log, newest order first, each order with its snapshot lines
/// and the buyer's username.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated sales log", body = ListOrdersResponse),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Admin privileges required"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    _admin: AdminUser,
    service: web::Data<CheckoutService<DieselOrderRepository>>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let response = web::block(move || {
        let sales = service.sales_log(page, limit).map_err(AppError::from)?;

        Ok::<_, AppError>(ListOrdersResponse {
            items: sales
                .items
                .into_iter()
                .map(|order| OrderResponse {
                    id: order.id,
                    username: order.username,
                    total_price: order.total_price.to_string(),
                    created_at: order.created_at.to_rfc3339(),
                    lines: order
                        .lines
                        .into_iter()
                        .map(|line| OrderLineResponse {
                            product_name: line.product_name,
                            price_at_purchase: line.price_at_purchase.to_string(),
                            quantity: line.quantity,
                        })
                        .collect(),
                })
                .collect(),
            total: sales.total,
            page,
            limit,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}
