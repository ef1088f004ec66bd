use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::checkout_service::CheckoutService;
use crate::auth::extract::AuthUser;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::models::cart_item::{CartItem, NewCartItem};
use crate::models::product::Product;
use crate::schema::{cart_items, products};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    /// Defaults to 1 when omitted.
    pub quantity: Option<i32>,
}

/// Cart line joined with the live product it points at. Prices here are
/// live, not snapshotted: the cart is not a receipt.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub stock: i32,
    pub quantity: i32,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The caller's cart lines", body = [CartLineResponse]),
        (status = 401, description = "Missing bearer token"),
    ),
    tag = "cart"
)]
pub async fn list_cart(user: AuthUser, pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let items = web::block(move || {
        let mut conn = pool.get()?;
        let rows: Vec<(CartItem, Product)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::user_id.eq(user.id))
            .order(cart_items::created_at.asc())
            .select((CartItem::as_select(), Product::as_select()))
            .load(&mut conn)?;

        Ok::<_, AppError>(
            rows.into_iter()
                .map(|(line, product)| CartLineResponse {
                    id: line.id,
                    product_id: product.id,
                    name: product.name,
                    price: product.price.to_string(),
                    image: product.image,
                    stock: product.stock,
                    quantity: line.quantity,
                })
                .collect::<Vec<_>>(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(items))
}

/// POST /cart
///
/// Stock-aware insert/merge: adding a product already in the cart
/// increments the existing line instead of inserting a second one, and the
/// combined quantity must fit the current stock.
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Line inserted or merged"),
        (status = 400, description = "Not enough stock"),
        (status = 401, description = "Missing bearer token"),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    user: AuthUser,
    pool: web::Data<DbPool>,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let qty = body.quantity.unwrap_or(1);
    if qty < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }

    let line_id = web::block(move || {
        let mut conn = pool.get()?;

        conn.transaction::<_, AppError, _>(|conn| {
            let product: Option<(String, i32)> = products::table
                .filter(products::id.eq(body.product_id))
                .select((products::name, products::stock))
                .first(conn)
                .optional()?;
            let Some((name, stock)) = product else {
                return Err(AppError::NotFound("Product not found".to_string()));
            };

            let existing: Option<CartItem> = cart_items::table
                .filter(cart_items::user_id.eq(user.id))
                .filter(cart_items::product_id.eq(body.product_id))
                .select(CartItem::as_select())
                .first(conn)
                .optional()?;

            match existing {
                Some(line) => {
                    if stock < line.quantity + qty {
                        return Err(AppError::InsufficientStock { product: name });
                    }
                    diesel::update(cart_items::table.filter(cart_items::id.eq(line.id)))
                        .set(cart_items::quantity.eq(cart_items::quantity + qty))
                        .execute(conn)?;
                    Ok(line.id)
                }
                None => {
                    if stock < qty {
                        return Err(AppError::InsufficientStock { product: name });
                    }
                    let line_id = Uuid::new_v4();
                    diesel::insert_into(cart_items::table)
                        .values(&NewCartItem {
                            id: line_id,
                            user_id: user.id,
                            product_id: body.product_id,
                            quantity: qty,
                        })
                        .execute(conn)?;
                    Ok(line_id)
                }
            }
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(serde_json::json!({ "id": line_id })))
}

/// DELETE /cart/{id}
///
/// Only the owning user can remove a line; anyone else sees 404.
#[utoipa::path(
    delete,
    path = "/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart line UUID")),
    responses(
        (status = 200, description = "Line removed"),
        (status = 401, description = "Missing bearer token"),
        (status = 404, description = "No such line in the caller's cart"),
    ),
    tag = "cart"
)]
pub async fn remove_from_cart(
    user: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let line_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq(line_id))
                .filter(cart_items::user_id.eq(user.id)),
        )
        .execute(&mut conn)?;
        Ok::<_, AppError>(deleted)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound("Cart item not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Item removed" })))
}

/// POST /cart/checkout
///
/// Converts the caller's cart into an order as one atomic unit. On any
/// failure nothing is committed: no order, no stock change, no cart change.
#[utoipa::path(
    post,
    path = "/cart/checkout",
    responses(
        (status = 200, description = "Order created; body carries its id"),
        (status = 400, description = "Empty cart or not enough stock"),
        (status = 401, description = "Missing bearer token"),
    ),
    tag = "cart"
)]
pub async fn checkout(
    user: AuthUser,
    service: web::Data<CheckoutService<DieselOrderRepository>>,
) -> Result<HttpResponse, AppError> {
    let order_id = web::block(move || service.checkout(user.id).map_err(AppError::from))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checkout successful",
        "order_id": order_id,
    })))
}
