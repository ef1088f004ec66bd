use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::product::Product;
use crate::models::wishlist_item::{NewWishlistItem, WishlistItem};
use crate::schema::{products, wishlist_items};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddWishlistItemRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistEntryResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub category: String,
    pub stock: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistCheckResponse {
    pub in_wishlist: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /wishlist
#[utoipa::path(
    get,
    path = "/wishlist",
    responses(
        (status = 200, description = "The caller's wishlist, newest first", body = [WishlistEntryResponse]),
        (status = 401, description = "Missing bearer token"),
    ),
    tag = "wishlist"
)]
pub async fn list_wishlist(
    user: AuthUser,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, AppError> {
    let items = web::block(move || {
        let mut conn = pool.get()?;
        let rows: Vec<(WishlistItem, Product)> = wishlist_items::table
            .inner_join(products::table)
            .filter(wishlist_items::user_id.eq(user.id))
            .order(wishlist_items::created_at.desc())
            .select((WishlistItem::as_select(), Product::as_select()))
            .load(&mut conn)?;

        Ok::<_, AppError>(
            rows.into_iter()
                .map(|(entry, product)| WishlistEntryResponse {
                    id: entry.id,
                    product_id: product.id,
                    name: product.name,
                    price: product.price.to_string(),
                    image: product.image,
                    category: product.category,
                    stock: product.stock,
                })
                .collect::<Vec<_>>(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(items))
}

/// POST /wishlist
///
/// The (user, product) pair is unique; adding it twice is a conflict.
#[utoipa::path(
    post,
    path = "/wishlist",
    request_body = AddWishlistItemRequest,
    responses(
        (status = 201, description = "Entry added"),
        (status = 401, description = "Missing bearer token"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product already in wishlist"),
    ),
    tag = "wishlist"
)]
pub async fn add_to_wishlist(
    user: AuthUser,
    pool: web::Data<DbPool>,
    body: web::Json<AddWishlistItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let entry_id = web::block(move || {
        let mut conn = pool.get()?;

        let product_exists: bool = diesel::select(diesel::dsl::exists(
            products::table.filter(products::id.eq(body.product_id)),
        ))
        .get_result(&mut conn)?;
        if !product_exists {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        let entry_id = Uuid::new_v4();
        let inserted = diesel::insert_into(wishlist_items::table)
            .values(&NewWishlistItem {
                id: entry_id,
                user_id: user.id,
                product_id: body.product_id,
            })
            .execute(&mut conn);

        match inserted {
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(AppError::Conflict("Product already in wishlist".to_string()))
            }
            other => {
                other?;
                Ok(entry_id)
            }
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(serde_json::json!({ "id": entry_id })))
}

/// DELETE /wishlist/{product_id}
#[utoipa::path(
    delete,
    path = "/wishlist/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Entry removed"),
        (status = 401, description = "Missing bearer token"),
        (status = 404, description = "Product not in the caller's wishlist"),
    ),
    tag = "wishlist"
)]
pub async fn remove_from_wishlist(
    user: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        let deleted = diesel::delete(
            wishlist_items::table
                .filter(wishlist_items::user_id.eq(user.id))
                .filter(wishlist_items::product_id.eq(product_id)),
        )
        .execute(&mut conn)?;
        Ok::<_, AppError>(deleted)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound(
            "Item not found in wishlist".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Removed from wishlist" })))
}

/// GET /wishlist/check/{product_id}
#[utoipa::path(
    get,
    path = "/wishlist/check/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Whether the product is wishlisted", body = WishlistCheckResponse),
        (status = 401, description = "Missing bearer token"),
    ),
    tag = "wishlist"
)]
pub async fn check_wishlist(
    user: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let in_wishlist = web::block(move || {
        let mut conn = pool.get()?;
        let present: bool = diesel::select(diesel::dsl::exists(
            wishlist_items::table
                .filter(wishlist_items::user_id.eq(user.id))
                .filter(wishlist_items::product_id.eq(product_id)),
        ))
        .get_result(&mut conn)?;
        Ok::<_, AppError>(present)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(WishlistCheckResponse { in_wishlist }))
}
