use std::collections::HashMap;
use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::extract::{AdminUser, MaybeAuthUser};
use crate::catalog::{CatalogParams, ProductFilter};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::product::{NewProduct, Product};
use crate::schema::{cart_items, products};

/// How many products the discovery page shows.
const TRENDING_LIMIT: usize = 8;

const DEFAULT_CATEGORY: &str = "Uncategorized";

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "120.00"
    pub price: String,
    pub image: Option<String>,
    pub category: String,
    pub stock: i32,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            image: p.image,
            category: p.category,
            stock: p.stock,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    /// Decimal price as a string, e.g. "120.00"
    pub price: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub category: String,
    pub stock: i32,
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    let price = BigDecimal::from_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("Invalid price '{}'", raw)))?;
    if price < BigDecimal::from(0) {
        return Err(AppError::Validation("Price must not be negative".to_string()));
    }
    Ok(price)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Filtered/sorted catalog. All filter params are optional and compose
/// conjunctively; malformed numeric bounds are ignored rather than failing
/// the request.
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("category" = Option<String>, Query, description = "Exact category; \"All\" or absent disables the filter"),
        ("minPrice" = Option<String>, Query, description = "Inclusive lower price bound"),
        ("maxPrice" = Option<String>, Query, description = "Inclusive upper price bound"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring over name or description"),
        ("sort" = Option<String>, Query, description = "price_asc | price_desc | newest"),
    ),
    responses(
        (status = 200, description = "Matching products", body = [ProductResponse]),
    ),
    tag = "products"
)]
pub async fn list_products(
    pool: web::Data<DbPool>,
    query: web::Query<CatalogParams>,
    // Identity is optional here; the catalog reads the same for anonymous
    // and signed-in shoppers.
    _identity: MaybeAuthUser,
) -> Result<HttpResponse, AppError> {
    let filter = ProductFilter::from_params(&query.into_inner());

    let items = web::block(move || {
        let mut conn = pool.get()?;
        let rows: Vec<Product> = filter.into_query().load(&mut conn)?;
        Ok::<_, AppError>(rows.into_iter().map(ProductResponse::from).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(items))
}

/// GET /products/trending
///
/// Top products ranked by how many cart lines reference them. Cart adds are
/// the popularity signal here, not completed purchases.
#[utoipa::path(
    get,
    path = "/products/trending",
    responses(
        (status = 200, description = "Most-carted products, most popular first", body = [ProductResponse]),
    ),
    tag = "products"
)]
pub async fn trending_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let items = web::block(move || {
        let mut conn = pool.get()?;

        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for product_id in cart_items::table
            .select(cart_items::product_id)
            .load::<Uuid>(&mut conn)?
        {
            *counts.entry(product_id).or_insert(0) += 1;
        }

        let mut ranked: Vec<(Uuid, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(TRENDING_LIMIT);
        let ids: Vec<Uuid> = ranked.iter().map(|(id, _)| *id).collect();

        let rows: Vec<Product> = products::table
            .filter(products::id.eq_any(&ids))
            .select(Product::as_select())
            .load(&mut conn)?;
        let mut by_id: HashMap<Uuid, Product> = rows.into_iter().map(|p| (p.id, p)).collect();

        Ok::<_, AppError>(
            ids.iter()
                .filter_map(|id| by_id.remove(id))
                .map(ProductResponse::from)
                .collect::<Vec<_>>(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(items))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let product = web::block(move || {
        let mut conn = pool.get()?;
        let product = products::table
            .filter(products::id.eq(product_id))
            .select(Product::as_select())
            .first(&mut conn)
            .optional()?;
        Ok::<_, AppError>(product)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(product))),
        None => Err(AppError::NotFound("Product not found".to_string())),
    }
}

/// POST /products (admin)
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Missing name or malformed price"),
        (status = 403, description = "Admin privileges required"),
    ),
    tag = "products"
)]
pub async fn create_product(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    let price = parse_price(&body.price)?;
    let stock = body.stock.unwrap_or(0);
    if stock < 0 {
        return Err(AppError::Validation("Stock must not be negative".to_string()));
    }

    let product_id = web::block(move || {
        let mut conn = pool.get()?;
        let product_id = Uuid::new_v4();
        diesel::insert_into(products::table)
            .values(&NewProduct {
                id: product_id,
                name: body.name,
                description: body.description.unwrap_or_default(),
                price,
                image: body.image,
                category: body.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                stock,
            })
            .execute(&mut conn)?;
        Ok::<_, AppError>(product_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(serde_json::json!({ "id": product_id })))
}

/// PUT /products/{id} (admin)
///
/// Full replace of the mutable product fields. Does not touch existing
/// order lines: receipts keep their snapshots.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Malformed fields"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    _admin: AdminUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.into_inner();
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    let price = parse_price(&body.price)?;
    if body.stock < 0 {
        return Err(AppError::Validation("Stock must not be negative".to_string()));
    }

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        let updated = diesel::update(products::table.filter(products::id.eq(product_id)))
            .set((
                products::name.eq(body.name),
                products::description.eq(body.description),
                products::price.eq(price),
                products::image.eq(body.image),
                products::category.eq(body.category),
                products::stock.eq(body.stock),
            ))
            .execute(&mut conn)?;
        Ok::<_, AppError>(updated)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if updated == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Product updated" })))
}
