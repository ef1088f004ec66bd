use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::review::NewReview;
use crate::schema::{products, reviews, users};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub product_id: Uuid,
    /// 1 to 5 inclusive.
    pub rating: i32,
    pub title: String,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub rating: i32,
    pub title: String,
    pub comment: String,
    pub created_at: String,
    pub username: String,
}

/// Derived on the fly from the review rows; never stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct RatingResponse {
    pub average_rating: f64,
    pub review_count: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /reviews/product/{product_id}
#[utoipa::path(
    get,
    path = "/reviews/product/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Reviews for the product, newest first", body = [ReviewResponse]),
    ),
    tag = "reviews"
)]
pub async fn list_product_reviews(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let items = web::block(move || {
        let mut conn = pool.get()?;
        let rows: Vec<(Uuid, i32, String, String, chrono::DateTime<chrono::Utc>, String)> =
            reviews::table
                .inner_join(users::table)
                .filter(reviews::product_id.eq(product_id))
                .order(reviews::created_at.desc())
                .select((
                    reviews::id,
                    reviews::rating,
                    reviews::title,
                    reviews::comment,
                    reviews::created_at,
                    users::username,
                ))
                .load(&mut conn)?;

        Ok::<_, AppError>(
            rows.into_iter()
                .map(|(id, rating, title, comment, created_at, username)| ReviewResponse {
                    id,
                    rating,
                    title,
                    comment,
                    created_at: created_at.to_rfc3339(),
                    username,
                })
                .collect::<Vec<_>>(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(items))
}

/// GET /reviews/rating/{product_id}
///
/// Arithmetic mean and count. A product without reviews answers 0/0
/// rather than dividing by zero.
#[utoipa::path(
    get,
    path = "/reviews/rating/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Average rating and review count", body = RatingResponse),
    ),
    tag = "reviews"
)]
pub async fn product_rating(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let response = web::block(move || {
        let mut conn = pool.get()?;
        let ratings: Vec<i32> = reviews::table
            .filter(reviews::product_id.eq(product_id))
            .select(reviews::rating)
            .load(&mut conn)?;

        let review_count = ratings.len() as i64;
        let average_rating = if review_count == 0 {
            0.0
        } else {
            ratings.iter().sum::<i32>() as f64 / review_count as f64
        };

        Ok::<_, AppError>(RatingResponse {
            average_rating,
            review_count,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /reviews
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created"),
        (status = 400, description = "Rating out of range or missing title"),
        (status = 401, description = "Missing bearer token"),
        (status = 404, description = "Product not found"),
    ),
    tag = "reviews"
)]
pub async fn create_review(
    user: AuthUser,
    pool: web::Data<DbPool>,
    body: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let review_id = web::block(move || {
        let mut conn = pool.get()?;

        let product_exists: bool = diesel::select(diesel::dsl::exists(
            products::table.filter(products::id.eq(body.product_id)),
        ))
        .get_result(&mut conn)?;
        if !product_exists {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        let review_id = Uuid::new_v4();
        diesel::insert_into(reviews::table)
            .values(&NewReview {
                id: review_id,
                product_id: body.product_id,
                user_id: user.id,
                rating: body.rating,
                title: body.title,
                comment: body.comment.unwrap_or_default(),
            })
            .execute(&mut conn)?;
        Ok(review_id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(serde_json::json!({ "id": review_id })))
}

/// DELETE /reviews/{id}
///
/// Only the authoring user may delete their review.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review UUID")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 401, description = "Missing bearer token"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Review not found"),
    ),
    tag = "reviews"
)]
pub async fn delete_review(
    user: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();

    web::block(move || {
        let mut conn = pool.get()?;

        conn.transaction::<_, AppError, _>(|conn| {
            let author: Option<Uuid> = reviews::table
                .filter(reviews::id.eq(review_id))
                .select(reviews::user_id)
                .first(conn)
                .optional()?;
            let Some(author) = author else {
                return Err(AppError::NotFound("Review not found".to_string()));
            };
            if author != user.id {
                return Err(AppError::Forbidden(
                    "Only the author may delete a review".to_string(),
                ));
            }

            diesel::delete(reviews::table.filter(reviews::id.eq(review_id))).execute(conn)?;
            Ok(())
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Review deleted" })))
}
