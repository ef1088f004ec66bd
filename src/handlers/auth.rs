use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenSigner;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::user::{NewUser, User, ROLE_USER};
use crate::schema::users;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /auth/register
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing username or password"),
        (status = 409, description = "Username already exists"),
    ),
    tag = "auth"
)]
pub async fn register(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let response = web::block(move || {
        let password_hash = hash_password(&body.password)?;
        let mut conn = pool.get()?;

        let user_id = Uuid::new_v4();
        let inserted = diesel::insert_into(users::table)
            .values(&NewUser {
                id: user_id,
                username: body.username.clone(),
                password_hash,
                role: ROLE_USER.to_string(),
            })
            .execute(&mut conn);

        match inserted {
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(AppError::Conflict("Username already exists".to_string()))
            }
            other => {
                other?;
                Ok(RegisterResponse {
                    id: user_id,
                    username: body.username,
                })
            }
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(response))
}

/// POST /auth/login
///
/// Issues a signed bearer token with a fixed expiry window. Unknown
/// usernames and wrong passwords answer identically.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn login(
    pool: web::Data<DbPool>,
    signer: web::Data<TokenSigner>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let response = web::block(move || {
        let mut conn = pool.get()?;

        let user = users::table
            .filter(users::username.eq(&body.username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        let Some(user) = user else {
            return Err(AppError::Unauthenticated("Invalid credentials".to_string()));
        };

        if !verify_password(&user.password_hash, &body.password)? {
            return Err(AppError::Unauthenticated("Invalid credentials".to_string()));
        }

        let token = signer.issue(user.id, &user.username, &user.role)?;
        Ok(LoginResponse {
            token,
            user: UserResponse {
                id: user.id,
                username: user.username,
                role: user.role,
            },
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}
