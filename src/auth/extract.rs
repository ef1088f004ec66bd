//! Request-context identity extractors.
//!
//! The three gates the handlers compose: required (`AuthUser`), optional
//! (`MaybeAuthUser`), and admin (`AdminUser`). All of them read the same
//! `Authorization: Bearer <token>` header and the same `TokenSigner` from
//! app data, so there is exactly one verification path.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use uuid::Uuid;

use super::token::{Claims, TokenSigner};
use crate::errors::AppError;
use crate::models::user::ROLE_ADMIN;

/// Verified identity attached to a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            role: claims.role,
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Missing credential is 401; present-but-invalid (bad signature, expired)
/// is 403.
fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let signer = req
        .app_data::<web::Data<TokenSigner>>()
        .ok_or_else(|| AppError::Internal("TokenSigner missing from app data".to_string()))?;
    let token = bearer_token(req)
        .ok_or_else(|| AppError::Unauthenticated("Missing bearer token".to_string()))?;
    signer.verify(token).map(AuthUser::from)
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Optional-mode gate: absent or invalid credentials yield `None` instead of
/// failing the request.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequest for MaybeAuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeAuthUser(authenticate(req).ok())))
    }
}

/// Admin gate: required-mode identity whose role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            if user.is_admin() {
                Ok(AdminUser(user))
            } else {
                Err(AppError::Forbidden("Admin privileges required".to_string()))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", 3600)
    }

    fn request_with(token: Option<&str>) -> HttpRequest {
        let mut req = TestRequest::default().app_data(web::Data::new(signer()));
        if let Some(token) = token {
            req = req.insert_header((AUTHORIZATION, format!("Bearer {}", token)));
        }
        req.to_http_request()
    }

    #[actix_web::test]
    async fn required_mode_accepts_a_valid_token() {
        let id = Uuid::new_v4();
        let token = signer().issue(id, "alice", "user").unwrap();
        let req = request_with(Some(&token));

        let user = AuthUser::from_request(&req, &mut Payload::None)
            .await
            .expect("extraction should succeed");
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert!(!user.is_admin());
    }

    #[actix_web::test]
    async fn missing_header_is_unauthenticated() {
        let req = request_with(None);
        let result = AuthUser::from_request(&req, &mut Payload::None).await;
        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[actix_web::test]
    async fn garbled_token_is_forbidden() {
        let req = request_with(Some("garbage"));
        let result = AuthUser::from_request(&req, &mut Payload::None).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[actix_web::test]
    async fn optional_mode_swallows_bad_credentials() {
        let anonymous = MaybeAuthUser::from_request(&request_with(None), &mut Payload::None)
            .await
            .expect("optional mode never fails");
        assert!(anonymous.0.is_none());

        let invalid = MaybeAuthUser::from_request(&request_with(Some("garbage")), &mut Payload::None)
            .await
            .expect("optional mode never fails");
        assert!(invalid.0.is_none());

        let token = signer().issue(Uuid::new_v4(), "bob", "user").unwrap();
        let valid = MaybeAuthUser::from_request(&request_with(Some(&token)), &mut Payload::None)
            .await
            .expect("optional mode never fails");
        assert_eq!(valid.0.expect("identity attached").username, "bob");
    }

    #[actix_web::test]
    async fn admin_gate_rejects_plain_users() {
        let token = signer().issue(Uuid::new_v4(), "alice", "user").unwrap();
        let result = AdminUser::from_request(&request_with(Some(&token)), &mut Payload::None).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let token = signer().issue(Uuid::new_v4(), "root", "admin").unwrap();
        let admin = AdminUser::from_request(&request_with(Some(&token)), &mut Payload::None)
            .await
            .expect("admin should pass");
        assert!(admin.0.is_admin());
    }
}
