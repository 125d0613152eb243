//! Authentication handlers.

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use quill_core::domain::User;
use quill_core::ports::{PasswordService, TokenService};
use quill_shared::dto::{AuthResponse, RegisterRequest, SigninRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_string()));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password_service.hash(&req.password)?;
    let user = state
        .users
        .create(&User::new(req.name, req.email, password_hash))
        .await?;
    tracing::info!(user_id = user.id, "User registered");

    let token = token_service.generate_token(user.id, &user.email)?;

    Ok(HttpResponse::Created().json(auth_response(token, token_service.get_ref().as_ref())))
}

/// POST /api/auth/signin
pub async fn signin(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<SigninRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !password_service.verify(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = token_service.generate_token(user.id, &user.email)?;

    Ok(HttpResponse::Ok().json(auth_response(token, token_service.get_ref().as_ref())))
}

fn auth_response(access_token: String, tokens: &dyn TokenService) -> AuthResponse {
    AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: u64::try_from(tokens.expiration_seconds()).unwrap_or(0),
    }
}
