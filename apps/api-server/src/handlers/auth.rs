//! Admin login.

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use inkpress_core::ports::{PasswordService, TokenService};
use inkpress_shared::dto::{AuthResponse, LoginRequest};

use crate::middleware::auth::ADMIN_ROLE;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut errors = Vec::new();
    if req.email.trim().is_empty() {
        errors.push("email is required".to_string());
    }
    if req.password.is_empty() {
        errors.push("password is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let Some(admin) = &state.admin else {
        tracing::warn!("Login attempted while admin credentials are not configured");
        return Err(AppError::Unauthorized);
    };

    if !req.email.trim().eq_ignore_ascii_case(&admin.email) {
        return Err(AppError::Unauthorized);
    }

    let valid = password_service
        .verify(&req.password, &admin.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !valid {
        tracing::info!("Rejected admin login");
        return Err(AppError::Unauthorized);
    }

    let token = token_service
        .generate_token(&admin.email, vec![ADMIN_ROLE.to_string()])
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!("Admin logged in");
    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
    }))
}
