/// Authentication Routes
///
/// Registration, login and refresh-token rotation. All three are public and
/// answer with an `AuthResult`.

use actix_web::{web, HttpResponse};

use crate::domain::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::error::AppError;
use crate::services::CredentialService;
use crate::validators::require_present;

/// POST /api/v1/auth/register
///
/// # Errors
/// - 400: blank or malformed fields
/// - 409: username already in use
pub async fn register(
    form: web::Json<RegisterRequest>,
    credentials: web::Data<CredentialService>,
) -> Result<HttpResponse, AppError> {
    let result = credentials.register(&form).await?;
    Ok(HttpResponse::Created().json(result))
}

/// POST /api/v1/auth/login
///
/// # Errors
/// - 400: blank username or password
/// - 401: invalid credentials (same response for unknown user and wrong password)
pub async fn login(
    form: web::Json<LoginRequest>,
    credentials: web::Data<CredentialService>,
) -> Result<HttpResponse, AppError> {
    require_present("username", &form.username)?;
    require_present("password", &form.password)?;

    let result = credentials.login(&form).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/v1/auth/refresh-token
///
/// Rotates the presented refresh token. Reusing it afterwards fails.
///
/// # Errors
/// - 400: blank token
/// - 401: token not found (unknown, or already rotated)
/// - 403: token expired
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    credentials: web::Data<CredentialService>,
) -> Result<HttpResponse, AppError> {
    require_present("refreshToken", &form.refresh_token)?;

    let result = credentials.refresh(&form.refresh_token).await?;
    Ok(HttpResponse::Ok().json(result))
}
