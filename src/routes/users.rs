/// User profile routes. Accessible to admins and to the user themselves.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::Claims;
use crate::domain::{UpdateUserRequest, User, UserResponse};
use crate::error::{AppError, AuthError};
use crate::services::UserService;

/// Load the target user if the caller may act on it.
///
/// Non-admins get 403 for both other users and unknown ids, so ids cannot
/// be enumerated.
async fn authorize_self_or_admin(
    claims: &Claims,
    id: Uuid,
    users: &UserService,
) -> Result<User, AppError> {
    match users.find_user(id).await {
        Ok(user) if claims.is_admin() || claims.is_subject(user.id) => Ok(user),
        Ok(_) => Err(AuthError::Forbidden.into()),
        Err(AppError::Auth(AuthError::UserNotFound)) if !claims.is_admin() => {
            Err(AuthError::Forbidden.into())
        }
        Err(e) => Err(e),
    }
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    path: web::Path<Uuid>,
    claims: web::ReqData<Claims>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = authorize_self_or_admin(&claims, path.into_inner(), &users).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// PUT /api/v1/users/{id}
///
/// # Errors
/// - 400: malformed fields
/// - 403: neither admin nor the user themselves
/// - 404: unknown id (admins only)
/// - 409: new username already in use
pub async fn update_user(
    path: web::Path<Uuid>,
    form: web::Json<UpdateUserRequest>,
    claims: web::ReqData<Claims>,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let user = authorize_self_or_admin(&claims, path.into_inner(), &users).await?;
    let updated = users.update(user.id, &form).await?;
    Ok(HttpResponse::Ok().json(updated))
}
