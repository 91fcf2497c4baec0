/// Admin routes. The access guard only lets ADMIN tokens through.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::domain::Role;
use crate::error::AppError;
use crate::services::UserService;

/// GET /api/v1/admin/users
pub async fn list_users(users: web::Data<UserService>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(users.find_all_users().await?))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Body is the bare role name, `ADMIN` or `USER`, in any case.
pub async fn update_user_role(
    path: web::Path<Uuid>,
    body: String,
    users: web::Data<UserService>,
) -> Result<HttpResponse, AppError> {
    let role: Role = body.parse()?;
    let updated = users.update_role(path.into_inner(), role).await?;
    Ok(HttpResponse::Ok().json(updated))
}
