use actix_web::{HttpResponse, web};
use secrecy::{ExposeSecret, SecretString};

use crate::authentication::AdminGuard;
use crate::routes::ApiError;

#[derive(serde::Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: SecretString,
}

#[tracing::instrument(name = "Admin login", skip(body, guard), fields(login_email = %body.email))]
pub async fn admin_login(
    body: web::Json<LoginBody>,
    guard: web::Data<AdminGuard>,
) -> Result<HttpResponse, ApiError> {
    let token = guard.login(&body.email, body.password.expose_secret())?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "token": token,
    })))
}
