use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    errors::AppError,
    model::{employee::Employee, role::Role},
    models::LoginReqDto,
};
use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

#[instrument(
    name = "auth_login",
    skip(pool, config, payload),
    fields(username = %payload.username)
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::Validation(
            "Nome de utilizador e password são obrigatórios".to_string(),
        ));
    }

    debug!("Fetching employee from database");

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, username, password, role_id, hour_rate, active
        FROM employees
        WHERE username = ? AND active = 1
        "#,
    )
    .bind(&payload.username)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Database error while fetching employee");
        AppError::Database(e)
    })?;

    let employee = match employee {
        Some(e) => {
            debug!(employee_id = e.id, "Employee found");
            e
        }
        None => {
            info!("Invalid credentials: employee not found");
            return Err(AppError::Unauthorized(
                "Utilizador não encontrado".to_string(),
            ));
        }
    };

    if verify_password(&payload.password, &employee.password).is_err() {
        info!("Invalid credentials: password mismatch");
        return Err(AppError::Unauthorized("Password incorreta".to_string()));
    }

    // An unknown role id never blocks login, it just demotes.
    let role = Role::from_id(employee.role_id).unwrap_or(Role::Employee);

    let token = generate_access_token(
        employee.id,
        employee.username.clone(),
        role.as_id(),
        &config.jwt_secret,
        config.access_token_ttl,
    );

    info!("Login successful");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login com sucesso",
        "token": token,
        "user": {
            "id": employee.id,
            "name": employee.name,
            "username": employee.username,
            "role": role.as_str(),
        },
    })))
}
