use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::errors::AppError;
use crate::timesheet::{self, round2};

#[derive(sqlx::FromRow)]
struct EmployeeOverviewRow {
    employee_id: u64,
    employee_name: String,
    total_hours: f64,
    overtime_hours: f64,
    hour_rate: f64,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeOverview {
    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "Maria Silva")]
    pub employee_name: String,

    #[schema(example = 120.5)]
    pub total_hours: f64,

    #[schema(example = 0.0)]
    pub overtime_hours: f64,

    #[schema(example = 7.5)]
    pub hour_rate: f64,

    /// Current-month pay at the employee's rate, fixed to 2 decimals.
    #[schema(example = "903.75")]
    pub total_pay: String,
}

/// Employees with current-month totals and pay (admin)
#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, description = "All employees with month totals", body = Object, example = json!({
            "employees": [{
                "employee_id": 7,
                "employee_name": "Maria Silva",
                "total_hours": 120.5,
                "overtime_hours": 0.0,
                "hour_rate": 7.5,
                "total_pay": "903.75"
            }]
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let (month_start, _) = timesheet::month_bounds(Local::now().date_naive());

    let rows = sqlx::query_as::<_, EmployeeOverviewRow>(
        r#"
        SELECT
            e.id AS employee_id,
            e.name AS employee_name,
            COALESCE(s.total_hours, 0) AS total_hours,
            COALESCE(s.overtime_hours, 0) AS overtime_hours,
            COALESCE(e.hour_rate, 0) AS hour_rate
        FROM employees e
        LEFT JOIN employee_monthly_stats s
            ON e.id = s.employee_id
            AND s.month_start = ?
        ORDER BY e.name ASC
        "#,
    )
    .bind(month_start)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch employee overview");
        AppError::Database(e)
    })?;

    let employees: Vec<EmployeeOverview> = rows
        .into_iter()
        .map(|r| {
            let total_pay = format!("{:.2}", round2(r.total_hours * r.hour_rate));
            EmployeeOverview {
                employee_id: r.employee_id,
                employee_name: r.employee_name,
                total_hours: r.total_hours,
                overtime_hours: r.overtime_hours,
                hour_rate: r.hour_rate,
                total_pay,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({ "employees": employees })))
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateRateReq {
    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = 8.25)]
    pub hour_rate: f64,
}

/// Update an employee's hourly rate (admin)
#[utoipa::path(
    post,
    path = "/api/admin/update-rate",
    request_body = UpdateRateReq,
    responses(
        (status = 200, description = "Rate updated", body = Object, example = json!({
            "message": "Valor por hora atualizado!"
        })),
        (status = 400, description = "Invalid rate"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn update_rate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateRateReq>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    if !payload.hour_rate.is_finite() || payload.hour_rate < 0.0 {
        return Err(AppError::Validation("Valor por hora inválido".to_string()));
    }

    let exists: Option<u64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
        .bind(payload.employee_id)
        .fetch_optional(pool.get_ref())
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound("Funcionário não encontrado".to_string()));
    }

    sqlx::query("UPDATE employees SET hour_rate = ? WHERE id = ?")
        .bind(payload.hour_rate)
        .bind(payload.employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = payload.employee_id, "Failed to update hour rate");
            AppError::Database(e)
        })?;

    tracing::info!(
        employee_id = payload.employee_id,
        hour_rate = payload.hour_rate,
        "Hour rate updated"
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Valor por hora atualizado!"
    })))
}
