use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::errors::AppError;
use crate::model::marking::MarkingType;
use crate::timesheet::{self, SequenceViolation};

#[derive(Deserialize, ToSchema)]
pub struct MarkTimeReq {
    #[schema(example = "entrada")]
    #[serde(rename = "type")]
    pub marking_type: String,

    #[schema(example = 38.7223)]
    pub latitude: Option<f64>,

    #[schema(example = -9.1393)]
    pub longitude: Option<f64>,

    /// Resolved by the client before submitting; stored as-is.
    #[schema(example = "Av. da Liberdade 1, Lisboa", nullable = true)]
    pub address: Option<String>,
}

/// Latitude and longitude travel together; address alone is useless.
fn location_ok(latitude: Option<f64>, longitude: Option<f64>, required: bool) -> bool {
    match (latitude, longitude) {
        (Some(_), Some(_)) => true,
        (None, None) => !required,
        _ => false,
    }
}

/// Mark time endpoint (entrada/saida)
#[utoipa::path(
    post,
    path = "/api/employee/mark-time",
    request_body = MarkTimeReq,
    responses(
        (status = 201, description = "Marking recorded", body = Object, example = json!({
            "message": "Marcação de entrada registada com sucesso!",
            "month": { "total": 42.5, "overtime": 0.0 }
        })),
        (status = 400, description = "Sequencing or location violation", body = Object, example = json!({
            "message": "Já marcaste entrada hoje!"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Marcações"
)]
pub async fn mark_time(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<MarkTimeReq>,
) -> Result<HttpResponse, AppError> {
    let employee_id = auth.employee_id;

    let kind = MarkingType::parse(payload.marking_type.trim())
        .ok_or_else(|| AppError::Validation("Tipo inválido".to_string()))?;

    if !location_ok(payload.latitude, payload.longitude, config.require_location) {
        return Err(AppError::Validation(
            "A localização é obrigatória para marcar a hora.".to_string(),
        ));
    }

    let today = Local::now().date_naive();

    // One entrada and one saida per local calendar day.
    let todays: Vec<MarkingType> = sqlx::query_scalar(
        r#"
        SELECT type FROM markings
        WHERE employee_id = ?
        AND DATE(timestamp) = ?
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .fetch_all(pool.get_ref())
    .await?;

    timesheet::check_day_sequence(&todays, kind)
        .map_err(|v| AppError::Validation(v.message().to_string()))?;

    // Marking insert and aggregate refresh commit or fail together, so
    // the cached month can never trail the raw markings.
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO markings (employee_id, type, timestamp, latitude, longitude, location)
        VALUES (?, ?, NOW(), ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(kind.as_str())
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(payload.address.as_deref())
    .execute(&mut *tx)
    .await;

    if let Err(e) = inserted {
        // Two simultaneous submits can both pass the read-side check;
        // the unique (employee_id, day, type) index catches the loser.
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                let violation = match kind {
                    MarkingType::Entrada => SequenceViolation::DuplicateEntrada,
                    MarkingType::Saida => SequenceViolation::DuplicateSaida,
                };
                return Err(AppError::Validation(violation.message().to_string()));
            }
        }

        tracing::error!(error = %e, employee_id, "Failed to insert marking");
        return Err(AppError::Database(e));
    }

    let totals = timesheet::refresh_monthly_stat(&mut tx, employee_id, today).await?;

    tx.commit().await?;

    tracing::info!(
        employee_id,
        marking = kind.as_str(),
        total_hours = totals.total_hours,
        "Marking recorded"
    );

    Ok(HttpResponse::Created().json(json!({
        "message": format!("Marcação de {} registada com sucesso!", kind.as_str()),
        "month": { "total": totals.total_hours, "overtime": totals.overtime_hours },
    })))
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct TodayMarking {
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: MarkingType,

    #[schema(example = "2026-03-02T09:00:00", value_type = String, format = "date-time")]
    pub timestamp: NaiveDateTime,
}

/// Today's markings for the authenticated employee
#[utoipa::path(
    get,
    path = "/api/employee/today-markings",
    responses(
        (status = 200, description = "Markings of the current day, newest first", body = Object, example = json!({
            "markings": [{ "type": "entrada", "timestamp": "2026-03-02T09:00:00" }]
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Marcações"
)]
pub async fn today_markings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();

    let markings = sqlx::query_as::<_, TodayMarking>(
        r#"
        SELECT type, timestamp FROM markings
        WHERE employee_id = ?
        AND DATE(timestamp) = ?
        ORDER BY timestamp DESC
        "#,
    )
    .bind(auth.employee_id)
    .bind(today)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "markings": markings })))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MarkingFilter {
    #[schema(example = 7)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    #[param(example = "2026-03-01", value_type = String, format = "date")]
    /// First day to include
    pub from: Option<NaiveDate>,
    #[schema(example = "2026-03-31", value_type = String, format = "date")]
    #[param(example = "2026-03-31", value_type = String, format = "date")]
    /// Last day to include
    pub to: Option<NaiveDate>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct AdminMarking {
    #[schema(example = 101)]
    pub marking_id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "Maria Silva")]
    pub employee_name: String,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: MarkingType,

    #[schema(example = "2026-03-02T09:00:00", value_type = String, format = "date-time")]
    pub timestamp: NaiveDateTime,

    #[schema(example = 38.7223, nullable = true)]
    pub latitude: Option<f64>,

    #[schema(example = -9.1393, nullable = true)]
    pub longitude: Option<f64>,

    #[schema(example = "Av. da Liberdade 1, Lisboa", nullable = true)]
    pub location: Option<String>,
}

/// All markings grouped by day (admin)
#[utoipa::path(
    get,
    path = "/api/admin/markings",
    params(MarkingFilter),
    responses(
        (status = 200, description = "Markings grouped by calendar day", body = Object, example = json!({
            "markings": {
                "2026-03-02": [{
                    "marking_id": 101,
                    "employee_id": 7,
                    "employee_name": "Maria Silva",
                    "type": "entrada",
                    "timestamp": "2026-03-02T09:00:00",
                    "latitude": 38.7223,
                    "longitude": -9.1393,
                    "location": "Av. da Liberdade 1, Lisboa"
                }]
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn list_markings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MarkingFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND m.employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND DATE(m.timestamp) >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND DATE(m.timestamp) <= ?");
        args.push(FilterValue::Date(to));
    }

    let sql = format!(
        r#"
        SELECT
            m.id AS marking_id,
            m.employee_id,
            e.name AS employee_name,
            m.type,
            m.timestamp,
            m.latitude,
            m.longitude,
            m.location
        FROM markings m
        JOIN employees e ON e.id = m.employee_id
        {}
        ORDER BY m.timestamp DESC
        LIMIT 1000
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AdminMarking>(&sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let rows = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch markings");
        AppError::Database(e)
    })?;

    let mut grouped: BTreeMap<String, Vec<AdminMarking>> = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.timestamp.date().to_string())
            .or_default()
            .push(row);
    }

    Ok(HttpResponse::Ok().json(json!({ "markings": grouped })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_must_come_together() {
        assert!(location_ok(Some(38.7), Some(-9.1), true));
        assert!(!location_ok(Some(38.7), None, true));
        assert!(!location_ok(None, Some(-9.1), true));
        assert!(!location_ok(None, None, true));
    }

    #[test]
    fn missing_location_passes_only_when_not_required() {
        assert!(location_ok(None, None, false));
        // A lone coordinate is malformed even in permissive mode.
        assert!(!location_ok(Some(38.7), None, false));
    }
}
