use actix_web::{HttpResponse, web};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::errors::AppError;
use crate::model::monthly_stat::MonthlyStat;
use crate::timesheet::{self, ClockEvent};

/// Cached month totals for the authenticated employee
#[utoipa::path(
    get,
    path = "/api/employee/monthly-stats",
    responses(
        (status = 200, description = "Current month totals", body = Object, example = json!({
            "total_hours": 42.5,
            "overtime_hours": 0.0
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Estatísticas"
)]
pub async fn monthly_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let (month_start, _) = timesheet::month_bounds(Local::now().date_naive());

    let stat = fetch_monthly_stat(pool.get_ref(), auth.employee_id, month_start).await?;

    match stat {
        Some(s) => Ok(HttpResponse::Ok().json(json!({
            "total_hours": s.total_hours,
            "overtime_hours": s.overtime_hours,
        }))),
        None => Ok(HttpResponse::Ok().json(json!({ "total_hours": 0 }))),
    }
}

/// Dashboard stats for the authenticated employee
#[utoipa::path(
    get,
    path = "/api/employee/stats",
    responses(
        (status = 200, description = "Today/week/month summary", body = Object, example = json!({
            "todayHours": "07:30",
            "weekHours": "32:10",
            "monthHours": "120:45",
            "overtime": "00:00",
            "daysUntilPayday": 12
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Estatísticas"
)]
pub async fn stats(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<HttpResponse, AppError> {
    let employee_id = auth.employee_id;
    let today = Local::now().date_naive();

    let day_start = today.and_hms_opt(0, 0, 0).unwrap();
    let week_start = today
        .week(Weekday::Mon)
        .first_day()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    // Today and week are recomputed live; only the month is cached.
    let today_events = fetch_events_since(pool.get_ref(), employee_id, day_start).await?;
    let week_events = fetch_events_since(pool.get_ref(), employee_id, week_start).await?;

    let today_hours = format_hhmm_ms(timesheet::paired_duration_ms(&today_events));
    let week_hours = format_hhmm_ms(timesheet::paired_duration_ms(&week_events));

    let (month_start, _) = timesheet::month_bounds(today);
    let stat = fetch_monthly_stat(pool.get_ref(), employee_id, month_start).await?;

    let (month_hours, overtime) = match stat {
        Some(s) => (
            format_hhmm_hours(s.total_hours),
            format_hhmm_hours(s.overtime_hours),
        ),
        None => ("00:00".to_string(), "00:00".to_string()),
    };

    Ok(HttpResponse::Ok().json(json!({
        "todayHours": today_hours,
        "weekHours": week_hours,
        "monthHours": month_hours,
        "overtime": overtime,
        "daysUntilPayday": days_until_payday(today),
    })))
}

async fn fetch_events_since(
    pool: &MySqlPool,
    employee_id: u64,
    since: chrono::NaiveDateTime,
) -> Result<Vec<ClockEvent>, sqlx::Error> {
    sqlx::query_as::<_, ClockEvent>(
        r#"
        SELECT type, timestamp FROM markings
        WHERE employee_id = ?
        AND timestamp >= ?
        ORDER BY timestamp ASC
        "#,
    )
    .bind(employee_id)
    .bind(since)
    .fetch_all(pool)
    .await
}

async fn fetch_monthly_stat(
    pool: &MySqlPool,
    employee_id: u64,
    month_start: NaiveDate,
) -> Result<Option<MonthlyStat>, sqlx::Error> {
    sqlx::query_as::<_, MonthlyStat>(
        r#"
        SELECT id, employee_id, month_start, month_end,
               total_hours, overtime_hours, last_updated
        FROM employee_monthly_stats
        WHERE employee_id = ? AND month_start = ?
        "#,
    )
    .bind(employee_id)
    .bind(month_start)
    .fetch_optional(pool)
    .await
}

fn format_hhmm_ms(ms: i64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    format!("{:02}:{:02}", hours, minutes)
}

fn format_hhmm_hours(hours: f64) -> String {
    let h = hours.floor() as i64;
    let m = ((hours % 1.0) * 60.0).round() as i64;
    format!("{:02}:{:02}", h, m)
}

/// Payday sits on the month's 30th slot (first day + 29), rolling to
/// the next month once it has passed.
fn days_until_payday(today: NaiveDate) -> i64 {
    let month_start = today.with_day(1).unwrap();
    let mut payday = month_start + Duration::days(29);

    if today > payday {
        let (_, month_end) = timesheet::month_bounds(today);
        payday = month_end + Duration::days(30);
    }

    (payday - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_milliseconds_as_hhmm() {
        assert_eq!(format_hhmm_ms(0), "00:00");
        // 7h30m
        assert_eq!(format_hhmm_ms(27_000_000), "07:30");
        // 123h05m
        assert_eq!(format_hhmm_ms(443_100_000), "123:05");
    }

    #[test]
    fn formats_decimal_hours_as_hhmm() {
        assert_eq!(format_hhmm_hours(0.0), "00:00");
        assert_eq!(format_hhmm_hours(8.0), "08:00");
        assert_eq!(format_hhmm_hours(120.75), "120:45");
        assert_eq!(format_hhmm_hours(7.34), "07:20");
    }

    #[test]
    fn payday_counts_down_within_the_month() {
        let today: NaiveDate = "2026-03-10".parse().unwrap();
        assert_eq!(days_until_payday(today), 20);

        let payday: NaiveDate = "2026-03-30".parse().unwrap();
        assert_eq!(days_until_payday(payday), 0);
    }

    #[test]
    fn payday_rolls_to_the_next_month_once_passed() {
        let today: NaiveDate = "2026-03-31".parse().unwrap();
        assert_eq!(days_until_payday(today), 30);
    }
}
