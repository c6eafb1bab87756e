use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Cached per-month aggregate, one row per (employee, month_start).
/// Derived data: fully recomputable from the markings table.
#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyStat {
    pub id: u64,
    pub employee_id: u64,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub total_hours: f64,
    pub overtime_hours: f64,
    pub last_updated: DateTime<Utc>,
}
