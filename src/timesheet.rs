use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::MySqlConnection;

use crate::model::marking::MarkingType;

/// Flat monthly baseline; everything beyond it counts as overtime.
pub const MONTHLY_BASELINE_HOURS: f64 = 160.0;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthTotals {
    pub total_hours: f64,
    pub overtime_hours: f64,
}

/// A marking reduced to what the pairing walk needs.
#[derive(Debug, sqlx::FromRow)]
pub struct ClockEvent {
    #[sqlx(rename = "type")]
    pub kind: MarkingType,
    pub timestamp: NaiveDateTime,
}

pub fn round2(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Sums completed entrada→saida pairs, in milliseconds.
///
/// A second entrada overwrites the pending one and a saida without a
/// pending entrada is ignored. The write-side sequencing rule makes
/// both cases unreachable for new data, but the walk must not fail on
/// rows that predate it.
pub fn paired_duration_ms(events: &[ClockEvent]) -> i64 {
    let mut total_ms: i64 = 0;
    let mut pending: Option<NaiveDateTime> = None;

    for event in events {
        match event.kind {
            MarkingType::Entrada => pending = Some(event.timestamp),
            MarkingType::Saida => {
                if let Some(entrada) = pending.take() {
                    total_ms += (event.timestamp - entrada).num_milliseconds();
                }
            }
        }
    }

    total_ms
}

/// Totals for one month of events, rounded to 2 decimal places.
pub fn month_totals(events: &[ClockEvent]) -> MonthTotals {
    let total_hours = round2(paired_duration_ms(events) as f64 / 3_600_000.0);
    let overtime_hours = round2((total_hours - MONTHLY_BASELINE_HOURS).max(0.0));

    MonthTotals {
        total_hours,
        overtime_hours,
    }
}

/// Inclusive [first day, last day] of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day.with_day(1).unwrap();
    let next_start = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1).unwrap()
    };

    (start, next_start.pred_opt().unwrap())
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SequenceViolation {
    DuplicateEntrada,
    MissingEntrada,
    DuplicateSaida,
}

impl SequenceViolation {
    pub fn message(&self) -> &'static str {
        match self {
            SequenceViolation::DuplicateEntrada => "Já marcaste entrada hoje!",
            SequenceViolation::MissingEntrada => "Ainda não marcaste entrada hoje!",
            SequenceViolation::DuplicateSaida => "Já marcaste saída hoje!",
        }
    }
}

/// One entrada and one saida per calendar day, entrada first.
pub fn check_day_sequence(
    today: &[MarkingType],
    next: MarkingType,
) -> Result<(), SequenceViolation> {
    let has_entrada = today.iter().any(|t| *t == MarkingType::Entrada);
    let has_saida = today.iter().any(|t| *t == MarkingType::Saida);

    match next {
        MarkingType::Entrada if has_entrada => Err(SequenceViolation::DuplicateEntrada),
        MarkingType::Saida if !has_entrada => Err(SequenceViolation::MissingEntrada),
        MarkingType::Saida if has_saida => Err(SequenceViolation::DuplicateSaida),
        _ => Ok(()),
    }
}

/// Pairing walk over the stored markings of one employee for one
/// month. Pure function of the stored rows; recomputing from the same
/// data always yields the same totals.
pub async fn compute_monthly_hours(
    conn: &mut MySqlConnection,
    employee_id: u64,
    month_start: NaiveDate,
    month_end: NaiveDate,
) -> Result<MonthTotals, sqlx::Error> {
    let events = sqlx::query_as::<_, ClockEvent>(
        r#"
        SELECT type, timestamp
        FROM markings
        WHERE employee_id = ?
        AND DATE(timestamp) BETWEEN ? AND ?
        ORDER BY timestamp ASC
        "#,
    )
    .bind(employee_id)
    .bind(month_start)
    .bind(month_end)
    .fetch_all(&mut *conn)
    .await?;

    Ok(month_totals(&events))
}

/// Recomputes the month containing `today` from raw markings and
/// writes the cached row in one atomic statement.
pub async fn refresh_monthly_stat(
    conn: &mut MySqlConnection,
    employee_id: u64,
    today: NaiveDate,
) -> Result<MonthTotals, sqlx::Error> {
    let (month_start, month_end) = month_bounds(today);
    let totals = compute_monthly_hours(conn, employee_id, month_start, month_end).await?;

    sqlx::query(
        r#"
        INSERT INTO employee_monthly_stats
            (employee_id, month_start, month_end, total_hours, overtime_hours)
        VALUES (?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            total_hours = VALUES(total_hours),
            overtime_hours = VALUES(overtime_hours),
            last_updated = NOW()
        "#,
    )
    .bind(employee_id)
    .bind(month_start)
    .bind(month_end)
    .bind(totals.total_hours)
    .bind(totals.overtime_hours)
    .execute(&mut *conn)
    .await?;

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use MarkingType::{Entrada, Saida};

    fn ev(kind: MarkingType, timestamp: &str) -> ClockEvent {
        ClockEvent {
            kind,
            timestamp: timestamp.parse().unwrap(),
        }
    }

    #[test]
    fn eight_hour_day() {
        let events = vec![
            ev(Entrada, "2026-03-02T09:00:00"),
            ev(Saida, "2026-03-02T17:00:00"),
        ];
        let totals = month_totals(&events);
        assert_eq!(totals.total_hours, 8.00);
        assert_eq!(totals.overtime_hours, 0.00);
    }

    #[test]
    fn partial_hours_round_to_two_decimals() {
        // 7h20m30s = 7.341666... hours
        let events = vec![
            ev(Entrada, "2026-03-02T09:00:00"),
            ev(Saida, "2026-03-02T16:20:30"),
        ];
        assert_eq!(month_totals(&events).total_hours, 7.34);
    }

    #[test]
    fn one_hundred_seventy_hours_yields_ten_overtime() {
        // 17 working days of 10h each.
        let mut events = Vec::new();
        for day in 1..=17 {
            events.push(ev(Entrada, &format!("2026-03-{:02}T08:00:00", day)));
            events.push(ev(Saida, &format!("2026-03-{:02}T18:00:00", day)));
        }
        let totals = month_totals(&events);
        assert_eq!(totals.total_hours, 170.00);
        assert_eq!(totals.overtime_hours, 10.00);
    }

    #[test]
    fn empty_month_is_zero() {
        let totals = month_totals(&[]);
        assert_eq!(totals.total_hours, 0.00);
        assert_eq!(totals.overtime_hours, 0.00);
    }

    #[test]
    fn trailing_entrada_contributes_nothing() {
        let events = vec![
            ev(Entrada, "2026-03-02T09:00:00"),
            ev(Saida, "2026-03-02T17:00:00"),
            ev(Entrada, "2026-03-03T09:00:00"),
        ];
        assert_eq!(month_totals(&events).total_hours, 8.00);
    }

    #[test]
    fn orphan_saida_is_ignored() {
        let events = vec![
            ev(Saida, "2026-03-02T17:00:00"),
            ev(Entrada, "2026-03-03T09:00:00"),
            ev(Saida, "2026-03-03T13:00:00"),
        ];
        assert_eq!(month_totals(&events).total_hours, 4.00);
    }

    #[test]
    fn repeated_entrada_keeps_the_latest() {
        let events = vec![
            ev(Entrada, "2026-03-02T08:00:00"),
            ev(Entrada, "2026-03-02T10:00:00"),
            ev(Saida, "2026-03-02T12:00:00"),
        ];
        assert_eq!(month_totals(&events).total_hours, 2.00);
    }

    #[test]
    fn recompute_is_idempotent() {
        let events = vec![
            ev(Entrada, "2026-03-02T09:12:00"),
            ev(Saida, "2026-03-02T18:47:00"),
            ev(Entrada, "2026-03-03T08:30:00"),
            ev(Saida, "2026-03-03T17:05:00"),
        ];
        let first = month_totals(&events);
        let second = month_totals(&events);
        assert_eq!(first.total_hours, second.total_hours);
        assert_eq!(first.overtime_hours, second.overtime_hours);
    }

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (start, end) = month_bounds("2026-02-14".parse().unwrap());
        assert_eq!(start, "2026-02-01".parse::<NaiveDate>().unwrap());
        assert_eq!(end, "2026-02-28".parse::<NaiveDate>().unwrap());

        let (start, end) = month_bounds("2026-12-31".parse().unwrap());
        assert_eq!(start, "2026-12-01".parse::<NaiveDate>().unwrap());
        assert_eq!(end, "2026-12-31".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn first_marking_of_the_day_must_be_entrada() {
        assert_eq!(check_day_sequence(&[], Entrada), Ok(()));
        assert_eq!(
            check_day_sequence(&[], Saida),
            Err(SequenceViolation::MissingEntrada)
        );
    }

    #[test]
    fn second_entrada_is_rejected() {
        assert_eq!(
            check_day_sequence(&[Entrada], Entrada),
            Err(SequenceViolation::DuplicateEntrada)
        );
    }

    #[test]
    fn saida_closes_the_day() {
        assert_eq!(check_day_sequence(&[Entrada], Saida), Ok(()));
        assert_eq!(
            check_day_sequence(&[Entrada, Saida], Saida),
            Err(SequenceViolation::DuplicateSaida)
        );
        assert_eq!(
            check_day_sequence(&[Entrada, Saida], Entrada),
            Err(SequenceViolation::DuplicateEntrada)
        );
    }
}
