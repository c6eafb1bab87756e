use sqlx::FromRow;

/// Full employees row, password hash included. Never serialized; login
/// builds its own response from the fields it needs.
#[derive(Debug, FromRow)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub password: String,
    pub role_id: u8,
    pub hour_rate: f64,
    pub active: bool,
}
