use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

// Connection cap stays low; the hosted MySQL tier refuses more than a
// handful of simultaneous connections.
pub async fn init_db(database_url: &str) -> MySqlPool {
    MySqlPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .expect("Failed to connect to database")
}
