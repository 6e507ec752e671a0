/// Registry queries.
///
/// Device ids are stored as the lowercase hyphenated UUID strings that
/// also feed the key derivation, so a row is usable as KDF input as-is.
use async_trait::async_trait;

use super::{Database, DeviceRegistry};
use crate::error::Result;

#[async_trait]
impl DeviceRegistry for Database {
    async fn add_device(&self, id: &str) -> Result<()> {
        sqlx::query("INSERT INTO devices (id) VALUES (?)")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    async fn device_exists(&self, id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM devices WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.is_some())
    }

    async fn delete_device(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM devices ORDER BY created_at")
            .fetch_all(self.pool())
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID_A: &str = "11111111-1111-4111-8111-111111111111";
    const ID_B: &str = "33333333-3333-4333-8333-333333333333";

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn add_then_exists() {
        let db = test_db().await;

        assert!(!db.device_exists(ID_A).await.unwrap());
        db.add_device(ID_A).await.unwrap();
        assert!(db.device_exists(ID_A).await.unwrap());
        assert!(!db.device_exists(ID_B).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_add_is_an_error() {
        let db = test_db().await;

        db.add_device(ID_A).await.unwrap();
        assert!(db.add_device(ID_A).await.is_err());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let db = test_db().await;

        db.add_device(ID_A).await.unwrap();
        db.delete_device(ID_A).await.unwrap();
        assert!(!db.device_exists(ID_A).await.unwrap());

        // deleting an absent device is not an error
        db.delete_device(ID_A).await.unwrap();
    }

    #[tokio::test]
    async fn list_returns_all_devices() {
        let db = test_db().await;

        assert!(db.list_devices().await.unwrap().is_empty());

        db.add_device(ID_A).await.unwrap();
        db.add_device(ID_B).await.unwrap();

        let devices = db.list_devices().await.unwrap();
        assert_eq!(devices.len(), 2);
        assert!(devices.contains(&ID_A.to_string()));
        assert!(devices.contains(&ID_B.to_string()));
    }
}
