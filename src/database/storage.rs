// region:    --- Imports
use super::StoreError;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::info;

// endregion: --- Imports

// region:    --- Local Storage Trait
/// 문자열 키/값 저장소 (브라우저 로컬 저장소와 같은 계약)
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

// endregion: --- Local Storage Trait

// region:    --- Memory Storage
/// 프로세스 메모리 저장소. 프로세스가 끝나면 사라진다.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

// endregion: --- Memory Storage

// region:    --- Sqlite Storage
const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS local_storage (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
"#;

const GET_ITEM: &str = "SELECT value FROM local_storage WHERE key = ?";

const SET_ITEM: &str = r#"
    INSERT INTO local_storage (key, value) VALUES (?, ?)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#;

const REMOVE_ITEM: &str = "DELETE FROM local_storage WHERE key = ?";

/// SQLite 파일에 보관하는 영속 저장소
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// 저장소 연결 및 테이블 생성
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // 인메모리 DB는 연결마다 별개이므로 연결을 하나로 유지한다
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!("{:<12} --> 로컬 저장소 연결: {}", "Storage", url);
        Ok(Self { pool })
    }
}

#[async_trait]
impl LocalStorage for SqliteStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>(GET_ITEM)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(SET_ITEM)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query(REMOVE_ITEM).bind(key).execute(&self.pool).await?;
        Ok(())
    }
}

// endregion: --- Sqlite Storage

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(storage: &dyn LocalStorage) {
        assert_eq!(storage.get_item("products").await.unwrap(), None);
        storage.set_item("products", "[]").await.unwrap();
        storage.set_item("products", "[1]").await.unwrap();
        assert_eq!(
            storage.get_item("products").await.unwrap().as_deref(),
            Some("[1]")
        );
        storage.remove_item("products").await.unwrap();
        assert_eq!(storage.get_item("products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_storage_round_trip() {
        exercise(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn sqlite_storage_round_trip() {
        let storage = SqliteStorage::connect("sqlite::memory:").await.unwrap();
        exercise(&storage).await;
    }
}
