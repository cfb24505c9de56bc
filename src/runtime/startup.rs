use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 记录当前数据规模
async fn report_counts(storage: &Arc<dyn Storage>) {
    match (storage.count_users().await, storage.count_allocations().await) {
        (Ok(users), Ok(allocations)) => {
            info!(
                "Registry holds {} user(s) and {} teacher-student allocation(s)",
                users, allocations
            );
            if users == 0 {
                warn!("No users found in database; accounts are created by the application layer");
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to count registry rows: {}", e);
        }
    }
}

/// 连接数据库、应用迁移并返回共享的存储句柄
pub async fn prepare_storage(config: &DatabaseConfig) -> Result<StartupContext> {
    let storage = crate::storage::create_storage(config).await?;
    warn!("Storage backend initialized and migrations completed");

    report_counts(&storage).await;

    Ok(StartupContext { storage })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_storage_on_memory_database() {
        let context = prepare_storage(&DatabaseConfig::new(":memory:"))
            .await
            .unwrap();
        assert_eq!(context.storage.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prepare_storage_rejects_unknown_scheme() {
        let result = prepare_storage(&DatabaseConfig::new("redis://localhost")).await;
        let err = result.err().expect("unknown scheme should fail");
        assert_eq!(err.code(), "E001");
    }
}
