//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod allocations;
mod users;

use crate::config::DatabaseConfig;
use crate::errors::{RegistryError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 连接数据库并应用全部迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| RegistryError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 底层连接，供需要执行原始 SQL 的调用方使用
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// SQLite 专用连接（WAL + 外键约束）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| RegistryError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory");
        }

        // 内存数据库每个连接各自独立，只能保留单一且常驻的连接
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.effective_pool_size())
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.timeout))
            .connect_with(opt)
            .await
            .map_err(|e| RegistryError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.effective_pool_size())
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| RegistryError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(RegistryError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 测试用内存数据库
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        Self::connect(&DatabaseConfig::new("sqlite::memory:"))
            .await
            .expect("in-memory sqlite should open")
    }
}

// Storage trait 实现
use crate::models::{
    allocations::{
        entities::Allocation,
        requests::{AllocationListQuery, CreateAllocationRequest},
        responses::AllocationListResponse,
    },
    users::{
        entities::{User, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn update_user_status(&self, id: i64, status: UserStatus) -> Result<Option<User>> {
        self.update_user_status_impl(id, status).await
    }

    async fn add_student_progress(
        &self,
        id: i64,
        score_delta: i32,
        credits_delta: i32,
    ) -> Result<Option<User>> {
        self.add_student_progress_impl(id, score_delta, credits_delta)
            .await
    }

    async fn set_verification_code(
        &self,
        id: i64,
        code: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool> {
        self.set_verification_code_impl(id, code, expires_at).await
    }

    async fn clear_verification_code(&self, id: i64) -> Result<bool> {
        self.clear_verification_code_impl(id).await
    }

    async fn get_user_by_verification_code(
        &self,
        email: &str,
        code: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<User>> {
        self.get_user_by_verification_code_impl(email, code, now)
            .await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 师生分配模块
    async fn create_allocation(&self, allocation: CreateAllocationRequest) -> Result<Allocation> {
        self.create_allocation_impl(allocation).await
    }

    async fn get_allocation_by_id(&self, id: i64) -> Result<Option<Allocation>> {
        self.get_allocation_by_id_impl(id).await
    }

    async fn list_allocations_with_pagination(
        &self,
        query: AllocationListQuery,
    ) -> Result<AllocationListResponse> {
        self.list_allocations_with_pagination_impl(query).await
    }

    async fn list_students_for_teacher(&self, teacher_id: i64) -> Result<Vec<User>> {
        self.list_students_for_teacher_impl(teacher_id).await
    }

    async fn list_teachers_for_student(&self, student_id: i64) -> Result<Vec<User>> {
        self.list_teachers_for_student_impl(student_id).await
    }

    async fn delete_allocation(&self, id: i64) -> Result<bool> {
        self.delete_allocation_impl(id).await
    }

    async fn count_allocations(&self) -> Result<u64> {
        self.count_allocations_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("registry.db").unwrap(),
            "sqlite://registry.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/school").unwrap(),
            "postgres://u:p@localhost/school"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nowhere").is_err());
    }

    #[tokio::test]
    async fn test_create_storage_behind_trait_object() {
        let storage = crate::storage::create_storage(&DatabaseConfig::new(":memory:"))
            .await
            .unwrap();
        assert_eq!(storage.count_users().await.unwrap(), 0);
        assert_eq!(storage.count_allocations().await.unwrap(), 0);
    }
}
