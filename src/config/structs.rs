use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小，0 表示按 CPU 核数推算
    pub timeout: u64,   // 连接超时 (秒)
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 0,
            timeout: 30,
        }
    }

    /// 实际使用的连接池大小
    pub fn effective_pool_size(&self) -> u32 {
        if self.pool_size > 0 {
            self.pool_size
        } else {
            (num_cpus::get() as u32 * 2).clamp(2, 32)
        }
    }
}
