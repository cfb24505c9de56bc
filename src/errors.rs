//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 数据库约束错误（唯一、外键）按 SQL 错误类别单独归类，交由调用方决定提示语。

use sea_orm::SqlErr;
use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_registry_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum RegistryError {
            $($variant(String),)*
        }

        impl RegistryError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(RegistryError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(RegistryError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(RegistryError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl RegistryError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        RegistryError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_registry_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    UniqueViolation("E004", "Unique Constraint Violation"),
    ForeignKeyViolation("E005", "Foreign Key Violation"),
}

impl RegistryError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 按 SQL 错误类别归类数据库错误，附带操作上下文
    pub fn from_db(context: &str, err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                RegistryError::UniqueViolation(format!("{context}: {detail}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                RegistryError::ForeignKeyViolation(format!("{context}: {detail}"))
            }
            _ => RegistryError::DatabaseOperation(format!("{context}: {err}")),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, RegistryError::UniqueViolation(_))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, RegistryError::ForeignKeyViolation(_))
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for RegistryError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for RegistryError {
    fn from(err: sea_orm::DbErr) -> Self {
        RegistryError::from_db("数据库操作失败", err)
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
