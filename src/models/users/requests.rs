use super::entities::{UserProfile, UserRole, UserStatus};
use crate::models::common::PaginationQuery;
use serde::Deserialize;

// 用户创建请求（密码需已在调用方完成哈希）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub hashed_password: String,
    pub role: UserRole,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub is_oauth_user: bool,
    #[serde(default)]
    pub profile: UserProfile,
}

impl CreateUserRequest {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        full_name: impl Into<String>,
        hashed_password: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            full_name: full_name.into(),
            hashed_password: hashed_password.into(),
            role,
            status: None,
            student_id: None,
            employee_id: None,
            is_oauth_user: false,
            profile: UserProfile::default(),
        }
    }
}

// 用户更新请求，None 表示不修改
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub hashed_password: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub is_active: Option<bool>,
    pub student_id: Option<String>,
    pub employee_id: Option<String>,
    pub profile: Option<UserProfile>,
}

// 用户列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}
