use std::sync::Arc;

use crate::config::DatabaseConfig;
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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 更新用户审核状态
    async fn update_user_status(&self, id: i64, status: UserStatus) -> Result<Option<User>>;
    // 累加学生成绩分与学分
    async fn add_student_progress(
        &self,
        id: i64,
        score_delta: i32,
        credits_delta: i32,
    ) -> Result<Option<User>>;
    // 写入密码重置验证码
    async fn set_verification_code(
        &self,
        id: i64,
        code: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool>;
    // 清除密码重置验证码
    async fn clear_verification_code(&self, id: i64) -> Result<bool>;
    // 通过邮箱与未过期的验证码获取用户
    async fn get_user_by_verification_code(
        &self,
        email: &str,
        code: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 师生分配方法
    // 创建分配记录
    async fn create_allocation(&self, allocation: CreateAllocationRequest) -> Result<Allocation>;
    // 通过ID获取分配记录
    async fn get_allocation_by_id(&self, id: i64) -> Result<Option<Allocation>>;
    // 列出分配记录
    async fn list_allocations_with_pagination(
        &self,
        query: AllocationListQuery,
    ) -> Result<AllocationListResponse>;
    // 列出教师名下的学生
    async fn list_students_for_teacher(&self, teacher_id: i64) -> Result<Vec<User>>;
    // 列出学生的教师
    async fn list_teachers_for_student(&self, student_id: i64) -> Result<Vec<User>>;
    // 删除分配记录
    async fn delete_allocation(&self, id: i64) -> Result<bool>;
    // 统计分配数量
    async fn count_allocations(&self) -> Result<u64>;
}

pub async fn create_storage(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::connect(config).await?;
    Ok(Arc::new(storage))
}
