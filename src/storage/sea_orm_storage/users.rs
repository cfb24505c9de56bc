use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{RegistryError, Result};
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::contains_pattern;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, ExprTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

impl SeaOrmStorage {
    /// 创建用户
    ///
    /// 未指定的 status / is_active / 累计分数使用数据库默认值，created_at 由数据库写入。
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let profile = req.profile;

        let model = ActiveModel {
            email: Set(req.email),
            username: Set(req.username),
            full_name: Set(req.full_name),
            hashed_password: Set(req.hashed_password),
            role: Set(req.role),
            status: req.status.map_or(NotSet, Set),
            student_id: Set(req.student_id),
            employee_id: Set(req.employee_id),
            is_oauth_user: Set(req.is_oauth_user),
            phone_number: Set(profile.phone_number),
            department: Set(profile.department),
            profile_picture: Set(profile.profile_picture),
            bio: Set(profile.bio),
            date_of_birth: Set(profile.date_of_birth),
            address: Set(profile.address),
            city: Set(profile.city),
            state: Set(profile.state),
            country: Set(profile.country),
            postal_code: Set(profile.postal_code),
            linkedin_url: Set(profile.linkedin_url),
            twitter_url: Set(profile.twitter_url),
            website_url: Set(profile.website_url),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("创建用户失败", e))?;

        debug!("Created user {} ({})", result.id, result.role);

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名获取用户
    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("查询用户失败", e))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Username.like(contains_pattern(search)))
                    .add(Column::Email.like(contains_pattern(search)))
                    .add(Column::FullName.like(contains_pattern(search))),
            );
        }

        // 角色筛选
        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role));
        }

        // 状态筛选
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status));
        }

        // 排序
        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| RegistryError::from_db("查询用户总数失败", e))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| RegistryError::from_db("查询用户页数失败", e))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| RegistryError::from_db("查询用户列表失败", e))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 更新用户信息
    ///
    /// updated_at 由数据库时钟写入，与 created_at 同源。
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        let mut model = <ActiveModel as Default>::default();

        if let Some(email) = update.email {
            model.email = Set(email);
        }

        if let Some(username) = update.username {
            model.username = Set(username);
        }

        if let Some(full_name) = update.full_name {
            model.full_name = Set(full_name);
        }

        if let Some(hashed_password) = update.hashed_password {
            model.hashed_password = Set(hashed_password);
        }

        if let Some(role) = update.role {
            model.role = Set(role);
        }

        if let Some(status) = update.status {
            model.status = Set(status);
        }

        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        if let Some(student_id) = update.student_id {
            model.student_id = Set(Some(student_id));
        }

        if let Some(employee_id) = update.employee_id {
            model.employee_id = Set(Some(employee_id));
        }

        // 资料整体替换
        if let Some(profile) = update.profile {
            model.phone_number = Set(profile.phone_number);
            model.department = Set(profile.department);
            model.profile_picture = Set(profile.profile_picture);
            model.bio = Set(profile.bio);
            model.date_of_birth = Set(profile.date_of_birth);
            model.address = Set(profile.address);
            model.city = Set(profile.city);
            model.state = Set(profile.state);
            model.country = Set(profile.country);
            model.postal_code = Set(profile.postal_code);
            model.linkedin_url = Set(profile.linkedin_url);
            model.twitter_url = Set(profile.twitter_url);
            model.website_url = Set(profile.website_url);
        }

        // 直接按 ID 更新，未命中即视为不存在
        let result = Users::update_many()
            .set(model)
            .col_expr(Column::UpdatedAt, Expr::current_timestamp())
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("更新用户失败", e))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get_user_by_id_impl(id).await
    }

    /// 更新用户审核状态
    pub async fn update_user_status_impl(
        &self,
        id: i64,
        status: UserStatus,
    ) -> Result<Option<User>> {
        self.update_user_impl(
            id,
            UpdateUserRequest {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// 累加学生成绩分与学分
    ///
    /// 在数据库端原子累加；用户不存在或不是学生时返回 None。
    pub async fn add_student_progress_impl(
        &self,
        id: i64,
        score_delta: i32,
        credits_delta: i32,
    ) -> Result<Option<User>> {
        let result = Users::update_many()
            .col_expr(
                Column::PerformanceScore,
                Expr::col(Column::PerformanceScore).add(score_delta),
            )
            .col_expr(
                Column::TotalCreditsEarned,
                Expr::col(Column::TotalCreditsEarned).add(credits_delta),
            )
            .col_expr(Column::UpdatedAt, Expr::current_timestamp())
            .filter(Column::Id.eq(id))
            .filter(Column::Role.eq(UserRole::Student))
            .exec(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("更新学生成绩失败", e))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get_user_by_id_impl(id).await
    }

    /// 写入密码重置验证码
    pub async fn set_verification_code_impl(
        &self,
        id: i64,
        code: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::VerificationCode, Expr::value(code))
            .col_expr(Column::VerificationExpires, Expr::value(expires_at))
            .col_expr(Column::UpdatedAt, Expr::current_timestamp())
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("写入验证码失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 清除密码重置验证码
    pub async fn clear_verification_code_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::VerificationCode, Expr::value(Option::<String>::None))
            .col_expr(
                Column::VerificationExpires,
                Expr::value(Option::<chrono::DateTime<chrono::Utc>>::None),
            )
            .col_expr(Column::UpdatedAt, Expr::current_timestamp())
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("清除验证码失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 通过邮箱与验证码获取用户，验证码过期视为不存在
    pub async fn get_user_by_verification_code_impl(
        &self,
        email: &str,
        code: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .filter(Column::VerificationCode.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("查询验证码失败", e))?;

        Ok(result
            .filter(|m| m.verification_expires.is_some_and(|expires| expires > now))
            .map(|m| m.into_user()))
    }

    /// 删除用户
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("删除用户失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("统计用户数量失败", e))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationQuery;
    use crate::models::users::entities::UserProfile;
    use sea_orm::ConnectionTrait;

    fn student(email: &str, username: &str) -> CreateUserRequest {
        let mut req = CreateUserRequest::new(
            email,
            username,
            "Test Student",
            "$argon2id$placeholder",
            UserRole::Student,
        );
        req.student_id = Some(format!("S-{username}"));
        req
    }

    #[tokio::test]
    async fn test_create_user_applies_defaults() {
        let storage = SeaOrmStorage::in_memory().await;

        let user = storage
            .create_user_impl(student("amy@school.test", "amy"))
            .await
            .unwrap();

        assert!(user.id > 0);
        assert_eq!(user.status, UserStatus::Pending);
        assert!(user.is_active);
        assert!(!user.is_oauth_user);
        assert_eq!(user.performance_score, 0);
        assert_eq!(user.total_credits_earned, 0);
        assert!(user.updated_at.is_none());

        let age = chrono::Utc::now() - user.created_at;
        assert!(age.num_seconds().abs() < 60);
    }

    #[tokio::test]
    async fn test_explicit_status_is_kept() {
        let storage = SeaOrmStorage::in_memory().await;

        let mut req = CreateUserRequest::new(
            "root@school.test",
            "root",
            "Root Admin",
            "hash",
            UserRole::Admin,
        );
        req.status = Some(UserStatus::Approved);

        let user = storage.create_user_impl(req).await.unwrap();
        assert_eq!(user.status, UserStatus::Approved);
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let storage = SeaOrmStorage::in_memory().await;
        storage
            .create_user_impl(student("dup@school.test", "first"))
            .await
            .unwrap();

        let err = storage
            .create_user_impl(student("dup@school.test", "second"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let storage = SeaOrmStorage::in_memory().await;
        storage
            .create_user_impl(student("one@school.test", "same"))
            .await
            .unwrap();

        let err = storage
            .create_user_impl(student("two@school.test", "same"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation(), "unexpected error: {err}");
        assert_eq!(storage.count_users_impl().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_role_and_status_rejected_by_database() {
        let storage = SeaOrmStorage::in_memory().await;

        let bad_role = storage
            .connection()
            .execute_unprepared(
                "INSERT INTO users (email, username, full_name, hashed_password, role) \
                 VALUES ('x@school.test', 'x', 'X', 'h', 'janitor')",
            )
            .await;
        assert!(bad_role.is_err());

        let bad_status = storage
            .connection()
            .execute_unprepared(
                "INSERT INTO users (email, username, full_name, hashed_password, role, status) \
                 VALUES ('y@school.test', 'y', 'Y', 'h', 'teacher', 'archived')",
            )
            .await;
        assert!(bad_status.is_err());

        assert_eq!(storage.count_users_impl().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lookup_by_email_username_and_identifier() {
        let storage = SeaOrmStorage::in_memory().await;
        let created = storage
            .create_user_impl(student("bo@school.test", "bo"))
            .await
            .unwrap();

        let by_email = storage.get_user_by_email_impl("bo@school.test").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));

        let by_name = storage.get_user_by_username_impl("bo").await.unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(created.id));

        let by_either = storage
            .get_user_by_username_or_email_impl("bo@school.test")
            .await
            .unwrap();
        assert_eq!(by_either.map(|u| u.id), Some(created.id));

        assert!(storage.get_user_by_id_impl(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_updated_at_set_on_update() {
        let storage = SeaOrmStorage::in_memory().await;
        let created = storage
            .create_user_impl(student("cy@school.test", "cy"))
            .await
            .unwrap();
        assert!(created.updated_at.is_none());

        let updated = storage
            .update_user_impl(
                created.id,
                UpdateUserRequest {
                    full_name: Some("Cy Renamed".into()),
                    profile: Some(UserProfile {
                        city: Some("Lyon".into()),
                        bio: Some("Likes chemistry".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.full_name, "Cy Renamed");
        assert_eq!(updated.profile.city.as_deref(), Some("Lyon"));
        assert_eq!(updated.created_at, created.created_at);
        let first_update = updated.updated_at.expect("updated_at after update");
        // 与 created_at 同取数据库时钟
        assert!(first_update >= updated.created_at);

        let approved = storage
            .update_user_status_impl(created.id, UserStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(approved.status, UserStatus::Approved);
        assert!(approved.updated_at.unwrap() >= first_update);
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let storage = SeaOrmStorage::in_memory().await;
        let result = storage
            .update_user_impl(42, UpdateUserRequest::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_deleted_user_returns_none() {
        let storage = SeaOrmStorage::in_memory().await;
        let user = storage
            .create_user_impl(student("tmp@school.test", "tmp"))
            .await
            .unwrap();
        assert!(storage.delete_user_impl(user.id).await.unwrap());

        let result = storage
            .update_user_status_impl(user.id, UserStatus::Rejected)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_unique_violation() {
        let storage = SeaOrmStorage::in_memory().await;
        storage
            .create_user_impl(student("taken@school.test", "taken"))
            .await
            .unwrap();
        let other = storage
            .create_user_impl(student("free@school.test", "free"))
            .await
            .unwrap();

        let err = storage
            .update_user_impl(
                other.id,
                UpdateUserRequest {
                    email: Some("taken@school.test".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_unique_violation(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_student_progress_accumulates() {
        let storage = SeaOrmStorage::in_memory().await;
        let pupil = storage
            .create_user_impl(student("dee@school.test", "dee"))
            .await
            .unwrap();
        let teacher = storage
            .create_user_impl(CreateUserRequest::new(
                "mr.t@school.test",
                "mr_t",
                "Mr T",
                "hash",
                UserRole::Teacher,
            ))
            .await
            .unwrap();

        storage
            .add_student_progress_impl(pupil.id, 10, 3)
            .await
            .unwrap();
        let after = storage
            .add_student_progress_impl(pupil.id, 5, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.performance_score, 15);
        assert_eq!(after.total_credits_earned, 5);
        assert!(after.updated_at.is_some());

        let not_student = storage
            .add_student_progress_impl(teacher.id, 10, 3)
            .await
            .unwrap();
        assert!(not_student.is_none());
    }

    #[tokio::test]
    async fn test_verification_code_lifecycle() {
        let storage = SeaOrmStorage::in_memory().await;
        let user = storage
            .create_user_impl(student("eve@school.test", "eve"))
            .await
            .unwrap();
        let now = chrono::Utc::now();

        assert!(
            storage
                .set_verification_code_impl(user.id, "123456", now + chrono::Duration::minutes(15))
                .await
                .unwrap()
        );

        let found = storage
            .get_user_by_verification_code_impl("eve@school.test", "123456", now)
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        let wrong_code = storage
            .get_user_by_verification_code_impl("eve@school.test", "000000", now)
            .await
            .unwrap();
        assert!(wrong_code.is_none());

        let expired = storage
            .get_user_by_verification_code_impl(
                "eve@school.test",
                "123456",
                now + chrono::Duration::hours(1),
            )
            .await
            .unwrap();
        assert!(expired.is_none());

        assert!(storage.clear_verification_code_impl(user.id).await.unwrap());
        let cleared = storage.get_user_by_id_impl(user.id).await.unwrap().unwrap();
        assert!(cleared.verification_code.is_none());
        assert!(cleared.verification_expires.is_none());
    }

    #[tokio::test]
    async fn test_list_users_filters_and_paginates() {
        let storage = SeaOrmStorage::in_memory().await;
        for i in 0..5 {
            storage
                .create_user_impl(student(&format!("s{i}@school.test"), &format!("s{i}")))
                .await
                .unwrap();
        }
        storage
            .create_user_impl(CreateUserRequest::new(
                "prof@school.test",
                "prof_x",
                "Professor X",
                "hash",
                UserRole::Teacher,
            ))
            .await
            .unwrap();

        let page = storage
            .list_users_with_pagination_impl(UserListQuery {
                pagination: PaginationQuery::new(1, 2),
                role: Some(UserRole::Student),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.items.iter().all(|u| u.is_student()));

        let teachers = storage
            .list_users_with_pagination_impl(UserListQuery {
                search: Some("Professor".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(teachers.pagination.total, 1);
        assert!(teachers.items[0].is_teacher());

        // 下划线按字面匹配而非通配符
        let literal = storage
            .list_users_with_pagination_impl(UserListQuery {
                search: Some("s_".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(literal.pagination.total, 0);

        let pending = storage
            .list_users_with_pagination_impl(UserListQuery {
                status: Some(UserStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.pagination.total, 6);
    }

    #[tokio::test]
    async fn test_list_users_with_huge_page_is_empty() {
        let storage = SeaOrmStorage::in_memory().await;
        for i in 0..3 {
            storage
                .create_user_impl(student(&format!("p{i}@school.test"), &format!("p{i}")))
                .await
                .unwrap();
        }

        let page = storage
            .list_users_with_pagination_impl(UserListQuery {
                pagination: PaginationQuery::new(i64::MAX, 100),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 1);
        assert!(page.pagination.page > 1);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let storage = SeaOrmStorage::in_memory().await;
        let user = storage
            .create_user_impl(student("gone@school.test", "gone"))
            .await
            .unwrap();

        assert!(storage.delete_user_impl(user.id).await.unwrap());
        assert!(!storage.delete_user_impl(user.id).await.unwrap());
        assert!(storage.get_user_by_id_impl(user.id).await.unwrap().is_none());
    }
}
