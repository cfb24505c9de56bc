//! 用户实体

use sea_orm::entity::prelude::*;

use crate::models::users::entities::{UserRole, UserStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub full_name: String,
    pub hashed_password: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_active: bool,
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub student_id: Option<String>,
    pub employee_id: Option<String>,
    pub performance_score: i32,
    pub total_credits_earned: i32,
    pub profile_picture: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub date_of_birth: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub website_url: Option<String>,
    pub is_oauth_user: bool,
    pub verification_code: Option<String>,
    pub verification_expires: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

// 分配表对用户表有三条外键，导航通过 teacher_student_allocations 中的 Linked 完成
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_user(self) -> crate::models::users::entities::User {
        use crate::models::users::entities::{User, UserProfile};

        User {
            id: self.id,
            email: self.email,
            username: self.username,
            full_name: self.full_name,
            hashed_password: self.hashed_password,
            role: self.role,
            status: self.status,
            is_active: self.is_active,
            student_id: self.student_id,
            employee_id: self.employee_id,
            performance_score: self.performance_score,
            total_credits_earned: self.total_credits_earned,
            profile: UserProfile {
                phone_number: self.phone_number,
                department: self.department,
                profile_picture: self.profile_picture,
                bio: self.bio,
                date_of_birth: self.date_of_birth,
                address: self.address,
                city: self.city,
                state: self.state,
                country: self.country,
                postal_code: self.postal_code,
                linkedin_url: self.linkedin_url,
                twitter_url: self.twitter_url,
                website_url: self.website_url,
            },
            is_oauth_user: self.is_oauth_user,
            verification_code: self.verification_code,
            verification_expires: self.verification_expires,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
