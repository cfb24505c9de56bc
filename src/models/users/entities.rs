use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin, // 管理员
    #[sea_orm(string_value = "teacher")]
    Teacher, // 教师
    #[sea_orm(string_value = "student")]
    Student, // 学生
}

impl UserRole {
    pub const ADMIN: &'static str = "admin";
    pub const TEACHER: &'static str = "teacher";
    pub const STUDENT: &'static str = "student";

    pub fn all_roles() -> &'static [UserRole] {
        &[Self::Admin, Self::Teacher, Self::Student]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => Self::ADMIN,
            UserRole::Teacher => Self::TEACHER,
            UserRole::Student => Self::STUDENT,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: admin, teacher, student"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::ADMIN => Ok(UserRole::Admin),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::STUDENT => Ok(UserRole::Student),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户审核状态
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, EnumIter, DeriveActiveEnum,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending, // 待审核
    #[sea_orm(string_value = "approved")]
    Approved, // 已通过
    #[sea_orm(string_value = "rejected")]
    Rejected, // 已拒绝
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Rejected => "rejected",
        }
    }
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户状态: '{s}'. 支持的状态: pending, approved, rejected"
            ))
        })
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(UserStatus::Pending),
            "approved" => Ok(UserStatus::Approved),
            "rejected" => Ok(UserStatus::Rejected),
            _ => Err(format!("Invalid user status: {s}")),
        }
    }
}

// 用户资料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub phone_number: Option<String>,
    pub department: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<chrono::DateTime<chrono::Utc>>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub website_url: Option<String>,
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub hashed_password: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_active: bool,
    pub student_id: Option<String>,
    pub employee_id: Option<String>,
    pub performance_score: i32,
    pub total_credits_earned: i32,
    pub profile: UserProfile,
    pub is_oauth_user: bool,
    #[serde(skip_serializing, default)]
    pub verification_code: Option<String>,
    #[serde(skip_serializing, default)]
    pub verification_expires: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_teacher(&self) -> bool {
        self.role == UserRole::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == UserRole::Student
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in UserRole::all_roles() {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), *role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let role: UserRole = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(role, UserRole::Teacher);

        let err = serde_json::from_str::<UserRole>("\"janitor\"").unwrap_err();
        assert!(err.to_string().contains("janitor"));
    }

    #[test]
    fn test_status_defaults_to_pending() {
        assert_eq!(UserStatus::default(), UserStatus::Pending);
        assert_eq!(serde_json::to_string(&UserStatus::Approved).unwrap(), "\"approved\"");
        assert!(serde_json::from_str::<UserStatus>("\"active\"").is_err());
    }

    #[test]
    fn test_active_enum_values() {
        assert_eq!(UserRole::Student.to_value(), "student".to_string());
        assert_eq!(
            UserStatus::try_from_value(&"rejected".to_string()).unwrap(),
            UserStatus::Rejected
        );
        assert!(UserStatus::try_from_value(&"archived".to_string()).is_err());
    }
}
