use serde::{Deserialize, Serialize};

// 师生分配记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: i64,
    pub teacher_id: i64,
    pub student_id: i64,
    pub allocated_by: i64, // 执行分配的管理员
    pub created_at: chrono::DateTime<chrono::Utc>,
}
