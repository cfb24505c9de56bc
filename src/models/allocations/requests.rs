use crate::models::common::PaginationQuery;
use serde::Deserialize;

// 创建分配请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAllocationRequest {
    pub teacher_id: i64,
    pub student_id: i64,
    pub allocated_by: i64,
}

// 分配列表查询参数（用于存储层）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocationListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub teacher_id: Option<i64>,
    pub student_id: Option<i64>,
    pub allocated_by: Option<i64>,
}
