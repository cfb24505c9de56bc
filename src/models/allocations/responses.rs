use super::entities::Allocation;
use crate::models::common::PaginationInfo;
use serde::Serialize;

// 分配列表响应
#[derive(Debug, Serialize)]
pub struct AllocationListResponse {
    pub items: Vec<Allocation>,
    pub pagination: PaginationInfo,
}
