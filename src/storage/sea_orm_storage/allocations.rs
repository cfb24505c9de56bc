//! 师生分配存储操作

use super::SeaOrmStorage;
use crate::entity::teacher_student_allocations::{
    ActiveModel, AllocationToStudent, AllocationToTeacher, Column, Entity as Allocations,
};
use crate::entity::prelude::UserModel;
use crate::errors::{RegistryError, Result};
use crate::models::{
    PaginationInfo,
    allocations::{
        entities::Allocation,
        requests::{AllocationListQuery, CreateAllocationRequest},
        responses::AllocationListResponse,
    },
    users::entities::User,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashSet;
use tracing::debug;

impl SeaOrmStorage {
    /// 创建分配记录
    ///
    /// 三个用户 ID 仅由外键约束保证存在，角色是否匹配由调用方校验。
    pub async fn create_allocation_impl(
        &self,
        req: CreateAllocationRequest,
    ) -> Result<Allocation> {
        let model = ActiveModel {
            teacher_id: Set(req.teacher_id),
            student_id: Set(req.student_id),
            allocated_by: Set(req.allocated_by),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("创建分配记录失败", e))?;

        debug!(
            "Allocated student {} to teacher {} (by {})",
            result.student_id, result.teacher_id, result.allocated_by
        );

        Ok(result.into_allocation())
    }

    /// 通过 ID 获取分配记录
    pub async fn get_allocation_by_id_impl(&self, id: i64) -> Result<Option<Allocation>> {
        let result = Allocations::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("查询分配记录失败", e))?;

        Ok(result.map(|m| m.into_allocation()))
    }

    /// 分页列出分配记录
    pub async fn list_allocations_with_pagination_impl(
        &self,
        query: AllocationListQuery,
    ) -> Result<AllocationListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = Allocations::find();

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        if let Some(allocated_by) = query.allocated_by {
            select = select.filter(Column::AllocatedBy.eq(allocated_by));
        }

        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| RegistryError::from_db("查询分配总数失败", e))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| RegistryError::from_db("查询分配页数失败", e))?;

        let allocations = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| RegistryError::from_db("查询分配列表失败", e))?;

        Ok(AllocationListResponse {
            items: allocations
                .into_iter()
                .map(|m| m.into_allocation())
                .collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 列出教师名下的学生（按分配先后，去重）
    pub async fn list_students_for_teacher_impl(&self, teacher_id: i64) -> Result<Vec<User>> {
        let rows = Allocations::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::Id)
            .find_also_linked(AllocationToStudent)
            .all(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("查询教师学生失败", e))?;

        Ok(distinct_users(rows.into_iter().filter_map(|(_, user)| user)))
    }

    /// 列出学生的教师（按分配先后，去重）
    pub async fn list_teachers_for_student_impl(&self, student_id: i64) -> Result<Vec<User>> {
        let rows = Allocations::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::Id)
            .find_also_linked(AllocationToTeacher)
            .all(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("查询学生教师失败", e))?;

        Ok(distinct_users(rows.into_iter().filter_map(|(_, user)| user)))
    }

    /// 删除分配记录
    pub async fn delete_allocation_impl(&self, id: i64) -> Result<bool> {
        let result = Allocations::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("删除分配记录失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计分配数量
    pub async fn count_allocations_impl(&self) -> Result<u64> {
        let count = Allocations::find()
            .count(&self.db)
            .await
            .map_err(|e| RegistryError::from_db("统计分配数量失败", e))?;

        Ok(count)
    }
}

fn distinct_users(models: impl Iterator<Item = UserModel>) -> Vec<User> {
    let mut seen = HashSet::new();
    models
        .filter(|m| seen.insert(m.id))
        .map(|m| m.into_user())
        .collect()
}
