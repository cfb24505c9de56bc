//! 师生分配实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teacher_student_allocations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub teacher_id: i64,
    pub student_id: i64,
    pub allocated_by: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AllocatedBy",
        to = "super::users::Column::Id",
        on_delete = "NoAction"
    )]
    AllocatedBy,
}

/// 分配记录 -> 教师
pub struct AllocationToTeacher;

impl Linked for AllocationToTeacher {
    type FromEntity = Entity;
    type ToEntity = super::users::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::Teacher.def()]
    }
}

/// 分配记录 -> 学生
pub struct AllocationToStudent;

impl Linked for AllocationToStudent {
    type FromEntity = Entity;
    type ToEntity = super::users::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::Student.def()]
    }
}

/// 分配记录 -> 执行分配的管理员
pub struct AllocationToAllocator;

impl Linked for AllocationToAllocator {
    type FromEntity = Entity;
    type ToEntity = super::users::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::AllocatedBy.def()]
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_allocation(self) -> crate::models::allocations::entities::Allocation {
        use crate::models::allocations::entities::Allocation;

        Allocation {
            id: self.id,
            teacher_id: self.teacher_id,
            student_id: self.student_id,
            allocated_by: self.allocated_by,
            created_at: self.created_at,
        }
    }
}
