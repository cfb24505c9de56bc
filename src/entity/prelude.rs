//! 预导入模块，方便使用

pub use super::teacher_student_allocations::{
    ActiveModel as AllocationActiveModel, AllocationToAllocator, AllocationToStudent,
    AllocationToTeacher, Entity as TeacherStudentAllocations, Model as AllocationModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
