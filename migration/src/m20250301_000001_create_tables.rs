use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const USER_ROLES: [&str; 3] = ["admin", "teacher", "student"];
const USER_STATUSES: [&str; 3] = ["pending", "approved", "rejected"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::HashedPassword).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .check(Expr::col(Users::Role).is_in(USER_ROLES)),
                    )
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending")
                            .check(Expr::col(Users::Status).is_in(USER_STATUSES)),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::PhoneNumber).string().null())
                    .col(ColumnDef::new(Users::Department).string().null())
                    // 学生学号 / 教职工号
                    .col(ColumnDef::new(Users::StudentId).string().null())
                    .col(ColumnDef::new(Users::EmployeeId).string().null())
                    .col(
                        ColumnDef::new(Users::PerformanceScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::TotalCreditsEarned)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    // 个人资料
                    .col(ColumnDef::new(Users::ProfilePicture).string().null())
                    .col(ColumnDef::new(Users::Bio).text().null())
                    .col(
                        ColumnDef::new(Users::DateOfBirth)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Users::Address).text().null())
                    .col(ColumnDef::new(Users::City).string().null())
                    .col(ColumnDef::new(Users::State).string().null())
                    .col(ColumnDef::new(Users::Country).string().null())
                    .col(ColumnDef::new(Users::PostalCode).string().null())
                    .col(ColumnDef::new(Users::LinkedinUrl).string().null())
                    .col(ColumnDef::new(Users::TwitterUrl).string().null())
                    .col(ColumnDef::new(Users::WebsiteUrl).string().null())
                    // OAuth 与验证码
                    .col(
                        ColumnDef::new(Users::IsOauthUser)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::VerificationCode).string().null())
                    .col(
                        ColumnDef::new(Users::VerificationExpires)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建师生分配表
        manager
            .create_table(
                Table::create()
                    .table(TeacherStudentAllocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeacherStudentAllocations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TeacherStudentAllocations::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherStudentAllocations::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherStudentAllocations::AllocatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherStudentAllocations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allocations_teacher")
                            .from(
                                TeacherStudentAllocations::Table,
                                TeacherStudentAllocations::TeacherId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allocations_student")
                            .from(
                                TeacherStudentAllocations::Table,
                                TeacherStudentAllocations::StudentId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // 分配记录需保留操作者，存在分配记录的管理员不可删除
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allocations_allocated_by")
                            .from(
                                TeacherStudentAllocations::Table,
                                TeacherStudentAllocations::AllocatedBy,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_allocations_teacher_id")
                    .table(TeacherStudentAllocations::Table)
                    .col(TeacherStudentAllocations::TeacherId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_allocations_student_id")
                    .table(TeacherStudentAllocations::Table)
                    .col(TeacherStudentAllocations::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(
                Table::drop()
                    .table(TeacherStudentAllocations::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Email,
    Username,
    FullName,
    HashedPassword,
    Role,
    Status,
    IsActive,
    PhoneNumber,
    Department,
    StudentId,
    EmployeeId,
    PerformanceScore,
    TotalCreditsEarned,
    ProfilePicture,
    Bio,
    DateOfBirth,
    Address,
    City,
    State,
    Country,
    PostalCode,
    LinkedinUrl,
    TwitterUrl,
    WebsiteUrl,
    IsOauthUser,
    VerificationCode,
    VerificationExpires,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeacherStudentAllocations {
    #[sea_orm(iden = "teacher_student_allocations")]
    Table,
    Id,
    TeacherId,
    StudentId,
    AllocatedBy,
    CreatedAt,
}
