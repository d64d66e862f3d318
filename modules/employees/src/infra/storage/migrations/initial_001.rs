use sea_orm_migration::prelude::*;

use crate::domain::validation::{
    EMAIL_MAX, EMPLOYEE_ID_MAX, LABEL_MAX, NAME_MAX, PHONE_MAX, REGION_MAX,
};

/// Column width matching a validation limit.
fn width(max: usize) -> u32 {
    <u32 as TryFrom<usize>>::try_from(max).unwrap_or(u32::MAX)
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum People {
    Table,
    Id,
    GivenName,
    FamilyName,
    OtherName,
    Email,
    Phone,
    EmployeeId,
    Department,
    Role,
    JoinDate,
    Salary,
    DateOfBirth,
    Gender,
    State,
    Lga,
    Ward,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    Name,
    Description,
    ManagerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PersonNotes {
    Table,
    Id,
    PersonId,
    Text,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(People::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(People::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(People::GivenName).string_len(width(NAME_MAX)).not_null())
                    .col(ColumnDef::new(People::FamilyName).string_len(width(NAME_MAX)).not_null())
                    .col(ColumnDef::new(People::OtherName).string_len(width(NAME_MAX)).null())
                    .col(ColumnDef::new(People::Email).string_len(width(EMAIL_MAX)).not_null())
                    .col(ColumnDef::new(People::Phone).string_len(width(PHONE_MAX)).null())
                    .col(ColumnDef::new(People::EmployeeId).string_len(width(EMPLOYEE_ID_MAX)).null())
                    .col(ColumnDef::new(People::Department).string_len(width(LABEL_MAX)).not_null())
                    .col(ColumnDef::new(People::Role).string_len(width(LABEL_MAX)).not_null())
                    .col(ColumnDef::new(People::JoinDate).date().null())
                    .col(ColumnDef::new(People::Salary).decimal_len(10, 2).null())
                    .col(ColumnDef::new(People::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(People::Gender).string_len(10).not_null())
                    .col(ColumnDef::new(People::State).string_len(width(REGION_MAX)).not_null())
                    .col(ColumnDef::new(People::Lga).string_len(width(REGION_MAX)).not_null())
                    .col(ColumnDef::new(People::Ward).string_len(width(LABEL_MAX)).not_null())
                    .col(
                        ColumnDef::new(People::Status)
                            .string_len(20)
                            .not_null()
                            .default("Active"),
                    )
                    .col(
                        ColumnDef::new(People::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(People::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Named so unique violations can be traced back to the column on every engine.
        for (name, column) in [
            ("idx_people_email", People::Email),
            ("idx_people_employee_id", People::EmployeeId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(People::Table)
                        .col(column)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        for (name, column) in [
            ("ix_people_department", People::Department),
            ("ix_people_status", People::Status),
            ("ix_people_created_at", People::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(People::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Departments::Name).string_len(width(LABEL_MAX)).not_null())
                    .col(ColumnDef::new(Departments::Description).text().null())
                    .col(ColumnDef::new(Departments::ManagerId).uuid().null())
                    .col(
                        ColumnDef::new(Departments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Departments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departments_manager")
                            .from(Departments::Table, Departments::ManagerId)
                            .to(People::Table, People::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_departments_name")
                    .table(Departments::Table)
                    .col(Departments::Name)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PersonNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonNotes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PersonNotes::PersonId).uuid().not_null())
                    .col(ColumnDef::new(PersonNotes::Text).text().not_null())
                    .col(
                        ColumnDef::new(PersonNotes::CreatedBy)
                            .string_len(width(NAME_MAX))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonNotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonNotes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_person_notes_person")
                            .from(PersonNotes::Table, PersonNotes::PersonId)
                            .to(People::Table, People::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_person_notes_person")
                    .table(PersonNotes::Table)
                    .col(PersonNotes::PersonId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PersonNotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(People::Table).to_owned())
            .await
    }
}
