use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::IdentityKey)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Firstname).string_len(100).not_null())
                    .col(ColumnDef::new(Accounts::Surname).string_len(100).not_null())
                    .col(ColumnDef::new(Accounts::Patronymic).string_len(100).null())
                    .col(ColumnDef::new(Accounts::Gender).string_len(1).not_null())
                    .col(ColumnDef::new(Accounts::Birthdate).date().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    IdentityKey,
    Firstname,
    Surname,
    Patronymic,
    Gender,
    Birthdate,
}
