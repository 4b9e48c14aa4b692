//! Migration runner behaviour against in-memory SQLite.

use modkit_db::{ConnectOpts, DbHandle};
use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

mod m001_widgets {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Widgets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Widgets::Id)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Widgets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Widgets {
        Table,
        Id,
    }
}

struct TestMigrator;

impl MigratorTrait for TestMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m001_widgets::Migration)]
    }
}

#[tokio::test]
async fn migrate_applies_once_then_reports_nothing_pending() {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .unwrap();

    assert_eq!(db.migrate::<TestMigrator>().await.unwrap(), 1);
    assert_eq!(db.migrate::<TestMigrator>().await.unwrap(), 0);

    let conn = db.sea();
    let row = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = 'widgets'",
        ))
        .await
        .unwrap()
        .unwrap();
    let n: i64 = row.try_get("", "n").unwrap();
    assert_eq!(n, 1);
}
