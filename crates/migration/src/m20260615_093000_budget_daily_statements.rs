use sea_orm_migration::prelude::*;

use crate::m20260615_092000_budget_line_items::BudgetLineItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum BudgetDailyStatements {
    Table,
    BudgetId,
    Date,
    MediaSpendNano,
    DataSpendNano,
    LicenseFeeNano,
    MarginNano,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BudgetDailyStatements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetDailyStatements::BudgetId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BudgetDailyStatements::Date).date().not_null())
                    .col(
                        ColumnDef::new(BudgetDailyStatements::MediaSpendNano)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetDailyStatements::DataSpendNano)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetDailyStatements::LicenseFeeNano)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetDailyStatements::MarginNano)
                            .big_integer()
                            .not_null(),
                    )
                    // One row per (budget, date); concurrent duplicate inserts
                    // resolve to conflict-ignore instead of double-charging.
                    .primary_key(
                        Index::create()
                            .col(BudgetDailyStatements::BudgetId)
                            .col(BudgetDailyStatements::Date),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_daily_statements-budget_id")
                            .from(
                                BudgetDailyStatements::Table,
                                BudgetDailyStatements::BudgetId,
                            )
                            .to(BudgetLineItems::Table, BudgetLineItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_daily_statements-date")
                    .table(BudgetDailyStatements::Table)
                    .col(BudgetDailyStatements::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(BudgetDailyStatements::Table)
                    .to_owned(),
            )
            .await
    }
}
