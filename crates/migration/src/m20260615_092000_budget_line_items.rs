use sea_orm_migration::prelude::*;

use crate::{
    m20260615_090000_campaigns::Campaigns, m20260615_091000_credit_line_items::CreditLineItems,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum BudgetLineItems {
    Table,
    Id,
    CreditId,
    CampaignId,
    AmountNano,
    StartDate,
    EndDate,
    MarginPpb,
    SequenceNumber,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BudgetLineItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetLineItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetLineItems::CreditId).uuid().not_null())
                    .col(
                        ColumnDef::new(BudgetLineItems::CampaignId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetLineItems::AmountNano)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BudgetLineItems::StartDate).date().not_null())
                    .col(ColumnDef::new(BudgetLineItems::EndDate).date().not_null())
                    .col(ColumnDef::new(BudgetLineItems::MarginPpb).big_integer())
                    .col(
                        ColumnDef::new(BudgetLineItems::SequenceNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_line_items-credit_id")
                            .from(BudgetLineItems::Table, BudgetLineItems::CreditId)
                            .to(CreditLineItems::Table, CreditLineItems::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_line_items-campaign_id")
                            .from(BudgetLineItems::Table, BudgetLineItems::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_line_items-campaign_id")
                    .table(BudgetLineItems::Table)
                    .col(BudgetLineItems::CampaignId)
                    .to_owned(),
            )
            .await?;

        // Waterfall precedence is a first-class property; keep it unique so
        // the allocation order is total.
        manager
            .create_index(
                Index::create()
                    .name("idx-budget_line_items-sequence_number")
                    .table(BudgetLineItems::Table)
                    .col(BudgetLineItems::SequenceNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetLineItems::Table).to_owned())
            .await
    }
}
