use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum CreditLineItems {
    Table,
    Id,
    AccountId,
    AgencyId,
    AmountNano,
    LicenseFeePpb,
    ServiceFeePpb,
    StartDate,
    EndDate,
    Status,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CreditLineItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditLineItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditLineItems::AccountId).uuid())
                    .col(ColumnDef::new(CreditLineItems::AgencyId).uuid())
                    .col(
                        ColumnDef::new(CreditLineItems::AmountNano)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditLineItems::LicenseFeePpb)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditLineItems::ServiceFeePpb)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditLineItems::StartDate).date().not_null())
                    .col(ColumnDef::new(CreditLineItems::EndDate).date().not_null())
                    .col(ColumnDef::new(CreditLineItems::Status).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-credit_line_items-account_id")
                    .table(CreditLineItems::Table)
                    .col(CreditLineItems::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CreditLineItems::Table).to_owned())
            .await
    }
}
