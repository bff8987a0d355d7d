use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Campaigns {
    Table,
    Id,
    AccountId,
    Name,
    AutomaticStop,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Campaigns::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Campaigns::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Campaigns::Name).string().not_null())
                    .col(
                        ColumnDef::new(Campaigns::AutomaticStop)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Campaigns::CreatedAt).date().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-campaigns-account_id")
                    .table(Campaigns::Table)
                    .col(Campaigns::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Campaigns::Table).to_owned())
            .await
    }
}
