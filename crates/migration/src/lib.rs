pub use sea_orm_migration::prelude::*;

mod m20260615_090000_campaigns;
mod m20260615_091000_credit_line_items;
mod m20260615_092000_budget_line_items;
mod m20260615_093000_budget_daily_statements;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260615_090000_campaigns::Migration),
            Box::new(m20260615_091000_credit_line_items::Migration),
            Box::new(m20260615_092000_budget_line_items::Migration),
            Box::new(m20260615_093000_budget_daily_statements::Migration),
        ]
    }
}
