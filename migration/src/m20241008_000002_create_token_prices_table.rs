use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TokenPrices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TokenPrices::Symbol).string().not_null().primary_key())
                    .col(ColumnDef::new(TokenPrices::Price).double().not_null().default(0.0))
                    .col(ColumnDef::new(TokenPrices::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TokenPrices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TokenPrices {
    Table,
    Symbol,
    Price,
    UpdatedAt,
}
