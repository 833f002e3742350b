use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per day; the row itself marks the day as computed
        manager
            .create_table(
                Table::create()
                    .table(OrderStatistics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderStatistics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderStatistics::Date).date().not_null())
                    .col(ColumnDef::new(OrderStatistics::Totals).big_integer().not_null().default(0))
                    .col(
                        ColumnDef::new(OrderStatistics::TotalDataSize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(OrderStatistics::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(OrderStatistics::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_statistics_date")
                    .table(OrderStatistics::Table)
                    .col(OrderStatistics::Date)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderStatistics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrderStatistics {
    Table,
    Id,
    Date,
    Totals,
    TotalDataSize,
    CreatedAt,
    UpdatedAt,
}
