use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::ItemId).string().not_null())
                    .col(ColumnDef::new(Orders::ApiKey).string().not_null().default(""))
                    .col(ColumnDef::new(Orders::Signer).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Orders::PaymentStatus)
                            .string_len(16)
                            .not_null()
                            .default("unpaid"),
                    )
                    .col(ColumnDef::new(Orders::PaymentId).string().null())
                    .col(ColumnDef::new(Orders::PaymentExpiredTime).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::OnChainStatus)
                            .string_len(16)
                            .not_null()
                            .default("waiting"),
                    )
                    .col(ColumnDef::new(Orders::Sort).boolean().not_null().default(false))
                    .col(ColumnDef::new(Orders::Size).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Orders::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_item_id")
                    .table(Orders::Table)
                    .col(Orders::ItemId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_api_key_id")
                    .table(Orders::Table)
                    .col(Orders::ApiKey)
                    .col(Orders::Id)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_signer_id")
                    .table(Orders::Table)
                    .col(Orders::Signer)
                    .col(Orders::Id)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Submission workers poll on these three columns
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_submission_queue")
                    .table(Orders::Table)
                    .col(Orders::PaymentStatus)
                    .col(Orders::OnChainStatus)
                    .col(Orders::Sort)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    ItemId,
    ApiKey,
    Signer,
    PaymentStatus,
    PaymentId,
    PaymentExpiredTime,
    OnChainStatus,
    Sort,
    Size,
    CreatedAt,
    UpdatedAt,
}
