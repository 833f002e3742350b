use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OnChainTxs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OnChainTxs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OnChainTxs::ArId).string().null())
                    .col(ColumnDef::new(OnChainTxs::ItemIds).text().not_null())
                    .col(ColumnDef::new(OnChainTxs::CurHeight).big_integer().not_null().default(0))
                    .col(ColumnDef::new(OnChainTxs::DataSize).big_integer().not_null().default(0))
                    .col(ColumnDef::new(OnChainTxs::Reward).string().not_null().default("0"))
                    .col(
                        ColumnDef::new(OnChainTxs::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(OnChainTxs::BlockId).string().null())
                    .col(ColumnDef::new(OnChainTxs::BlockHeight).big_integer().null())
                    .col(
                        ColumnDef::new(OnChainTxs::KafkaPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(OnChainTxs::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(OnChainTxs::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_on_chain_txs_ar_id")
                    .table(OnChainTxs::Table)
                    .col(OnChainTxs::ArId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_on_chain_txs_publication")
                    .table(OnChainTxs::Table)
                    .col(OnChainTxs::Status)
                    .col(OnChainTxs::KafkaPublished)
                    .col(OnChainTxs::BlockHeight)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OnChainTxs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OnChainTxs {
    Table,
    Id,
    ArId,
    ItemIds,
    CurHeight,
    DataSize,
    Reward,
    Status,
    BlockId,
    BlockHeight,
    KafkaPublished,
    CreatedAt,
    UpdatedAt,
}
