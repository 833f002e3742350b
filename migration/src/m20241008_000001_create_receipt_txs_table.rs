use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReceiptTxs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReceiptTxs::RawId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReceiptTxs::EverHash).string().not_null())
                    .col(ColumnDef::new(ReceiptTxs::Nonce).big_integer().not_null())
                    .col(ColumnDef::new(ReceiptTxs::Symbol).string().not_null())
                    .col(ColumnDef::new(ReceiptTxs::TokenTag).string().not_null())
                    .col(ColumnDef::new(ReceiptTxs::FromAddress).string().not_null())
                    .col(ColumnDef::new(ReceiptTxs::Amount).string().not_null())
                    .col(ColumnDef::new(ReceiptTxs::Data).text().not_null().default(""))
                    .col(ColumnDef::new(ReceiptTxs::Status).string_len(16).not_null())
                    .col(ColumnDef::new(ReceiptTxs::ErrMsg).text().null())
                    .col(ColumnDef::new(ReceiptTxs::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(ReceiptTxs::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_receipt_txs_status_nonce")
                    .table(ReceiptTxs::Table)
                    .col(ReceiptTxs::Status)
                    .col(ReceiptTxs::Nonce)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReceiptTxs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ReceiptTxs {
    Table,
    RawId,
    EverHash,
    Nonce,
    Symbol,
    TokenTag,
    FromAddress,
    Amount,
    Data,
    Status,
    ErrMsg,
    CreatedAt,
    UpdatedAt,
}
