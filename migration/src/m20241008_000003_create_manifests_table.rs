use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Manifests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Manifests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Manifests::ManifestUrl).text().not_null())
                    .col(ColumnDef::new(Manifests::ManifestId).string().not_null())
                    .col(ColumnDef::new(Manifests::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_manifests_manifest_id")
                    .table(Manifests::Table)
                    .col(Manifests::ManifestId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Manifests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Manifests {
    Table,
    Id,
    ManifestUrl,
    ManifestId,
    CreatedAt,
}
