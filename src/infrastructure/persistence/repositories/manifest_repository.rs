//! Repository for manifests

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::infrastructure::persistence::entities::manifests;
use crate::infrastructure::persistence::error::DbError;

#[derive(Clone, Debug)]
pub struct ManifestRepository {
    conn: DatabaseConnection,
}

impl ManifestRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(
        &self,
        manifest_url: &str,
        manifest_id: &str,
    ) -> Result<manifests::Model, DbError> {
        let model = manifests::ActiveModel {
            id: sea_orm::NotSet,
            manifest_url: Set(manifest_url.to_string()),
            manifest_id: Set(manifest_id.to_string()),
            created_at: Set(Utc::now()),
        };

        Ok(model.insert(&self.conn).await?)
    }

    /// Latest manifest id registered for a url
    pub async fn get_manifest_id(&self, manifest_url: &str) -> Result<String, DbError> {
        manifests::Entity::find()
            .filter(manifests::Column::ManifestUrl.eq(manifest_url))
            .order_by_desc(manifests::Column::Id)
            .one(&self.conn)
            .await?
            .map(|m| m.manifest_id)
            .ok_or_else(|| DbError::NotFound(format!("manifest for {}", manifest_url)))
    }

    pub async fn delete(&self, manifest_id: &str) -> Result<u64, DbError> {
        let result = manifests::Entity::delete_many()
            .filter(manifests::Column::ManifestId.eq(manifest_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
