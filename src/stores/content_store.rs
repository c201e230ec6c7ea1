use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};

use crate::errors::InternalError;
use crate::types::db::achievement_document;
use crate::types::internal::achievement::AchievementContent;

/// Generate an opaque 24-hex-character content id
///
/// Four bytes of big-endian unix seconds followed by eight random bytes, so
/// ids sort roughly by creation time.
pub fn new_content_id() -> String {
    let seconds = Utc::now().timestamp() as u32;
    let tail: [u8; 8] = rand::rng().random();

    let mut id = format!("{:08x}", seconds);
    id.extend(tail.iter().map(|b| format!("{:02x}", b)));
    id
}

/// Whether a string has the shape of a content id
pub fn is_content_id(value: &str) -> bool {
    value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Document store for achievement content
///
/// Each achievement is one JSON document; the lifecycle status lives in the
/// ledger and is never written here.
pub struct ContentStore {}

impl ContentStore {
    pub fn new() -> Self {
        Self {}
    }

    fn to_row(content: &AchievementContent) -> Result<achievement_document::ActiveModel, InternalError> {
        let document = serde_json::to_string(content)
            .map_err(|e| InternalError::parse("achievement document", e.to_string()))?;

        Ok(achievement_document::ActiveModel {
            id: Set(content.id.clone()),
            student_id: Set(content.student_id.clone()),
            achievement_type: Set(content.achievement_type.to_string()),
            document: Set(document),
            created_at: Set(content.created_at.timestamp()),
            updated_at: Set(content.updated_at.timestamp()),
        })
    }

    fn from_row(row: achievement_document::Model) -> Result<AchievementContent, InternalError> {
        serde_json::from_str(&row.document).map_err(|e| {
            InternalError::parse("achievement document", format!("{}: {}", row.id, e))
        })
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        content: &AchievementContent,
    ) -> Result<(), InternalError> {
        Self::to_row(content)?
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_achievement_document", e))?;
        Ok(())
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
    ) -> Result<Option<AchievementContent>, InternalError> {
        achievement_document::Entity::find_by_id(id.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_achievement_document", e))?
            .map(Self::from_row)
            .transpose()
    }

    /// Fetch a batch of documents; missing ids are simply absent from the result
    pub async fn find_by_ids(
        &self,
        conn: &impl ConnectionTrait,
        ids: &[String],
    ) -> Result<Vec<AchievementContent>, InternalError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        achievement_document::Entity::find()
            .filter(achievement_document::Column::Id.is_in(ids.iter().cloned()))
            .all(conn)
            .await
            .map_err(|e| InternalError::database("find_achievement_documents", e))?
            .into_iter()
            .map(Self::from_row)
            .collect()
    }

    /// Overwrite a document with new content
    pub async fn replace(
        &self,
        conn: &impl ConnectionTrait,
        content: &AchievementContent,
    ) -> Result<(), InternalError> {
        Self::to_row(content)?
            .update(conn)
            .await
            .map_err(|e| InternalError::database("replace_achievement_document", e))?;
        Ok(())
    }

    /// Remove a document; returns false if it did not exist
    pub async fn delete(&self, conn: &impl ConnectionTrait, id: &str) -> Result<bool, InternalError> {
        let result = achievement_document::Entity::delete_by_id(id.to_owned())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_achievement_document", e))?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list_ids(&self, conn: &impl ConnectionTrait) -> Result<Vec<String>, InternalError> {
        achievement_document::Entity::find()
            .select_only()
            .column(achievement_document::Column::Id)
            .into_tuple::<String>()
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_achievement_document_ids", e))
    }

    pub async fn count(&self, conn: &impl ConnectionTrait) -> Result<u64, InternalError> {
        achievement_document::Entity::find()
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_achievement_documents", e))
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}
