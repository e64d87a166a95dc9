//! Document trait for typed collections
//!
//! This module provides the `Document` trait that document types implement to
//! get BSON conversion and the basic driver calls on a typed `Collection<Self>`.

use async_trait::async_trait;
use bookstore_common::{BookstoreError, Result};
use bson::{oid::ObjectId, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::Collection;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// Counts reported by an `updateOne`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Count reported by a `deleteOne`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// Core trait for stored documents
///
/// Implementing types must be Serialize + DeserializeOwned to enable automatic
/// BSON conversion.
///
/// # Example
///
/// ```ignore
/// use serde::{Deserialize, Serialize};
/// use bookstore_mongodb::Document;
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Author {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<ObjectId>,
///     name: String,
/// }
///
/// impl Document for Author {
///     const DEFAULT_COLLECTION: &'static str = "authors";
///
///     fn id(&self) -> Option<ObjectId> { self.id }
///     fn set_id(&mut self, id: ObjectId) { self.id = Some(id) }
/// }
/// ```
#[async_trait]
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Unpin + Sized {
    /// Collection name used when none is configured
    const DEFAULT_COLLECTION: &'static str;

    /// Get the document's ObjectId (if it has one)
    fn id(&self) -> Option<ObjectId>;

    /// Set the document's ObjectId
    fn set_id(&mut self, id: ObjectId);

    /// Convert document to BSON
    fn to_bson(&self) -> Result<BsonDocument> {
        bson::to_document(self).map_err(|e| BookstoreError::Serialization(e.to_string()))
    }

    /// Create document from BSON
    fn from_bson(doc: BsonDocument) -> Result<Self> {
        bson::from_document(doc).map_err(|e| BookstoreError::Deserialization(e.to_string()))
    }

    /// Find all documents matching the filter
    async fn find(collection: &Collection<Self>, filter: BsonDocument) -> Result<Vec<Self>> {
        debug!(collection = collection.name(), %filter, "find");
        let cursor = collection.find(filter).await?;
        let docs: Vec<Self> = cursor.try_collect().await?;
        Ok(docs)
    }

    /// Insert documents in one batch, assigning the generated ids back
    async fn insert_many(
        collection: &Collection<Self>,
        docs: &mut [Self],
    ) -> Result<Vec<ObjectId>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        debug!(collection = collection.name(), count = docs.len(), "insertMany");

        let result = collection.insert_many(docs.iter()).await?;

        let mut ids = Vec::with_capacity(docs.len());
        for (index, doc) in docs.iter_mut().enumerate() {
            let id = result
                .inserted_ids
                .get(&index)
                .and_then(|id| id.as_object_id())
                .ok_or_else(|| {
                    BookstoreError::MongoDB(format!("No ObjectId reported for document {}", index))
                })?;
            doc.set_id(id);
            ids.push(id);
        }
        Ok(ids)
    }

    /// Apply an update document to the first match
    async fn update_one(
        collection: &Collection<Self>,
        filter: BsonDocument,
        update: BsonDocument,
    ) -> Result<UpdateOutcome> {
        debug!(collection = collection.name(), %filter, %update, "updateOne");
        let result = collection.update_one(filter, update).await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    /// Delete the first document matching the filter
    async fn delete_one(
        collection: &Collection<Self>,
        filter: BsonDocument,
    ) -> Result<DeleteOutcome> {
        debug!(collection = collection.name(), %filter, "deleteOne");
        let result = collection.delete_one(filter).await?;
        Ok(DeleteOutcome {
            deleted: result.deleted_count,
        })
    }
}
