use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::Document;

use crate::error::Result;

/// Query options for [`DocumentBackend::find_many`]
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
	/// Sort specification, e.g. `doc! { "name": 1 }`
	pub sort: Option<Document>,
}

impl FindOptions {
	pub fn sorted_by(field: &str) -> Self {
		let mut sort = Document::new();
		sort.insert(field, 1);
		Self { sort: Some(sort) }
	}
}

/// One mutation inside a unit of work
#[derive(Debug, Clone)]
pub enum WriteOp {
	UpdateMany {
		collection: &'static str,
		filter: Document,
		update: Document,
	},
	DeleteOne {
		collection: &'static str,
		filter: Document,
	},
}

/// Backend trait for a document-oriented store.
///
/// All catalog persistence goes through this seam so that the store logic
/// can run against MongoDB in production and an in-memory fake in tests.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
	/// Find a single document matching the filter
	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

	/// Find all documents matching the filter
	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> Result<Vec<Document>>;

	/// Case-insensitive lookup by `name`, optionally excluding one id.
	///
	/// Used for the category uniqueness rule; backed by a collation query
	/// on MongoDB and a lowercase comparison in the fake.
	async fn find_one_by_name_ci(
		&self,
		collection: &str,
		name: &str,
		exclude_id: Option<ObjectId>,
	) -> Result<Option<Document>>;

	/// Insert a document, returning its generated id
	async fn insert_one(&self, collection: &str, document: Document) -> Result<ObjectId>;

	/// Replace the fields of a single matching document with `$set` semantics
	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<u64>;

	/// Delete a single matching document, returning the deleted count
	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64>;

	/// Apply every operation or none of them.
	///
	/// This is the unit of work behind the cascading delete workflows: on
	/// MongoDB the operations run inside one session-scoped transaction
	/// that is always committed or aborted before returning; the fake
	/// applies them to a shadow copy and swaps it in atomically. Readers
	/// never observe a partially applied batch.
	async fn apply_all(&self, ops: Vec<WriteOp>) -> Result<()>;

	/// Ensure a case-insensitive unique index on the collection's `name`
	/// field. Closes the create race on the default category.
	async fn ensure_unique_name_index(&self, collection: &str) -> Result<()>;
}
