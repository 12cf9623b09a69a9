use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{Collation, CollationStrength, IndexOptions};
use mongodb::{Client, Collection, IndexModel};

use crate::db::backend::{DocumentBackend, FindOptions, WriteOp};
use crate::error::{Error, Result};

/// MongoDB-backed document store.
///
/// Connection pooling is handled by the driver; a clone shares the
/// underlying client.
#[derive(Clone)]
pub struct MongoBackend {
	client: Client,
	database_name: String,
}

impl MongoBackend {
	/// Connect using a connection string and select the database
	pub async fn connect(uri: &str, database: &str) -> Result<Self> {
		let client = Client::with_uri_str(uri)
			.await
			.map_err(|e| Error::Connection(e.to_string()))?;
		Ok(Self {
			client,
			database_name: database.to_string(),
		})
	}

	fn collection(&self, name: &str) -> Collection<Document> {
		self.client.database(&self.database_name).collection(name)
	}

	fn name_collation() -> Collation {
		Collation::builder()
			.locale("en".to_string())
			.strength(CollationStrength::Secondary)
			.build()
	}
}

#[async_trait]
impl DocumentBackend for MongoBackend {
	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
		Ok(self.collection(collection).find_one(filter).await?)
	}

	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> Result<Vec<Document>> {
		let mut mongo_options = mongodb::options::FindOptions::default();
		mongo_options.sort = options.sort;

		let cursor = self
			.collection(collection)
			.find(filter)
			.with_options(mongo_options)
			.await?;

		Ok(cursor.try_collect().await?)
	}

	async fn find_one_by_name_ci(
		&self,
		collection: &str,
		name: &str,
		exclude_id: Option<ObjectId>,
	) -> Result<Option<Document>> {
		let filter = match exclude_id {
			Some(id) => bson::doc! { "name": name, "_id": { "$ne": id } },
			None => bson::doc! { "name": name },
		};
		Ok(self
			.collection(collection)
			.find_one(filter)
			.collation(Self::name_collation())
			.await?)
	}

	async fn insert_one(&self, collection: &str, document: Document) -> Result<ObjectId> {
		let result = self.collection(collection).insert_one(document).await?;
		match result.inserted_id {
			Bson::ObjectId(oid) => Ok(oid),
			other => Err(Error::Database(format!(
				"unexpected inserted id type: {other}"
			))),
		}
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<u64> {
		let result = self
			.collection(collection)
			.update_one(filter, update)
			.await?;
		Ok(result.modified_count)
	}

	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64> {
		let result = self.collection(collection).delete_one(filter).await?;
		Ok(result.deleted_count)
	}

	async fn apply_all(&self, ops: Vec<WriteOp>) -> Result<()> {
		// Transactions require a replica set or sharded cluster.
		let mut session = self
			.client
			.start_session()
			.await
			.map_err(|e| Error::Connection(format!("failed to start session: {e}")))?;

		session
			.start_transaction()
			.await
			.map_err(|e| Error::TransactionAborted(format!("failed to start transaction: {e}")))?;

		for op in &ops {
			let outcome = match op {
				WriteOp::UpdateMany {
					collection,
					filter,
					update,
				} => self
					.collection(collection)
					.update_many(filter.clone(), update.clone())
					.session(&mut session)
					.await
					.map(|_| ()),
				WriteOp::DeleteOne { collection, filter } => self
					.collection(collection)
					.delete_one(filter.clone())
					.session(&mut session)
					.await
					.map(|_| ()),
			};

			if let Err(err) = outcome {
				// Best effort: the server also aborts on session drop.
				let _ = session.abort_transaction().await;
				return Err(Error::TransactionAborted(err.to_string()));
			}
		}

		session
			.commit_transaction()
			.await
			.map_err(|e| Error::TransactionAborted(format!("commit failed: {e}")))
	}

	async fn ensure_unique_name_index(&self, collection: &str) -> Result<()> {
		let index = IndexModel::builder()
			.keys(bson::doc! { "name": 1 })
			.options(
				IndexOptions::builder()
					.unique(true)
					.collation(Self::name_collation())
					.build(),
			)
			.build();
		self.collection(collection).create_index(index).await?;
		Ok(())
	}
}
