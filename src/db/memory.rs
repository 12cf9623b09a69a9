use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use crate::db::backend::{DocumentBackend, FindOptions, WriteOp};
use crate::error::{Error, Result};

/// In-memory document store for tests.
///
/// Mirrors the backend contract closely enough to exercise the catalog
/// logic: filter equality matching, `$set`/`$unset` updates, the
/// case-insensitive unique `name` index, and an all-or-nothing
/// `apply_all`. `fail_after_writes` injects a failure part-way through a
/// unit of work to prove nothing becomes visible.
#[derive(Default)]
pub struct MemoryBackend {
	collections: Mutex<HashMap<String, Vec<Document>>>,
	unique_name_indexes: Mutex<HashSet<String>>,
	fail_after_writes: Mutex<Option<usize>>,
}

fn doc_str<'a>(document: &'a Document, key: &str) -> Option<&'a str> {
	match document.get(key) {
		Some(Bson::String(value)) => Some(value.as_str()),
		_ => None,
	}
}

fn doc_object_id(document: &Document, key: &str) -> Option<ObjectId> {
	match document.get(key) {
		Some(Bson::ObjectId(id)) => Some(*id),
		_ => None,
	}
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make the next `apply_all` fail once `count` operations have been
	/// applied to the shadow copy
	pub async fn fail_after_writes(&self, count: usize) {
		*self.fail_after_writes.lock().await = Some(count);
	}

	fn matches(document: &Document, filter: &Document) -> bool {
		filter.iter().all(|(key, expected)| match expected {
			Bson::Document(operators) if operators.contains_key("$ne") => {
				document.get(key) != operators.get("$ne")
			}
			_ => document.get(key) == Some(expected),
		})
	}

	fn apply_update(document: &mut Document, update: &Document) {
		if let Some(Bson::Document(set)) = update.get("$set") {
			for (key, value) in set.iter() {
				document.insert(key.clone(), value.clone());
			}
		}
		if let Some(Bson::Document(unset)) = update.get("$unset") {
			for (key, _) in unset.iter() {
				document.remove(key);
			}
		}
	}

	fn bson_cmp(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
		match (a, b) {
			(Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
			(Some(Bson::Int32(x)), Some(Bson::Int32(y))) => x.cmp(y),
			(Some(Bson::Int64(x)), Some(Bson::Int64(y))) => x.cmp(y),
			(Some(_), None) => Ordering::Greater,
			(None, Some(_)) => Ordering::Less,
			_ => Ordering::Equal,
		}
	}

	fn name_conflicts(existing: &[Document], candidate: &Document) -> bool {
		let Some(name) = doc_str(candidate, "name") else {
			return false;
		};
		let candidate_id = doc_object_id(candidate, "_id");
		existing.iter().any(|doc| {
			doc_str(doc, "name").is_some_and(|other| other.eq_ignore_ascii_case(name))
				&& doc_object_id(doc, "_id") != candidate_id
		})
	}

	fn run_op(collections: &mut HashMap<String, Vec<Document>>, op: &WriteOp) {
		match op {
			WriteOp::UpdateMany {
				collection,
				filter,
				update,
			} => {
				let docs = collections.entry(collection.to_string()).or_default();
				for doc in docs.iter_mut().filter(|d| Self::matches(d, filter)) {
					Self::apply_update(doc, update);
				}
			}
			WriteOp::DeleteOne { collection, filter } => {
				let docs = collections.entry(collection.to_string()).or_default();
				if let Some(index) = docs.iter().position(|d| Self::matches(d, filter)) {
					docs.remove(index);
				}
			}
		}
	}
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
	async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
		let collections = self.collections.lock().await;
		Ok(collections
			.get(collection)
			.and_then(|docs| docs.iter().find(|d| Self::matches(d, &filter)).cloned()))
	}

	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> Result<Vec<Document>> {
		let collections = self.collections.lock().await;
		let mut results: Vec<Document> = collections
			.get(collection)
			.map(|docs| {
				docs.iter()
					.filter(|d| Self::matches(d, &filter))
					.cloned()
					.collect()
			})
			.unwrap_or_default();

		if let Some(sort) = options.sort
			&& let Some((field, direction)) = sort.iter().next()
		{
			let descending = matches!(direction, Bson::Int32(-1) | Bson::Int64(-1));
			results.sort_by(|a, b| {
				let ordering = Self::bson_cmp(a.get(field), b.get(field));
				if descending { ordering.reverse() } else { ordering }
			});
		}

		Ok(results)
	}

	async fn find_one_by_name_ci(
		&self,
		collection: &str,
		name: &str,
		exclude_id: Option<ObjectId>,
	) -> Result<Option<Document>> {
		let collections = self.collections.lock().await;
		Ok(collections.get(collection).and_then(|docs| {
			docs.iter()
				.find(|doc| {
					doc_str(doc, "name").is_some_and(|other| other.eq_ignore_ascii_case(name))
						&& (exclude_id.is_none() || doc_object_id(doc, "_id") != exclude_id)
				})
				.cloned()
		}))
	}

	async fn insert_one(&self, collection: &str, mut document: Document) -> Result<ObjectId> {
		let mut collections = self.collections.lock().await;
		let indexed = self.unique_name_indexes.lock().await.contains(collection);

		let id = match doc_object_id(&document, "_id") {
			Some(existing) => existing,
			None => {
				let id = ObjectId::new();
				document.insert("_id", id);
				id
			}
		};

		let docs = collections.entry(collection.to_string()).or_default();
		if indexed && Self::name_conflicts(docs, &document) {
			return Err(Error::Duplicate(format!("duplicate name in {collection}")));
		}
		docs.push(document);
		Ok(id)
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> Result<u64> {
		let mut collections = self.collections.lock().await;
		let docs = collections.entry(collection.to_string()).or_default();
		match docs.iter_mut().find(|d| Self::matches(d, &filter)) {
			Some(doc) => {
				Self::apply_update(doc, &update);
				Ok(1)
			}
			None => Ok(0),
		}
	}

	async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64> {
		let mut collections = self.collections.lock().await;
		let docs = collections.entry(collection.to_string()).or_default();
		match docs.iter().position(|d| Self::matches(d, &filter)) {
			Some(index) => {
				docs.remove(index);
				Ok(1)
			}
			None => Ok(0),
		}
	}

	async fn apply_all(&self, ops: Vec<WriteOp>) -> Result<()> {
		let mut collections = self.collections.lock().await;
		let fail_after = self.fail_after_writes.lock().await.take();

		// Work on a shadow copy; swap it in only when every op succeeded.
		let mut shadow = collections.clone();
		for (index, op) in ops.iter().enumerate() {
			if fail_after.is_some_and(|limit| index >= limit) {
				return Err(Error::TransactionAborted(
					"injected fault during unit of work".to_string(),
				));
			}
			Self::run_op(&mut shadow, op);
		}

		*collections = shadow;
		Ok(())
	}

	async fn ensure_unique_name_index(&self, collection: &str) -> Result<()> {
		self.unique_name_indexes
			.lock()
			.await
			.insert(collection.to_string());
		Ok(())
	}
}
