//! Typed catalog operations over the document backend.
//!
//! Everything the views persist or read goes through [`CatalogStore`]:
//! entity CRUD, the default-category guarantee, and the two cascading
//! delete workflows.

use bson::oid::ObjectId;
use bson::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::ResolvedProduct;
use crate::db::{DocumentBackend, FindOptions, WriteOp, CATEGORIES, PRODUCTS, SUBCATEGORIES};
use crate::error::{Error, Result};
use crate::models::{Category, Product, Subcategory};

/// Description given to the lazily created default category
const DEFAULT_CATEGORY_DESC: &str = "Products and subcategories without a home end up here.";

#[derive(Clone)]
pub struct CatalogStore {
	backend: Arc<dyn DocumentBackend>,
}

impl CatalogStore {
	pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
		Self { backend }
	}

	/// Create the indexes the store relies on. Idempotent; run at startup.
	pub async fn ensure_indexes(&self) -> Result<()> {
		self.backend.ensure_unique_name_index(CATEGORIES).await
	}

	fn decode<T: DeserializeOwned>(document: Document) -> Result<T> {
		Ok(bson::deserialize_from_document(document)?)
	}

	fn encode<T: Serialize>(entity: &T) -> Result<Document> {
		Ok(bson::serialize_to_document(entity)?)
	}

	fn decode_all<T: DeserializeOwned>(documents: Vec<Document>) -> Result<Vec<T>> {
		documents.into_iter().map(Self::decode).collect()
	}

	// =========================================================================
	// Categories
	// =========================================================================

	/// All categories sorted by name, with the default category pinned first
	pub async fn list_categories(&self) -> Result<Vec<Category>> {
		let documents = self
			.backend
			.find_many(CATEGORIES, bson::doc! {}, FindOptions::sorted_by("name"))
			.await?;
		let mut categories: Vec<Category> = Self::decode_all(documents)?;
		categories.sort_by_key(|c| !c.is_default());
		Ok(categories)
	}

	pub async fn get_category(&self, id: ObjectId) -> Result<Option<Category>> {
		self.backend
			.find_one(CATEGORIES, bson::doc! { "_id": id })
			.await?
			.map(Self::decode)
			.transpose()
	}

	/// Case-insensitive lookup used by the uniqueness rule; `exclude_id`
	/// skips the record being edited
	pub async fn find_category_by_name(
		&self,
		name: &str,
		exclude_id: Option<ObjectId>,
	) -> Result<Option<Category>> {
		self.backend
			.find_one_by_name_ci(CATEGORIES, name, exclude_id)
			.await?
			.map(Self::decode)
			.transpose()
	}

	pub async fn insert_category(&self, category: &Category) -> Result<ObjectId> {
		self.backend
			.insert_one(CATEGORIES, Self::encode(category)?)
			.await
	}

	pub async fn update_category(&self, id: ObjectId, category: &Category) -> Result<()> {
		let mut set = bson::doc! { "name": category.name.as_str() };
		let update = match &category.desc {
			Some(desc) => {
				set.insert("desc", desc.as_str());
				bson::doc! { "$set": set }
			}
			None => bson::doc! { "$set": set, "$unset": { "desc": "" } },
		};
		self.backend
			.update_one(CATEGORIES, bson::doc! { "_id": id }, update)
			.await?;
		Ok(())
	}

	/// Return the default category, creating it if absent.
	///
	/// Idempotent under concurrent callers: the unique name index makes at
	/// most one insert win; a loser re-reads and returns the winner's
	/// document.
	pub async fn get_or_create_default_category(&self) -> Result<Category> {
		// Case-insensitive: the unique name index is collated, so a default
		// category in any casing is THE default category.
		if let Some(existing) = self
			.backend
			.find_one_by_name_ci(CATEGORIES, Category::DEFAULT_NAME, None)
			.await?
		{
			return Self::decode(existing);
		}

		let mut category = Category::new(
			Category::DEFAULT_NAME,
			Some(DEFAULT_CATEGORY_DESC.to_string()),
		);
		match self
			.backend
			.insert_one(CATEGORIES, Self::encode(&category)?)
			.await
		{
			Ok(id) => {
				category.id = Some(id);
				Ok(category)
			}
			Err(Error::Duplicate(_)) => {
				// Lost the creation race; the winner's document is authoritative.
				self.backend
					.find_one_by_name_ci(CATEGORIES, Category::DEFAULT_NAME, None)
					.await?
					.map(Self::decode)
					.transpose()?
					.ok_or_else(|| {
						Error::Invariant("default category vanished after duplicate insert".into())
					})
			}
			Err(other) => Err(other),
		}
	}

	/// Delete a category, reassigning its subcategories and products to the
	/// default category first.
	///
	/// Runs as one unit of work: a reader either sees the category with all
	/// its references intact, or gone with every dependent reassigned.
	pub async fn delete_category(&self, id: ObjectId) -> Result<()> {
		let default = self.get_or_create_default_category().await?;
		let default_id = default
			.id
			.ok_or_else(|| Error::Invariant("default category has no id".into()))?;
		if default_id == id {
			return Err(Error::Invariant(
				"the default category cannot be deleted".into(),
			));
		}

		self.backend
			.apply_all(vec![
				WriteOp::UpdateMany {
					collection: SUBCATEGORIES,
					filter: bson::doc! { "category": id },
					update: bson::doc! { "$set": { "category": default_id } },
				},
				WriteOp::UpdateMany {
					collection: PRODUCTS,
					filter: bson::doc! { "category": id },
					update: bson::doc! { "$set": { "category": default_id } },
				},
				WriteOp::DeleteOne {
					collection: CATEGORIES,
					filter: bson::doc! { "_id": id },
				},
			])
			.await
	}

	// =========================================================================
	// Subcategories
	// =========================================================================

	pub async fn list_subcategories(&self) -> Result<Vec<Subcategory>> {
		let documents = self
			.backend
			.find_many(SUBCATEGORIES, bson::doc! {}, FindOptions::sorted_by("name"))
			.await?;
		Self::decode_all(documents)
	}

	pub async fn get_subcategory(&self, id: ObjectId) -> Result<Option<Subcategory>> {
		self.backend
			.find_one(SUBCATEGORIES, bson::doc! { "_id": id })
			.await?
			.map(Self::decode)
			.transpose()
	}

	pub async fn subcategories_of(&self, category_id: ObjectId) -> Result<Vec<Subcategory>> {
		let documents = self
			.backend
			.find_many(
				SUBCATEGORIES,
				bson::doc! { "category": category_id },
				FindOptions::sorted_by("name"),
			)
			.await?;
		Self::decode_all(documents)
	}

	pub async fn insert_subcategory(&self, subcategory: &Subcategory) -> Result<ObjectId> {
		self.backend
			.insert_one(SUBCATEGORIES, Self::encode(subcategory)?)
			.await
	}

	pub async fn update_subcategory(&self, id: ObjectId, subcategory: &Subcategory) -> Result<()> {
		let mut set = bson::doc! {
			"name": subcategory.name.as_str(),
			"category": subcategory.category,
		};
		let update = match &subcategory.desc {
			Some(desc) => {
				set.insert("desc", desc.as_str());
				bson::doc! { "$set": set }
			}
			None => bson::doc! { "$set": set, "$unset": { "desc": "" } },
		};
		self.backend
			.update_one(SUBCATEGORIES, bson::doc! { "_id": id }, update)
			.await?;
		Ok(())
	}

	/// Delete a subcategory, clearing the reference on every product that
	/// points at it. The reference is removed rather than reassigned because
	/// a product's subcategory is optional.
	pub async fn delete_subcategory(&self, id: ObjectId) -> Result<()> {
		self.backend
			.apply_all(vec![
				WriteOp::UpdateMany {
					collection: PRODUCTS,
					filter: bson::doc! { "subcategory": id },
					update: bson::doc! { "$unset": { "subcategory": "" } },
				},
				WriteOp::DeleteOne {
					collection: SUBCATEGORIES,
					filter: bson::doc! { "_id": id },
				},
			])
			.await
	}

	// =========================================================================
	// Products
	// =========================================================================

	pub async fn list_products(&self) -> Result<Vec<Product>> {
		let documents = self
			.backend
			.find_many(PRODUCTS, bson::doc! {}, FindOptions::sorted_by("name"))
			.await?;
		Self::decode_all(documents)
	}

	pub async fn get_product(&self, id: ObjectId) -> Result<Option<Product>> {
		self.backend
			.find_one(PRODUCTS, bson::doc! { "_id": id })
			.await?
			.map(Self::decode)
			.transpose()
	}

	pub async fn products_of_category(&self, category_id: ObjectId) -> Result<Vec<Product>> {
		let documents = self
			.backend
			.find_many(
				PRODUCTS,
				bson::doc! { "category": category_id },
				FindOptions::sorted_by("name"),
			)
			.await?;
		Self::decode_all(documents)
	}

	pub async fn products_of_subcategory(&self, subcategory_id: ObjectId) -> Result<Vec<Product>> {
		let documents = self
			.backend
			.find_many(
				PRODUCTS,
				bson::doc! { "subcategory": subcategory_id },
				FindOptions::sorted_by("name"),
			)
			.await?;
		Self::decode_all(documents)
	}

	pub async fn insert_product(&self, product: &Product) -> Result<ObjectId> {
		self.backend
			.insert_one(PRODUCTS, Self::encode(product)?)
			.await
	}

	pub async fn update_product(&self, id: ObjectId, product: &Product) -> Result<()> {
		let mut set = bson::doc! {
			"name": product.name.as_str(),
			"category": product.category,
			"price": product.price,
			"stock": product.stock,
		};
		let mut unset = bson::Document::new();
		match &product.desc {
			Some(desc) => {
				set.insert("desc", desc.as_str());
			}
			None => {
				unset.insert("desc", "");
			}
		}
		match &product.image {
			Some(image) => {
				set.insert("image", image.as_str());
			}
			None => {
				unset.insert("image", "");
			}
		}
		// Clearing the select on edit removes the reference entirely.
		match product.subcategory {
			Some(subcategory) => {
				set.insert("subcategory", subcategory);
			}
			None => {
				unset.insert("subcategory", "");
			}
		}

		let update = if unset.is_empty() {
			bson::doc! { "$set": set }
		} else {
			bson::doc! { "$set": set, "$unset": unset }
		};
		self.backend
			.update_one(PRODUCTS, bson::doc! { "_id": id }, update)
			.await?;
		Ok(())
	}

	pub async fn delete_product(&self, id: ObjectId) -> Result<()> {
		self.backend
			.delete_one(PRODUCTS, bson::doc! { "_id": id })
			.await?;
		Ok(())
	}

	/// All products with their category and subcategory names resolved,
	/// ready for the display grouping
	pub async fn resolved_products(&self) -> Result<Vec<ResolvedProduct>> {
		let products = self.list_products().await?;
		let categories = self.list_categories().await?;
		let subcategories = self.list_subcategories().await?;

		let category_names: std::collections::HashMap<ObjectId, String> = categories
			.into_iter()
			.filter_map(|c| c.id.map(|id| (id, c.name)))
			.collect();
		let subcategory_names: std::collections::HashMap<ObjectId, String> = subcategories
			.into_iter()
			.filter_map(|s| s.id.map(|id| (id, s.name)))
			.collect();

		products
			.into_iter()
			.map(|product| {
				let category = category_names
					.get(&product.category)
					.cloned()
					.ok_or_else(|| {
						Error::Invariant(format!(
							"product {} references a missing category",
							product.name
						))
					})?;
				let subcategory = product
					.subcategory
					.and_then(|id| subcategory_names.get(&id).cloned());
				Ok(ResolvedProduct {
					product,
					category,
					subcategory,
				})
			})
			.collect()
	}
}
