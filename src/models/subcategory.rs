use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::slugify;

/// Middle level of the catalog; always belongs to a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
	#[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
	pub id: Option<ObjectId>,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub desc: Option<String>,
	pub category: ObjectId,
}

impl Subcategory {
	pub fn slug(&self) -> String {
		slugify(&self.name)
	}

	pub fn url(&self) -> String {
		match &self.id {
			Some(id) => format!("/subcategory/{}/{}", id.to_hex(), self.slug()),
			None => "/subcategories".to_string(),
		}
	}
}
