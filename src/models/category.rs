use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::slugify;

/// Top level of the catalog.
///
/// Exactly one category, named [`Category::DEFAULT_NAME`], acts as the
/// reassignment target for cascading deletes. It is created lazily and can
/// never be edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
	#[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
	pub id: Option<ObjectId>,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub desc: Option<String>,
}

impl Category {
	/// Name of the always-present fallback category
	pub const DEFAULT_NAME: &'static str = "Uncategorised";

	pub fn new(name: impl Into<String>, desc: Option<String>) -> Self {
		Self {
			id: None,
			name: name.into(),
			desc,
		}
	}

	pub fn slug(&self) -> String {
		slugify(&self.name)
	}

	/// Canonical URL; the id is authoritative, the slug is display-only
	pub fn url(&self) -> String {
		match &self.id {
			Some(id) => format!("/category/{}/{}", id.to_hex(), self.slug()),
			None => "/categories".to_string(),
		}
	}

	/// Case-insensitive on purpose: the unique name index is collated, so
	/// at most one casing of the default name can ever exist
	pub fn is_default(&self) -> bool {
		self.name.eq_ignore_ascii_case(Self::DEFAULT_NAME)
	}
}
