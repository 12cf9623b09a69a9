use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::slugify;

/// Sentinel stored when no price was submitted; sorts expensive and renders
/// as "no price"
pub const PRICE_UNSET: i64 = 999_999;

fn default_price() -> i64 {
	PRICE_UNSET
}

/// Leaf of the catalog.
///
/// `price` is stored in integer minor currency units to avoid float
/// rounding; `subcategory` is optional and, when present, must belong to
/// the same category as the product (enforced at form-validation time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
	#[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
	pub id: Option<ObjectId>,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub desc: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image: Option<String>,
	pub category: ObjectId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subcategory: Option<ObjectId>,
	#[serde(default = "default_price")]
	pub price: i64,
	#[serde(default)]
	pub stock: i64,
}

impl Product {
	pub fn slug(&self) -> String {
		slugify(&self.name)
	}

	pub fn url(&self) -> String {
		match &self.id {
			Some(id) => format!("/product/{}/{}", id.to_hex(), self.slug()),
			None => "/products".to_string(),
		}
	}

	/// Price in major units ("12.34"), or `None` when unset
	pub fn price_display(&self) -> Option<String> {
		if self.price == PRICE_UNSET {
			return None;
		}
		Some(format!("{}.{:02}", self.price / 100, self.price % 100))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn product(price: i64) -> Product {
		Product {
			id: None,
			name: "Combat Patrol".to_string(),
			desc: None,
			image: None,
			category: ObjectId::new(),
			subcategory: None,
			price,
			stock: 0,
		}
	}

	#[test]
	fn price_display_formats_minor_units() {
		assert_eq!(product(2099).price_display().unwrap(), "20.99");
		assert_eq!(product(500).price_display().unwrap(), "5.00");
		assert_eq!(product(5).price_display().unwrap(), "0.05");
	}

	#[test]
	fn sentinel_price_displays_as_unset() {
		assert_eq!(product(PRICE_UNSET).price_display(), None);
	}

	#[test]
	fn missing_optional_fields_deserialize_to_defaults() {
		let doc = bson::doc! { "name": "Dice", "category": ObjectId::new() };
		let product: Product = bson::deserialize_from_document(doc).unwrap();
		assert_eq!(product.price, PRICE_UNSET);
		assert_eq!(product.stock, 0);
		assert!(product.subcategory.is_none());
		assert!(product.image.is_none());
	}
}
