use bson::oid::ObjectId;
use serde::Deserialize;

use super::{
	optional_text, parse_price, parse_stock, validate_image_url, FormErrors, NAME_MIN_LEN,
};

/// Product create/edit submission; numeric fields arrive as the raw
/// strings the operator typed
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductForm {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub desc: String,
	#[serde(default)]
	pub image: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub subcategory: String,
	#[serde(default)]
	pub price: String,
	#[serde(default)]
	pub stock: String,
}

impl ProductForm {
	/// Field rules that need no store access. The subcategory
	/// cross-reference check needs a lookup and runs in the view.
	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::new();
		if self.name.trim().chars().count() < NAME_MIN_LEN {
			errors.add("name", "Product name must contain at least 3 characters");
		}
		if let Err(message) = parse_price(&self.price) {
			errors.add("price", message);
		}
		if let Err(message) = parse_stock(&self.stock) {
			errors.add("stock", message);
		}
		if self.category_id().is_none() {
			errors.add("category", "You must select a category");
		}
		if !self.subcategory.trim().is_empty() && self.subcategory_id().is_none() {
			errors.add("subcategory", "Chosen subcategory does not exist");
		}
		if let Err(message) = validate_image_url(&self.image) {
			errors.add("image", message);
		}
		errors
	}

	pub fn name(&self) -> String {
		self.name.trim().to_string()
	}

	pub fn desc(&self) -> Option<String> {
		optional_text(&self.desc)
	}

	pub fn image_url(&self) -> Option<String> {
		validate_image_url(&self.image).ok().flatten()
	}

	pub fn category_id(&self) -> Option<ObjectId> {
		ObjectId::parse_str(self.category.trim()).ok()
	}

	pub fn subcategory_id(&self) -> Option<ObjectId> {
		ObjectId::parse_str(self.subcategory.trim()).ok()
	}

	/// Price in minor units; `None` when the field was left empty.
	/// Only meaningful after `validate` passed.
	pub fn price_minor_units(&self) -> Option<i64> {
		parse_price(&self.price).ok().flatten()
	}

	/// Stock count; `None` when the field was left empty
	pub fn stock_units(&self) -> Option<i64> {
		parse_stock(&self.stock).ok().flatten()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn valid_form() -> ProductForm {
		ProductForm {
			name: "Combat Patrol".to_string(),
			category: ObjectId::new().to_hex(),
			price: "99.99".to_string(),
			stock: "4".to_string(),
			..ProductForm::default()
		}
	}

	#[test]
	fn valid_submission_passes() {
		assert!(valid_form().validate().is_empty());
	}

	#[test]
	fn price_converts_to_minor_units() {
		let form = ProductForm {
			price: "20.99".to_string(),
			..valid_form()
		};
		assert_eq!(form.price_minor_units(), Some(2099));
	}

	#[rstest]
	#[case("20.999", "price")]
	#[case("-5", "price")]
	fn bad_price_reports_the_field(#[case] raw: &str, #[case] field: &str) {
		let form = ProductForm {
			price: raw.to_string(),
			..valid_form()
		};
		assert!(form.validate().field(field).is_some());
	}

	#[test]
	fn empty_optionals_are_accepted() {
		let form = ProductForm {
			price: String::new(),
			stock: String::new(),
			subcategory: String::new(),
			..valid_form()
		};
		let errors = form.validate();
		assert!(errors.is_empty());
		assert_eq!(form.price_minor_units(), None);
		assert_eq!(form.stock_units(), None);
	}

	#[test]
	fn every_violation_is_collected() {
		let form = ProductForm {
			name: "ab".to_string(),
			price: "1.234".to_string(),
			stock: "-2".to_string(),
			category: String::new(),
			..ProductForm::default()
		};
		let errors = form.validate();
		assert!(errors.field("name").is_some());
		assert!(errors.field("price").is_some());
		assert!(errors.field("stock").is_some());
		assert!(errors.field("category").is_some());
	}
}
