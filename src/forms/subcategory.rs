use bson::oid::ObjectId;
use serde::Deserialize;

use super::{optional_text, FormErrors, NAME_MIN_LEN};

/// Subcategory create/edit submission
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SubcategoryForm {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub desc: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub password: String,
}

impl SubcategoryForm {
	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::new();
		if self.name.trim().chars().count() < NAME_MIN_LEN {
			errors.add(
				"name",
				"Subcategory name must contain at least 3 characters",
			);
		}
		if self.category_id().is_none() {
			errors.add("category", "You must select a category");
		}
		errors
	}

	pub fn name(&self) -> String {
		self.name.trim().to_string()
	}

	pub fn desc(&self) -> Option<String> {
		optional_text(&self.desc)
	}

	/// The selected category, when the submitted value is a well-formed id
	pub fn category_id(&self) -> Option<ObjectId> {
		ObjectId::parse_str(self.category.trim()).ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn requires_a_category_selection() {
		let form = SubcategoryForm {
			name: "Infantry".to_string(),
			..SubcategoryForm::default()
		};
		let errors = form.validate();
		assert_eq!(errors.field("category"), Some("You must select a category"));
	}

	#[test]
	fn malformed_category_id_fails_the_selection_rule() {
		let form = SubcategoryForm {
			name: "Infantry".to_string(),
			category: "not-an-id".to_string(),
			..SubcategoryForm::default()
		};
		assert!(!form.validate().is_empty());
	}

	#[test]
	fn collects_every_violation_at_once() {
		let form = SubcategoryForm::default();
		let errors = form.validate();
		assert!(errors.field("name").is_some());
		assert!(errors.field("category").is_some());
	}

	#[test]
	fn valid_submission_passes() {
		let form = SubcategoryForm {
			name: "Infantry".to_string(),
			category: ObjectId::new().to_hex(),
			..SubcategoryForm::default()
		};
		assert!(form.validate().is_empty());
	}
}
