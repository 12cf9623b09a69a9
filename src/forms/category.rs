use serde::Deserialize;

use super::{optional_text, FormErrors, NAME_MIN_LEN};

/// Category create/edit submission
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CategoryForm {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub desc: String,
	#[serde(default)]
	pub password: String,
}

impl CategoryForm {
	/// Field rules that need no store access. The case-insensitive
	/// uniqueness check runs in the view and merges into the same errors.
	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::new();
		if self.name.trim().chars().count() < NAME_MIN_LEN {
			errors.add(
				"name",
				"Category name must contain at least 3 characters",
			);
		}
		errors
	}

	pub fn name(&self) -> String {
		self.name.trim().to_string()
	}

	pub fn desc(&self) -> Option<String> {
		optional_text(&self.desc)
	}
}
