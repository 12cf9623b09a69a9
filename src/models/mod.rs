//! Catalog entities and their derived display fields.
//!
//! Slugs and URLs are computed from the stored fields on every read and are
//! never persisted.

mod category;
mod product;
mod subcategory;

pub use category::Category;
pub use product::{Product, PRICE_UNSET};
pub use subcategory::Subcategory;

/// URL-safe lowercase form of a display name: alphanumerics kept
/// (lowercased), every other run of characters collapsed to one hyphen.
pub fn slugify(name: &str) -> String {
	let mut slug = String::with_capacity(name.len());
	let mut pending_hyphen = false;
	for ch in name.chars() {
		if ch.is_alphanumeric() {
			if pending_hyphen && !slug.is_empty() {
				slug.push('-');
			}
			pending_hyphen = false;
			for lower in ch.to_lowercase() {
				slug.push(lower);
			}
		} else {
			pending_hyphen = true;
		}
	}
	slug
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("Space Marines", "space-marines")]
	#[case("Uncategorised", "uncategorised")]
	#[case("  Trim Me  ", "trim-me")]
	#[case("Orks & Gretchin", "orks-gretchin")]
	#[case("T'au Empire", "t-au-empire")]
	#[case("40,000", "40-000")]
	#[case("ALLCAPS", "allcaps")]
	fn slugify_cases(#[case] name: &str, #[case] expected: &str) {
		assert_eq!(slugify(name), expected);
	}
}
