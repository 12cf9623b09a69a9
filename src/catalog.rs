//! Display grouping: turns the flat product list into the nested
//! category → subcategory → product tree shown on the product page.

use crate::models::{Category, Product};

/// A product joined with the names of its category and (optional)
/// subcategory
#[derive(Debug, Clone)]
pub struct ResolvedProduct {
	pub product: Product,
	pub category: String,
	pub subcategory: Option<String>,
}

/// Products of one subcategory; `name` is `None` for the "no subcategory"
/// group, which always sorts first within its category
#[derive(Debug)]
pub struct SubcategoryGroup {
	pub name: Option<String>,
	pub products: Vec<Product>,
}

/// One category's slice of the display tree
#[derive(Debug)]
pub struct CategoryGroup {
	pub name: String,
	pub subcategories: Vec<SubcategoryGroup>,
}

/// Case-insensitive name ordering with the original string as tiebreak, so
/// the result is total and deterministic
fn name_key(name: &str) -> (String, String) {
	(name.to_lowercase(), name.to_string())
}

/// Group products for display.
///
/// Pure and deterministic: any permutation of the input produces the same
/// tree. Ordering rules:
/// 1. categories by name ascending, except the default category is always
///    pinned first;
/// 2. within a category, subcategory groups by name ascending with the
///    "no subcategory" group first;
/// 3. within a group, products by name ascending.
///
/// Grouping is keyed by category first, so equal subcategory names under
/// different categories never merge.
pub fn group_for_display(mut products: Vec<ResolvedProduct>) -> Vec<CategoryGroup> {
	products.sort_by(|a, b| {
		let a_key = (
			!a.category_is_default(),
			name_key(&a.category),
			a.subcategory.is_some(),
			a.subcategory.as_deref().map(name_key),
			name_key(&a.product.name),
		);
		let b_key = (
			!b.category_is_default(),
			name_key(&b.category),
			b.subcategory.is_some(),
			b.subcategory.as_deref().map(name_key),
			name_key(&b.product.name),
		);
		a_key.cmp(&b_key)
	});

	let mut groups: Vec<CategoryGroup> = Vec::new();
	for resolved in products {
		if groups.last().is_none_or(|g| g.name != resolved.category) {
			groups.push(CategoryGroup {
				name: resolved.category.clone(),
				subcategories: Vec::new(),
			});
		}
		let category = groups.last_mut().expect("group pushed above");

		if category
			.subcategories
			.last()
			.is_none_or(|s| s.name != resolved.subcategory)
		{
			category.subcategories.push(SubcategoryGroup {
				name: resolved.subcategory.clone(),
				products: Vec::new(),
			});
		}
		category
			.subcategories
			.last_mut()
			.expect("subcategory group pushed above")
			.products
			.push(resolved.product);
	}
	groups
}

impl ResolvedProduct {
	fn category_is_default(&self) -> bool {
		self.category.eq_ignore_ascii_case(Category::DEFAULT_NAME)
	}
}
