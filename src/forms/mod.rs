//! Typed form inputs and their validation rules.
//!
//! Each form is a plain struct deserialized from the urlencoded body with
//! every field defaulted, plus a `validate` method that collects all
//! violated rules instead of failing fast. Checks that need a store lookup
//! (category uniqueness, subcategory cross-reference) live in the views and
//! append to the same error collection before anything is rendered.

mod category;
mod product;
mod subcategory;

pub use category::CategoryForm;
pub use product::ProductForm;
pub use subcategory::SubcategoryForm;

use regex::Regex;
use std::sync::LazyLock;

/// Minimum trimmed length for every name field
pub const NAME_MIN_LEN: usize = 3;

// Price: whole units with an optional fraction of at most two digits.
static PRICE_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d{1,2}))?$").expect("PRICE_REGEX must compile"));

// http/https URLs only; host labels must not start or end with a hyphen.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^https?://[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?)*(:[0-9]{1,5})?(/[^\s?#]*)?(\?[^\s#]*)?(#[^\s]*)?$",
	)
	.expect("URL_REGEX must compile")
});

/// Field-level validation errors in submission order
#[derive(Debug, Default, Clone)]
pub struct FormErrors {
	entries: Vec<(String, String)>,
}

impl FormErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, field: &str, message: impl Into<String>) {
		self.entries.push((field.to_string(), message.into()));
	}

	pub fn merge(&mut self, other: FormErrors) {
		self.entries.extend(other.entries);
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn field(&self, field: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(f, _)| f == field)
			.map(|(_, m)| m.as_str())
	}

	/// Flat message list in the order the rules were evaluated
	pub fn messages(&self) -> Vec<String> {
		self.entries.iter().map(|(_, m)| m.clone()).collect()
	}
}

/// Parse a submitted price into integer minor units.
///
/// Empty input means "no price". At most two decimal places are accepted,
/// so the conversion to minor units is exact; anything finer is rejected
/// rather than rounded.
pub fn parse_price(raw: &str) -> Result<Option<i64>, String> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Ok(None);
	}
	let captures = PRICE_REGEX.captures(trimmed).ok_or_else(|| {
		"Price must be a non-negative amount with at most 2 decimal places".to_string()
	})?;

	let whole: i64 = captures[1]
		.parse()
		.map_err(|_| "Price is too large".to_string())?;
	let fraction = match captures.get(2) {
		Some(digits) => {
			let parsed: i64 = digits
				.as_str()
				.parse()
				.map_err(|_| "Price is too large".to_string())?;
			if digits.as_str().len() == 1 { parsed * 10 } else { parsed }
		}
		None => 0,
	};

	whole
		.checked_mul(100)
		.and_then(|minor| minor.checked_add(fraction))
		.map(Some)
		.ok_or_else(|| "Price is too large".to_string())
}

/// Parse a submitted stock count; empty input means "use the default"
pub fn parse_stock(raw: &str) -> Result<Option<i64>, String> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Ok(None);
	}
	if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
		return Err("Stock must be a non-negative whole number".to_string());
	}
	trimmed
		.parse::<i64>()
		.map(Some)
		.map_err(|_| "Stock is too large".to_string())
}

/// Validate an optional image URL field
pub fn validate_image_url(raw: &str) -> Result<Option<String>, String> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Ok(None);
	}
	if URL_REGEX.is_match(trimmed) {
		Ok(Some(trimmed.to_string()))
	} else {
		Err("Image must be a valid http or https URL".to_string())
	}
}

/// Empty form fields become `None` descriptions rather than empty strings
pub(crate) fn optional_text(raw: &str) -> Option<String> {
	let trimmed = raw.trim();
	if trimmed.is_empty() {
		None
	} else {
		Some(trimmed.to_string())
	}
}

/// Constant-time byte comparison so the admin password check does not leak
/// length-adjusted timing
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}
	let mut result = 0u8;
	for (x, y) in a.iter().zip(b.iter()) {
		result |= x ^ y;
	}
	result == 0
}

/// Check the admin password gate, appending a field error on mismatch
pub fn check_admin_password(errors: &mut FormErrors, submitted: &str, expected: &str) {
	if !constant_time_eq(submitted.as_bytes(), expected.as_bytes()) {
		errors.add("password", "Incorrect admin password");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	// =========================================================================
	// parse_price
	// =========================================================================

	#[rstest]
	#[case("20.99", Some(2099))]
	#[case("20.9", Some(2090))]
	#[case("20", Some(2000))]
	#[case("0", Some(0))]
	#[case("0.05", Some(5))]
	#[case("", None)]
	#[case("   ", None)]
	fn price_accepts_valid_amounts(#[case] raw: &str, #[case] expected: Option<i64>) {
		// Arrange + Act
		let result = parse_price(raw);

		// Assert
		assert_eq!(result.unwrap(), expected);
	}

	#[rstest]
	#[case("20.999")]
	#[case("-1")]
	#[case("-0.50")]
	#[case("abc")]
	#[case("12.")]
	#[case("1,50")]
	#[case("1e3")]
	fn price_rejects_invalid_amounts(#[case] raw: &str) {
		assert!(parse_price(raw).is_err(), "expected '{raw}' to be rejected");
	}

	#[test]
	fn price_overflow_is_an_error() {
		assert!(parse_price("92233720368547758079").is_err());
	}

	// =========================================================================
	// parse_stock
	// =========================================================================

	#[rstest]
	#[case("0", Some(0))]
	#[case("12", Some(12))]
	#[case("", None)]
	fn stock_accepts_whole_numbers(#[case] raw: &str, #[case] expected: Option<i64>) {
		assert_eq!(parse_stock(raw).unwrap(), expected);
	}

	#[rstest]
	#[case("-1")]
	#[case("1.5")]
	#[case("lots")]
	fn stock_rejects_non_integers(#[case] raw: &str) {
		assert!(parse_stock(raw).is_err());
	}

	// =========================================================================
	// image URL
	// =========================================================================

	#[rstest]
	#[case("https://img.example.com/rhino.png", true)]
	#[case("http://localhost:8080/a.jpg", true)]
	#[case("", true)]
	#[case("ftp://example.com/a.jpg", false)]
	#[case("not-a-url", false)]
	fn image_url_validation(#[case] raw: &str, #[case] ok: bool) {
		assert_eq!(validate_image_url(raw).is_ok(), ok);
	}

	// =========================================================================
	// password gate
	// =========================================================================

	#[test]
	fn password_mismatch_adds_a_field_error() {
		let mut errors = FormErrors::new();
		check_admin_password(&mut errors, "wrong", "secret");
		assert_eq!(errors.field("password"), Some("Incorrect admin password"));
	}

	#[test]
	fn password_match_adds_nothing() {
		let mut errors = FormErrors::new();
		check_admin_password(&mut errors, "secret", "secret");
		assert!(errors.is_empty());
	}

	#[test]
	fn constant_time_eq_requires_equal_lengths() {
		assert!(!constant_time_eq(b"abc", b"abcd"));
		assert!(constant_time_eq(b"abc", b"abc"));
	}
}
