use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// HTTP request representation handed to views.
///
/// Built from hyper parts by the server; `path_params` is filled in by the
/// router when a pattern with `{name}` segments matches.
#[derive(Debug)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub path_params: HashMap<String, String>,
}

impl Request {
	pub fn new(
		method: Method,
		uri: Uri,
		version: Version,
		headers: HeaderMap,
		body: Bytes,
	) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: HashMap::new(),
		}
	}

	/// Request path without the query string
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Path parameter captured by the matched route pattern
	pub fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}

	/// Deserialize the urlencoded form body into a typed struct.
	///
	/// Form structs default every field, so an empty body yields the
	/// empty form rather than an error.
	pub fn form_data<T: DeserializeOwned>(&self) -> Result<T> {
		serde_urlencoded::from_bytes(&self.body)
			.map_err(|e| Error::Validation(format!("malformed form body: {e}")))
	}

	/// Convenience constructor for GET requests, used by routing and view tests
	pub fn get(path: &str) -> Self {
		Self::new(
			Method::GET,
			path.parse().expect("test path must be a valid URI"),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::new(),
		)
	}

	/// Convenience constructor for urlencoded POST requests
	pub fn post(path: &str, body: &str) -> Self {
		Self::new(
			Method::POST,
			path.parse().expect("test path must be a valid URI"),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::from(body.to_string()),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[derive(Debug, Default, Deserialize)]
	struct SampleForm {
		#[serde(default)]
		name: String,
		#[serde(default)]
		desc: String,
	}

	#[test]
	fn form_data_decodes_urlencoded_body() {
		let request = Request::post("/category/create", "name=Paints&desc=Base+coats");
		let form: SampleForm = request.form_data().unwrap();
		assert_eq!(form.name, "Paints");
		assert_eq!(form.desc, "Base coats");
	}

	#[test]
	fn form_data_defaults_missing_fields() {
		let request = Request::post("/category/create", "name=Paints");
		let form: SampleForm = request.form_data().unwrap();
		assert_eq!(form.name, "Paints");
		assert!(form.desc.is_empty());
	}

	#[test]
	fn form_data_decodes_percent_escapes() {
		let request = Request::post("/x", "name=Horus%20Heresy");
		let form: SampleForm = request.form_data().unwrap();
		assert_eq!(form.name, "Horus Heresy");
	}
}
