use bytes::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::{HeaderMap, StatusCode};

/// HTTP response representation
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// HTTP 303 redirect; the canonical answer to a successful form POST
	pub fn see_other(location: &str) -> Self {
		let mut response = Self::new(StatusCode::SEE_OTHER);
		if let Ok(value) = HeaderValue::from_str(location) {
			response.headers.insert(LOCATION, value);
		}
		response
	}

	/// Attach an HTML body with the matching content type
	pub fn with_html(mut self, body: String) -> Self {
		self.headers.insert(
			CONTENT_TYPE,
			HeaderValue::from_static("text/html; charset=utf-8"),
		);
		self.body = Bytes::from(body);
		self
	}

	/// Location header value, if any; handy in tests
	pub fn location(&self) -> Option<&str> {
		self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
	}

	pub fn is_redirect(&self) -> bool {
		self.status.is_redirection()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn see_other_sets_location() {
		let response = Response::see_other("/categories");
		assert_eq!(response.status, StatusCode::SEE_OTHER);
		assert_eq!(response.location(), Some("/categories"));
		assert!(response.is_redirect());
	}

	#[test]
	fn with_html_sets_content_type() {
		let response = Response::ok().with_html("<p>hi</p>".to_string());
		assert_eq!(
			response.headers.get(CONTENT_TYPE).unwrap(),
			"text/html; charset=utf-8"
		);
		assert_eq!(&response.body[..], b"<p>hi</p>");
	}
}
