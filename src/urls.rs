//! Route table: `{param}` path patterns compiled to regexes, dispatched by
//! method and path.

use async_trait::async_trait;
use hyper::Method;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::http::{Handler, Request, Response};

/// Compiled path pattern; `{name}` segments capture into named params
pub struct PathPattern {
	regex: Regex,
	params: Vec<String>,
}

impl PathPattern {
	/// Compile a pattern such as `/category/{id}/{slug}`.
	///
	/// Literal segments are regex-escaped; each `{name}` becomes a
	/// single-segment capture group.
	pub fn compile(pattern: &str) -> Self {
		let mut params = Vec::new();
		let mut regex = String::from("^");
		for segment in pattern.split('/') {
			if segment.is_empty() {
				continue;
			}
			regex.push('/');
			if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
				params.push(name.to_string());
				regex.push_str("([^/]+)");
			} else {
				regex.push_str(&regex::escape(segment));
			}
		}
		if regex == "^" {
			regex.push('/');
		}
		regex.push('$');
		Self {
			regex: Regex::new(&regex).expect("route pattern must compile"),
			params,
		}
	}

	/// Match a request path, returning captured params on success
	pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		let captures = self.regex.captures(path)?;
		let mut values = HashMap::with_capacity(self.params.len());
		for (index, name) in self.params.iter().enumerate() {
			let capture = captures.get(index + 1)?;
			values.insert(name.clone(), capture.as_str().to_string());
		}
		Some(values)
	}
}

struct Route {
	method: Method,
	pattern: PathPattern,
	handler: Arc<dyn Handler>,
}

/// Build the full route table for the application
pub fn routes(state: Arc<crate::views::AppState>) -> Router {
	use crate::views::{
		Action, ActionHandler, CategoryViews, IndexView, ProductViews, SubcategoryViews,
	};

	let categories = CategoryViews::new(state.clone());
	let subcategories = SubcategoryViews::new(state.clone());
	let products = ProductViews::new(state);

	let mut router = Router::new();
	router.add(Method::GET, "/", Arc::new(IndexView));

	router.add(
		Method::GET,
		"/categories",
		ActionHandler::new(categories.clone(), Action::List),
	);
	router.add(
		Method::GET,
		"/subcategories",
		ActionHandler::new(subcategories.clone(), Action::List),
	);
	router.add(
		Method::GET,
		"/products",
		ActionHandler::new(products.clone(), Action::List),
	);

	for (prefix, viewset) in [
		("category", categories as Arc<dyn crate::views::ViewSet>),
		("subcategory", subcategories as Arc<dyn crate::views::ViewSet>),
		("product", products as Arc<dyn crate::views::ViewSet>),
	] {
		router.add(
			Method::GET,
			&format!("/{prefix}/create"),
			ActionHandler::new(viewset.clone(), Action::CreateForm),
		);
		router.add(
			Method::POST,
			&format!("/{prefix}/create"),
			ActionHandler::new(viewset.clone(), Action::Create),
		);
		router.add(
			Method::GET,
			&format!("/{prefix}/{{id}}/{{slug}}/edit"),
			ActionHandler::new(viewset.clone(), Action::EditForm),
		);
		router.add(
			Method::POST,
			&format!("/{prefix}/{{id}}/{{slug}}/edit"),
			ActionHandler::new(viewset.clone(), Action::Edit),
		);
		router.add(
			Method::GET,
			&format!("/{prefix}/{{id}}/{{slug}}/delete"),
			ActionHandler::new(viewset.clone(), Action::DeleteForm),
		);
		router.add(
			Method::POST,
			&format!("/{prefix}/{{id}}/{{slug}}/delete"),
			ActionHandler::new(viewset.clone(), Action::Delete),
		);
		router.add(
			Method::GET,
			&format!("/{prefix}/{{id}}/{{slug}}"),
			ActionHandler::new(viewset, Action::Detail),
		);
	}

	router
}

/// Ordered route table; first match wins
#[derive(Default)]
pub struct Router {
	routes: Vec<Route>,
}

impl Router {
	pub fn new() -> Self {
		Self { routes: Vec::new() }
	}

	pub fn add(&mut self, method: Method, pattern: &str, handler: Arc<dyn Handler>) {
		self.routes.push(Route {
			method,
			pattern: PathPattern::compile(pattern),
			handler,
		});
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let path = request.path().to_string();
		for route in &self.routes {
			if route.method != request.method {
				continue;
			}
			if let Some(params) = route.pattern.matches(&path) {
				request.path_params = params;
				return route.handler.handle(request).await;
			}
		}
		Err(Error::NotFound(format!("no route for {path}")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[rstest::rstest]
	#[case("/categories", "/categories", true)]
	#[case("/categories", "/categories/", false)]
	#[case("/category/{id}/{slug}", "/category/abc123/space-marines", true)]
	#[case("/category/{id}/{slug}", "/category/abc123", false)]
	#[case("/category/{id}/{slug}/edit", "/category/abc123/space-marines/edit", true)]
	#[case("/category/create", "/category/anything-else", false)]
	fn pattern_matching(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
		let compiled = PathPattern::compile(pattern);
		assert_eq!(compiled.matches(path).is_some(), expected);
	}

	#[test]
	fn captured_params_are_named() {
		let pattern = PathPattern::compile("/product/{id}/{slug}/delete");
		let params = pattern.matches("/product/42/combat-patrol/delete").unwrap();
		assert_eq!(params["id"], "42");
		assert_eq!(params["slug"], "combat-patrol");
	}

	#[tokio::test]
	async fn unmatched_path_is_not_found() {
		let router = Router::new();
		let result = router.handle(Request::get("/nope")).await;
		assert!(matches!(result, Err(Error::NotFound(_))));
	}

	#[tokio::test]
	async fn method_mismatch_is_not_found() {
		struct Always;
		#[async_trait]
		impl Handler for Always {
			async fn handle(&self, _request: Request) -> Result<Response> {
				Ok(Response::ok())
			}
		}

		let mut router = Router::new();
		router.add(Method::POST, "/category/create", Arc::new(Always));
		let result = router.handle(Request::get("/category/create")).await;
		assert!(matches!(result, Err(Error::NotFound(_))));
	}
}
