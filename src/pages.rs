//! Template rendering: a directory-loaded Tera engine producing HTML
//! responses.

use std::path::Path;
use tera::{Context, Tera};

use crate::error::{Error, Result};
use crate::http::Response;

pub struct Pages {
	tera: Tera,
}

impl Pages {
	/// Load every `.html` template under the given directory
	pub fn new(template_dir: &Path) -> Result<Self> {
		let glob = format!("{}/**/*.html", template_dir.display());
		let tera = Tera::new(&glob).map_err(|e| Error::Template(e.to_string()))?;
		Ok(Self { tera })
	}

	/// Render a template to a 200 HTML response
	pub fn render(&self, template: &str, context: &Context) -> Result<Response> {
		let html = self.tera.render(template, context)?;
		Ok(Response::ok().with_html(html))
	}

	/// The 404 page; falls back to plain text if the template itself is
	/// broken
	pub fn not_found_page(&self) -> Response {
		let mut context = Context::new();
		context.insert("title", "Not found");
		match self.tera.render("not_found.html", &context) {
			Ok(html) => Response::not_found().with_html(html),
			Err(_) => Response::not_found().with_html("<h1>Not found</h1>".to_string()),
		}
	}

	/// The generic error page; never leaks failure details to the client
	pub fn error_page(&self) -> Response {
		let mut context = Context::new();
		context.insert("title", "Error");
		match self.tera.render("error.html", &context) {
			Ok(html) => Response::internal_server_error().with_html(html),
			Err(_) => Response::internal_server_error()
				.with_html("<h1>Something went wrong</h1>".to_string()),
		}
	}
}
