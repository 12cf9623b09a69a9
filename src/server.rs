//! HTTP server: hyper http1 connections multiplexed on the tokio runtime.
//!
//! Each connection is served by a [`RequestService`] that builds the
//! application [`Request`], runs the handler, and converts the outcome
//! (including errors) into a hyper response. Handler errors never escape:
//! they become the 404 or generic error page here.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::error::Error;
use crate::http::{Handler, Request, Response};
use crate::pages::Pages;

pub struct HttpServer {
	handler: Arc<dyn Handler>,
	pages: Arc<Pages>,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>, pages: Arc<Pages>) -> Self {
		Self { handler, pages }
	}

	/// Bind and serve until the process is stopped
	pub async fn listen(self, addr: SocketAddr) -> std::io::Result<()> {
		let listener = TcpListener::bind(addr).await?;
		tracing::info!("listening on http://{addr}");

		loop {
			let (stream, remote_addr) = listener.accept().await?;
			let service = RequestService {
				handler: self.handler.clone(),
				pages: self.pages.clone(),
			};

			tokio::task::spawn(async move {
				if let Err(err) = Self::handle_connection(stream, service).await {
					tracing::error!(%remote_addr, "connection error: {err:?}");
				}
			});
		}
	}

	async fn handle_connection(
		stream: TcpStream,
		service: RequestService,
	) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
		let io = TokioIo::new(stream);
		http1::Builder::new().serve_connection(io, service).await?;
		Ok(())
	}
}

/// Hyper service adapter around the application handler
#[derive(Clone)]
struct RequestService {
	handler: Arc<dyn Handler>,
	pages: Arc<Pages>,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Box<dyn std::error::Error + Send + Sync>;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let pages = self.pages.clone();

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body_bytes = body.collect().await?.to_bytes();

			let request = Request::new(
				parts.method.clone(),
				parts.uri.clone(),
				parts.version,
				parts.headers,
				body_bytes,
			);

			let response = match handler.handle(request).await {
				Ok(response) => response,
				Err(err) => error_response(err, &pages, parts.method.as_str(), parts.uri.path()),
			};

			let mut hyper_response = hyper::Response::builder().status(response.status);
			for (key, value) in response.headers.iter() {
				hyper_response = hyper_response.header(key, value);
			}
			Ok(hyper_response.body(Full::new(response.body))?)
		})
	}
}

/// Map a handler error to a user-facing page.
///
/// Details stay in the log; the client only sees which page it is.
fn error_response(err: Error, pages: &Pages, method: &str, path: &str) -> Response {
	match err {
		Error::NotFound(reason) => {
			tracing::debug!(method, path, "not found: {reason}");
			pages.not_found_page()
		}
		other => {
			tracing::error!(method, path, "request failed: {other}");
			pages.error_page()
		}
	}
}
