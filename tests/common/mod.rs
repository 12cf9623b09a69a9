//! Shared fixture: the full application wired onto the in-memory backend.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use stocktake::conf::Settings;
use stocktake::db::MemoryBackend;
use stocktake::pages::Pages;
use stocktake::store::CatalogStore;
use stocktake::urls::{routes, Router};
use stocktake::views::AppState;

pub struct TestApp {
	pub backend: Arc<MemoryBackend>,
	pub store: CatalogStore,
	pub router: Router,
}

fn settings(require_delete_password: bool, admin_password: Option<&str>) -> Settings {
	Settings {
		mongodb_uri: "mongodb://unused".to_string(),
		database: "unused".to_string(),
		bind_addr: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
		template_dir: PathBuf::from("templates"),
		require_delete_password,
		admin_password: admin_password.map(str::to_string),
	}
}

pub async fn app() -> TestApp {
	app_with_gate(false, None).await
}

pub async fn app_with_gate(require_delete_password: bool, admin_password: Option<&str>) -> TestApp {
	let backend = Arc::new(MemoryBackend::new());
	let store = CatalogStore::new(backend.clone());
	store.ensure_indexes().await.unwrap();

	let pages = Arc::new(Pages::new(&PathBuf::from("templates")).unwrap());
	let state = Arc::new(AppState {
		store: store.clone(),
		pages,
		settings: settings(require_delete_password, admin_password),
	});

	TestApp {
		backend,
		store,
		router: routes(state),
	}
}

pub fn body_text(response: &stocktake::http::Response) -> String {
	String::from_utf8(response.body.to_vec()).unwrap()
}
