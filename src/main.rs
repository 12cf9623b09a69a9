use anyhow::Context as _;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stocktake::conf::Settings;
use stocktake::db::MongoBackend;
use stocktake::pages::Pages;
use stocktake::server::HttpServer;
use stocktake::store::CatalogStore;
use stocktake::urls;
use stocktake::views::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.init();

	let settings = Settings::from_env().context("loading settings")?;

	let backend = MongoBackend::connect(&settings.mongodb_uri, &settings.database)
		.await
		.context("connecting to MongoDB")?;
	let store = CatalogStore::new(Arc::new(backend));
	store
		.ensure_indexes()
		.await
		.context("creating store indexes")?;

	let pages = Arc::new(Pages::new(&settings.template_dir).context("loading templates")?);

	let bind_addr = settings.bind_addr;
	let state = Arc::new(AppState {
		store,
		pages: pages.clone(),
		settings,
	});
	let router = Arc::new(urls::routes(state));

	HttpServer::new(router, pages)
		.listen(bind_addr)
		.await
		.context("serving")?;
	Ok(())
}
