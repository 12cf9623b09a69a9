//! Server-rendered views, one set per entity, dispatched by action.

mod category;
mod product;
mod subcategory;

pub use category::CategoryViews;
pub use product::ProductViews;
pub use subcategory::SubcategoryViews;

use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;

use crate::conf::Settings;
use crate::error::Result;
use crate::http::{Handler, Request, Response};
use crate::pages::Pages;
use crate::store::CatalogStore;

/// Shared application state handed to every view
pub struct AppState {
	pub store: CatalogStore,
	pub pages: Arc<Pages>,
	pub settings: Settings,
}

impl AppState {
	/// The expected admin password when the delete gate is enabled
	pub fn delete_gate(&self) -> Option<&str> {
		if self.settings.require_delete_password {
			self.settings.admin_password.as_deref()
		} else {
			None
		}
	}
}

/// The operations a view set can dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	List,
	Detail,
	CreateForm,
	Create,
	EditForm,
	Edit,
	DeleteForm,
	Delete,
}

/// A set of related views dispatched by [`Action`]
#[async_trait]
pub trait ViewSet: Send + Sync {
	async fn dispatch(&self, request: Request, action: Action) -> Result<Response>;
}

/// Adapts one (view set, action) pair into a route handler
pub struct ActionHandler {
	viewset: Arc<dyn ViewSet>,
	action: Action,
}

impl ActionHandler {
	pub fn new(viewset: Arc<dyn ViewSet>, action: Action) -> Arc<Self> {
		Arc::new(Self { viewset, action })
	}
}

#[async_trait]
impl Handler for ActionHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.viewset.dispatch(request, self.action).await
	}
}

/// Landing page: send the operator to the category list
pub struct IndexView;

#[async_trait]
impl Handler for IndexView {
	async fn handle(&self, _request: Request) -> Result<Response> {
		Ok(Response::see_other("/categories"))
	}
}

/// The `{id}` path parameter as an ObjectId; a malformed or absent value
/// behaves like an unknown id
pub(crate) fn path_object_id(request: &Request) -> Option<ObjectId> {
	request
		.path_param("id")
		.and_then(|raw| ObjectId::parse_str(raw).ok())
}

/// The id of an entity that was read back from the store
pub(crate) fn persisted_id(id: Option<ObjectId>) -> crate::error::Result<ObjectId> {
	id.ok_or_else(|| crate::error::Error::Invariant("stored entity is missing its id".to_string()))
}
