use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use super::{path_object_id, persisted_id, Action, AppState, ViewSet};
use crate::error::{Error, Result};
use crate::forms::{check_admin_password, CategoryForm, FormErrors};
use crate::http::{Request, Response};
use crate::models::Category;

#[derive(Serialize)]
struct CategoryRow {
	name: String,
	url: String,
	desc: Option<String>,
	is_default: bool,
}

impl CategoryRow {
	fn from(category: &Category) -> Self {
		Self {
			name: category.name.clone(),
			url: category.url(),
			desc: category.desc.clone(),
			is_default: category.is_default(),
		}
	}
}

#[derive(Serialize)]
struct LinkRow {
	name: String,
	url: String,
}

pub struct CategoryViews {
	state: Arc<AppState>,
}

impl CategoryViews {
	pub fn new(state: Arc<AppState>) -> Arc<Self> {
		Arc::new(Self { state })
	}

	fn gated(&self) -> bool {
		self.state.delete_gate().is_some()
	}

	async fn list(&self) -> Result<Response> {
		let categories = self.state.store.list_categories().await?;
		let rows: Vec<CategoryRow> = categories.iter().map(CategoryRow::from).collect();

		let mut context = Context::new();
		context.insert("title", "Categories");
		context.insert("categories", &rows);
		self.state.pages.render("category_list.html", &context)
	}

	async fn detail(&self, request: &Request) -> Result<Response> {
		let id = path_object_id(request)
			.ok_or_else(|| Error::NotFound("category not found".to_string()))?;
		let category = self
			.state
			.store
			.get_category(id)
			.await?
			.ok_or_else(|| Error::NotFound("category not found".to_string()))?;

		let subcategories = self.state.store.subcategories_of(id).await?;
		let products = self.state.store.products_of_category(id).await?;

		let mut context = Context::new();
		context.insert("title", &category.name);
		context.insert("category", &CategoryRow::from(&category));
		context.insert(
			"subcategories",
			&subcategories
				.iter()
				.map(|s| LinkRow {
					name: s.name.clone(),
					url: s.url(),
				})
				.collect::<Vec<_>>(),
		);
		context.insert(
			"products",
			&products
				.iter()
				.map(|p| LinkRow {
					name: p.name.clone(),
					url: p.url(),
				})
				.collect::<Vec<_>>(),
		);
		self.state.pages.render("category_detail.html", &context)
	}

	fn render_form(
		&self,
		title: &str,
		form: &CategoryForm,
		errors: &FormErrors,
		require_password: bool,
	) -> Result<Response> {
		let mut context = Context::new();
		context.insert("title", title);
		context.insert("name", &form.name);
		context.insert("desc", &form.desc);
		context.insert("errors", &errors.messages());
		context.insert("require_password", &require_password);
		self.state.pages.render("category_form.html", &context)
	}

	async fn create_form(&self) -> Result<Response> {
		self.render_form(
			"Add category",
			&CategoryForm::default(),
			&FormErrors::new(),
			false,
		)
	}

	async fn create(&self, request: &Request) -> Result<Response> {
		let form: CategoryForm = request.form_data()?;
		let mut errors = form.validate();
		if errors.is_empty()
			&& self
				.state
				.store
				.find_category_by_name(&form.name(), None)
				.await?
				.is_some()
		{
			errors.add("name", "Category with that name already exists");
		}
		if !errors.is_empty() {
			return self.render_form("Add category", &form, &errors, false);
		}

		let mut category = Category::new(form.name(), form.desc());
		match self.state.store.insert_category(&category).await {
			Ok(id) => {
				category.id = Some(id);
				Ok(Response::see_other(&category.url()))
			}
			Err(Error::Duplicate(_)) => {
				// Raced a concurrent create between the lookup and the
				// insert; report it like any other uniqueness violation.
				errors.add("name", "Category with that name already exists");
				self.render_form("Add category", &form, &errors, false)
			}
			Err(other) => Err(other),
		}
	}

	async fn edit_form(&self, request: &Request) -> Result<Response> {
		let Some(category) = self.lookup(request).await? else {
			return Ok(Response::see_other("/categories"));
		};
		if category.is_default() {
			return Ok(Response::see_other("/categories"));
		}

		let form = CategoryForm {
			name: category.name.clone(),
			desc: category.desc.clone().unwrap_or_default(),
			password: String::new(),
		};
		self.render_form("Edit category", &form, &FormErrors::new(), self.gated())
	}

	async fn edit(&self, request: &Request) -> Result<Response> {
		let Some(existing) = self.lookup(request).await? else {
			return Ok(Response::see_other("/categories"));
		};
		if existing.is_default() {
			return Ok(Response::see_other("/categories"));
		}
		let id = persisted_id(existing.id)?;

		let form: CategoryForm = request.form_data()?;
		let mut errors = form.validate();
		if errors.is_empty()
			&& self
				.state
				.store
				.find_category_by_name(&form.name(), Some(id))
				.await?
				.is_some()
		{
			errors.add("name", "Category with that name already exists");
		}
		if let Some(expected) = self.state.delete_gate() {
			check_admin_password(&mut errors, &form.password, expected);
		}
		if !errors.is_empty() {
			return self.render_form("Edit category", &form, &errors, self.gated());
		}

		let mut category = Category::new(form.name(), form.desc());
		category.id = Some(id);
		self.state.store.update_category(id, &category).await?;
		Ok(Response::see_other(&category.url()))
	}

	async fn delete_form(&self, request: &Request) -> Result<Response> {
		let Some(category) = self.lookup(request).await? else {
			return Ok(Response::see_other("/categories"));
		};
		if category.is_default() {
			return Ok(Response::see_other("/categories"));
		}
		self.render_delete(&category, &FormErrors::new())
	}

	async fn delete(&self, request: &Request) -> Result<Response> {
		let Some(category) = self.lookup(request).await? else {
			return Ok(Response::see_other("/categories"));
		};
		if category.is_default() {
			return Ok(Response::see_other("/categories"));
		}

		if let Some(expected) = self.state.delete_gate() {
			let form: CategoryForm = request.form_data()?;
			let mut errors = FormErrors::new();
			check_admin_password(&mut errors, &form.password, expected);
			if !errors.is_empty() {
				return self.render_delete(&category, &errors);
			}
		}

		let id = persisted_id(category.id)?;
		self.state.store.delete_category(id).await?;
		Ok(Response::see_other("/categories"))
	}

	fn render_delete(&self, category: &Category, errors: &FormErrors) -> Result<Response> {
		let mut context = Context::new();
		context.insert("title", "Delete category");
		context.insert("category", &CategoryRow::from(category));
		context.insert("errors", &errors.messages());
		context.insert("require_password", &self.gated());
		self.state.pages.render("category_delete.html", &context)
	}

	async fn lookup(&self, request: &Request) -> Result<Option<Category>> {
		match path_object_id(request) {
			Some(id) => self.state.store.get_category(id).await,
			None => Ok(None),
		}
	}
}

#[async_trait]
impl ViewSet for CategoryViews {
	async fn dispatch(&self, request: Request, action: Action) -> Result<Response> {
		match action {
			Action::List => self.list().await,
			Action::Detail => self.detail(&request).await,
			Action::CreateForm => self.create_form().await,
			Action::Create => self.create(&request).await,
			Action::EditForm => self.edit_form(&request).await,
			Action::Edit => self.edit(&request).await,
			Action::DeleteForm => self.delete_form(&request).await,
			Action::Delete => self.delete(&request).await,
		}
	}
}
