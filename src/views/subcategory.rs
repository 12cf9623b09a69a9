use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use super::{path_object_id, persisted_id, Action, AppState, ViewSet};
use crate::error::{Error, Result};
use crate::forms::{check_admin_password, FormErrors, SubcategoryForm};
use crate::http::{Request, Response};
use crate::models::Subcategory;

#[derive(Serialize)]
struct SubcategoryRow {
	name: String,
	url: String,
	desc: Option<String>,
}

#[derive(Serialize)]
struct ChoiceRow {
	id: String,
	name: String,
}

#[derive(Serialize)]
struct LinkRow {
	name: String,
	url: String,
}

pub struct SubcategoryViews {
	state: Arc<AppState>,
}

impl SubcategoryViews {
	pub fn new(state: Arc<AppState>) -> Arc<Self> {
		Arc::new(Self { state })
	}

	fn gated(&self) -> bool {
		self.state.delete_gate().is_some()
	}

	/// Category choices for the select control
	async fn category_choices(&self) -> Result<Vec<ChoiceRow>> {
		Ok(self
			.state
			.store
			.list_categories()
			.await?
			.into_iter()
			.filter_map(|c| {
				c.id.map(|id| ChoiceRow {
					id: id.to_hex(),
					name: c.name,
				})
			})
			.collect())
	}

	async fn list(&self) -> Result<Response> {
		let subcategories = self.state.store.list_subcategories().await?;
		let rows: Vec<SubcategoryRow> = subcategories
			.iter()
			.map(|s| SubcategoryRow {
				name: s.name.clone(),
				url: s.url(),
				desc: s.desc.clone(),
			})
			.collect();

		let mut context = Context::new();
		context.insert("title", "Subcategories");
		context.insert("subcategories", &rows);
		self.state.pages.render("subcategory_list.html", &context)
	}

	async fn detail(&self, request: &Request) -> Result<Response> {
		let id = path_object_id(request)
			.ok_or_else(|| Error::NotFound("subcategory not found".to_string()))?;
		let subcategory = self
			.state
			.store
			.get_subcategory(id)
			.await?
			.ok_or_else(|| Error::NotFound("subcategory not found".to_string()))?;

		let category = self.state.store.get_category(subcategory.category).await?;
		let products = self.state.store.products_of_subcategory(id).await?;

		let mut context = Context::new();
		context.insert("title", &subcategory.name);
		context.insert(
			"subcategory",
			&SubcategoryRow {
				name: subcategory.name.clone(),
				url: subcategory.url(),
				desc: subcategory.desc.clone(),
			},
		);
		context.insert(
			"category",
			&category.map(|c| LinkRow {
				name: c.name.clone(),
				url: c.url(),
			}),
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
		self.state.pages.render("subcategory_detail.html", &context)
	}

	async fn render_form(
		&self,
		title: &str,
		form: &SubcategoryForm,
		errors: &FormErrors,
	) -> Result<Response> {
		let mut context = Context::new();
		context.insert("title", title);
		context.insert("name", &form.name);
		context.insert("desc", &form.desc);
		context.insert("selected_category", &form.category);
		context.insert("categories", &self.category_choices().await?);
		context.insert("errors", &errors.messages());
		self.state.pages.render("subcategory_form.html", &context)
	}

	/// Store-backed rules shared by create and edit: the referenced
	/// category must exist
	async fn validate_references(&self, form: &SubcategoryForm, errors: &mut FormErrors) -> Result<()> {
		if let Some(category_id) = form.category_id()
			&& self.state.store.get_category(category_id).await?.is_none()
		{
			errors.add("category", "Selected category does not exist");
		}
		Ok(())
	}

	async fn create_form(&self) -> Result<Response> {
		self.render_form("Add subcategory", &SubcategoryForm::default(), &FormErrors::new())
			.await
	}

	async fn create(&self, request: &Request) -> Result<Response> {
		let form: SubcategoryForm = request.form_data()?;
		let mut errors = form.validate();
		if errors.is_empty() {
			self.validate_references(&form, &mut errors).await?;
		}
		if !errors.is_empty() {
			return self.render_form("Add subcategory", &form, &errors).await;
		}

		let Some(category_id) = form.category_id() else {
			return Err(Error::Validation(
				"category reference missing after validation".to_string(),
			));
		};
		let mut subcategory = Subcategory {
			id: None,
			name: form.name(),
			desc: form.desc(),
			category: category_id,
		};
		let id = self.state.store.insert_subcategory(&subcategory).await?;
		subcategory.id = Some(id);
		Ok(Response::see_other(&subcategory.url()))
	}

	async fn edit_form(&self, request: &Request) -> Result<Response> {
		let Some(subcategory) = self.lookup(request).await? else {
			return Ok(Response::see_other("/subcategories"));
		};
		let form = SubcategoryForm {
			name: subcategory.name.clone(),
			desc: subcategory.desc.clone().unwrap_or_default(),
			category: subcategory.category.to_hex(),
			password: String::new(),
		};
		self.render_form("Edit subcategory", &form, &FormErrors::new())
			.await
	}

	async fn edit(&self, request: &Request) -> Result<Response> {
		let Some(existing) = self.lookup(request).await? else {
			return Ok(Response::see_other("/subcategories"));
		};
		let id = persisted_id(existing.id)?;

		let form: SubcategoryForm = request.form_data()?;
		let mut errors = form.validate();
		if errors.is_empty() {
			self.validate_references(&form, &mut errors).await?;
		}
		if !errors.is_empty() {
			return self.render_form("Edit subcategory", &form, &errors).await;
		}

		let Some(category_id) = form.category_id() else {
			return Err(Error::Validation(
				"category reference missing after validation".to_string(),
			));
		};
		let subcategory = Subcategory {
			id: Some(id),
			name: form.name(),
			desc: form.desc(),
			category: category_id,
		};
		self.state.store.update_subcategory(id, &subcategory).await?;
		Ok(Response::see_other(&subcategory.url()))
	}

	async fn delete_form(&self, request: &Request) -> Result<Response> {
		let Some(subcategory) = self.lookup(request).await? else {
			return Ok(Response::see_other("/subcategories"));
		};
		self.render_delete(&subcategory, &FormErrors::new())
	}

	async fn delete(&self, request: &Request) -> Result<Response> {
		let Some(subcategory) = self.lookup(request).await? else {
			return Ok(Response::see_other("/subcategories"));
		};

		if let Some(expected) = self.state.delete_gate() {
			let form: SubcategoryForm = request.form_data()?;
			let mut errors = FormErrors::new();
			check_admin_password(&mut errors, &form.password, expected);
			if !errors.is_empty() {
				return self.render_delete(&subcategory, &errors);
			}
		}

		let id = persisted_id(subcategory.id)?;
		self.state.store.delete_subcategory(id).await?;
		Ok(Response::see_other("/subcategories"))
	}

	fn render_delete(&self, subcategory: &Subcategory, errors: &FormErrors) -> Result<Response> {
		let mut context = Context::new();
		context.insert("title", "Delete subcategory");
		context.insert(
			"subcategory",
			&SubcategoryRow {
				name: subcategory.name.clone(),
				url: subcategory.url(),
				desc: subcategory.desc.clone(),
			},
		);
		context.insert("errors", &errors.messages());
		context.insert("require_password", &self.gated());
		self.state.pages.render("subcategory_delete.html", &context)
	}

	async fn lookup(&self, request: &Request) -> Result<Option<Subcategory>> {
		match path_object_id(request) {
			Some(id) => self.state.store.get_subcategory(id).await,
			None => Ok(None),
		}
	}
}

#[async_trait]
impl ViewSet for SubcategoryViews {
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
