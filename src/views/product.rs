use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use super::{path_object_id, persisted_id, Action, AppState, ViewSet};
use crate::catalog::group_for_display;
use crate::error::{Error, Result};
use crate::forms::{FormErrors, ProductForm};
use crate::http::{Request, Response};
use crate::models::{Product, PRICE_UNSET};

#[derive(Serialize)]
struct ProductRow {
	name: String,
	url: String,
	price: Option<String>,
	stock: i64,
}

impl ProductRow {
	fn from(product: &Product) -> Self {
		Self {
			name: product.name.clone(),
			url: product.url(),
			price: product.price_display(),
			stock: product.stock,
		}
	}
}

#[derive(Serialize)]
struct SubcategoryGroupRow {
	name: Option<String>,
	products: Vec<ProductRow>,
}

#[derive(Serialize)]
struct CategoryGroupRow {
	name: String,
	subcategories: Vec<SubcategoryGroupRow>,
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

pub struct ProductViews {
	state: Arc<AppState>,
}

impl ProductViews {
	pub fn new(state: Arc<AppState>) -> Arc<Self> {
		Arc::new(Self { state })
	}

	async fn list(&self) -> Result<Response> {
		let resolved = self.state.store.resolved_products().await?;
		let grouped = group_for_display(resolved);

		let rows: Vec<CategoryGroupRow> = grouped
			.into_iter()
			.map(|category| CategoryGroupRow {
				name: category.name,
				subcategories: category
					.subcategories
					.into_iter()
					.map(|sub| SubcategoryGroupRow {
						name: sub.name,
						products: sub.products.iter().map(ProductRow::from).collect(),
					})
					.collect(),
			})
			.collect();

		let mut context = Context::new();
		context.insert("title", "Products");
		context.insert("groups", &rows);
		self.state.pages.render("product_list.html", &context)
	}

	async fn detail(&self, request: &Request) -> Result<Response> {
		let id = path_object_id(request)
			.ok_or_else(|| Error::NotFound("product not found".to_string()))?;
		let product = self
			.state
			.store
			.get_product(id)
			.await?
			.ok_or_else(|| Error::NotFound("product not found".to_string()))?;

		let category = self.state.store.get_category(product.category).await?;
		let subcategory = match product.subcategory {
			Some(subcategory_id) => self.state.store.get_subcategory(subcategory_id).await?,
			None => None,
		};

		let mut context = Context::new();
		context.insert("title", &product.name);
		context.insert("product", &ProductRow::from(&product));
		context.insert("desc", &product.desc);
		context.insert("image", &product.image);
		context.insert(
			"category",
			&category.map(|c| LinkRow {
				name: c.name.clone(),
				url: c.url(),
			}),
		);
		context.insert(
			"subcategory",
			&subcategory.map(|s| LinkRow {
				name: s.name.clone(),
				url: s.url(),
			}),
		);
		self.state.pages.render("product_detail.html", &context)
	}

	async fn render_form(
		&self,
		title: &str,
		form: &ProductForm,
		errors: &FormErrors,
	) -> Result<Response> {
		let categories: Vec<ChoiceRow> = self
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
			.collect();
		let subcategories: Vec<ChoiceRow> = self
			.state
			.store
			.list_subcategories()
			.await?
			.into_iter()
			.filter_map(|s| {
				s.id.map(|id| ChoiceRow {
					id: id.to_hex(),
					name: s.name,
				})
			})
			.collect();

		let mut context = Context::new();
		context.insert("title", title);
		context.insert("name", &form.name);
		context.insert("desc", &form.desc);
		context.insert("image", &form.image);
		context.insert("price", &form.price);
		context.insert("stock", &form.stock);
		context.insert("selected_category", &form.category);
		context.insert("selected_subcategory", &form.subcategory);
		context.insert("categories", &categories);
		context.insert("subcategories", &subcategories);
		context.insert("errors", &errors.messages());
		self.state.pages.render("product_form.html", &context)
	}

	/// Store-backed rules shared by create and edit: the category must
	/// exist, and a chosen subcategory must belong to it
	async fn validate_references(&self, form: &ProductForm, errors: &mut FormErrors) -> Result<()> {
		let category_id = match form.category_id() {
			Some(id) => {
				if self.state.store.get_category(id).await?.is_none() {
					errors.add("category", "Selected category does not exist");
					return Ok(());
				}
				id
			}
			None => return Ok(()),
		};

		if let Some(subcategory_id) = form.subcategory_id() {
			match self.state.store.get_subcategory(subcategory_id).await? {
				Some(subcategory) if subcategory.category != category_id => {
					errors.add(
						"subcategory",
						"Chosen subcategory belongs to another category",
					);
				}
				Some(_) => {}
				None => {
					errors.add("subcategory", "Chosen subcategory does not exist");
				}
			}
		}
		Ok(())
	}

	fn build(&self, form: &ProductForm) -> Result<Product> {
		let Some(category_id) = form.category_id() else {
			return Err(Error::Validation(
				"category reference missing after validation".to_string(),
			));
		};
		Ok(Product {
			id: None,
			name: form.name(),
			desc: form.desc(),
			image: form.image_url(),
			category: category_id,
			subcategory: form.subcategory_id(),
			price: form.price_minor_units().unwrap_or(PRICE_UNSET),
			stock: form.stock_units().unwrap_or(0),
		})
	}

	async fn create_form(&self) -> Result<Response> {
		self.render_form("Add product", &ProductForm::default(), &FormErrors::new())
			.await
	}

	async fn create(&self, request: &Request) -> Result<Response> {
		let form: ProductForm = request.form_data()?;
		let mut errors = form.validate();
		if errors.is_empty() {
			self.validate_references(&form, &mut errors).await?;
		}
		if !errors.is_empty() {
			return self.render_form("Add product", &form, &errors).await;
		}

		let mut product = self.build(&form)?;
		let id = self.state.store.insert_product(&product).await?;
		product.id = Some(id);
		Ok(Response::see_other(&product.url()))
	}

	async fn edit_form(&self, request: &Request) -> Result<Response> {
		let Some(product) = self.lookup(request).await? else {
			return Ok(Response::see_other("/products"));
		};

		// The sentinel price pre-fills as an empty field, not "9999.99".
		let form = ProductForm {
			name: product.name.clone(),
			desc: product.desc.clone().unwrap_or_default(),
			image: product.image.clone().unwrap_or_default(),
			category: product.category.to_hex(),
			subcategory: product
				.subcategory
				.map(|id| id.to_hex())
				.unwrap_or_default(),
			price: product.price_display().unwrap_or_default(),
			stock: product.stock.to_string(),
		};
		self.render_form("Edit product", &form, &FormErrors::new())
			.await
	}

	async fn edit(&self, request: &Request) -> Result<Response> {
		let Some(existing) = self.lookup(request).await? else {
			return Ok(Response::see_other("/products"));
		};
		let id = persisted_id(existing.id)?;

		let form: ProductForm = request.form_data()?;
		let mut errors = form.validate();
		if errors.is_empty() {
			self.validate_references(&form, &mut errors).await?;
		}
		if !errors.is_empty() {
			return self.render_form("Edit product", &form, &errors).await;
		}

		let mut product = self.build(&form)?;
		product.id = Some(id);
		self.state.store.update_product(id, &product).await?;
		Ok(Response::see_other(&product.url()))
	}

	async fn delete_form(&self, request: &Request) -> Result<Response> {
		let Some(product) = self.lookup(request).await? else {
			return Ok(Response::see_other("/products"));
		};
		let mut context = Context::new();
		context.insert("title", "Delete product");
		context.insert("product", &ProductRow::from(&product));
		self.state.pages.render("product_delete.html", &context)
	}

	async fn delete(&self, request: &Request) -> Result<Response> {
		let Some(product) = self.lookup(request).await? else {
			return Ok(Response::see_other("/products"));
		};
		let id = persisted_id(product.id)?;
		self.state.store.delete_product(id).await?;
		Ok(Response::see_other("/products"))
	}

	async fn lookup(&self, request: &Request) -> Result<Option<Product>> {
		match path_object_id(request) {
			Some(id) => self.state.store.get_product(id).await,
			None => Ok(None),
		}
	}
}

#[async_trait]
impl ViewSet for ProductViews {
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
