//! End-to-end form flows against the in-memory backend.

mod common;

use common::{app, app_with_gate, body_text};
use stocktake::error::Error;
use stocktake::http::{Handler, Request};
use stocktake::models::{Category, PRICE_UNSET};

#[tokio::test]
async fn index_redirects_to_the_category_list() {
	let app = app().await;
	let response = app.router.handle(Request::get("/")).await.unwrap();
	assert_eq!(response.location(), Some("/categories"));
}

#[tokio::test]
async fn category_create_redirects_to_the_slugged_url() {
	let app = app().await;

	let response = app
		.router
		.handle(Request::post(
			"/category/create",
			"name=Space+Marines&desc=Power+armour",
		))
		.await
		.unwrap();

	assert!(response.is_redirect());
	let location = response.location().unwrap().to_string();
	assert!(
		location.ends_with("/space-marines"),
		"unexpected location {location}"
	);

	let categories = app.store.list_categories().await.unwrap();
	assert_eq!(categories.len(), 1);
	assert_eq!(categories[0].name, "Space Marines");
	assert_eq!(categories[0].desc.as_deref(), Some("Power armour"));
}

#[tokio::test]
async fn category_create_rejects_case_insensitive_duplicates() {
	let app = app().await;
	app.router
		.handle(Request::post("/category/create", "name=Warhammer"))
		.await
		.unwrap();

	let response = app
		.router
		.handle(Request::post("/category/create", "name=warhammer"))
		.await
		.unwrap();

	assert!(!response.is_redirect());
	assert!(body_text(&response).contains("Category with that name already exists"));
	assert_eq!(app.store.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn category_create_echoes_values_on_validation_failure() {
	let app = app().await;

	let response = app
		.router
		.handle(Request::post("/category/create", "name=ab&desc=Short+name"))
		.await
		.unwrap();

	let body = body_text(&response);
	assert!(body.contains("Category name must contain at least 3 characters"));
	assert!(body.contains("ab"));
	assert!(body.contains("Short name"));
	assert!(app.store.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn category_edit_excludes_itself_from_the_uniqueness_check() {
	let app = app().await;
	let id = app
		.store
		.insert_category(&Category::new("Paints", None))
		.await
		.unwrap();

	// Renaming to its own name (same casing or not) is allowed.
	let response = app
		.router
		.handle(Request::post(
			&format!("/category/{}/paints/edit", id.to_hex()),
			"name=PAINTS",
		))
		.await
		.unwrap();
	assert!(response.is_redirect());

	let updated = app.store.get_category(id).await.unwrap().unwrap();
	assert_eq!(updated.name, "PAINTS");
}

#[tokio::test]
async fn category_edit_rejects_taking_another_categorys_name() {
	let app = app().await;
	app.store
		.insert_category(&Category::new("Paints", None))
		.await
		.unwrap();
	let id = app
		.store
		.insert_category(&Category::new("Brushes", None))
		.await
		.unwrap();

	let response = app
		.router
		.handle(Request::post(
			&format!("/category/{}/brushes/edit", id.to_hex()),
			"name=paints",
		))
		.await
		.unwrap();

	assert!(body_text(&response).contains("Category with that name already exists"));
	let unchanged = app.store.get_category(id).await.unwrap().unwrap();
	assert_eq!(unchanged.name, "Brushes");
}

#[tokio::test]
async fn detail_view_of_unknown_id_is_not_found() {
	let app = app().await;
	let result = app
		.router
		.handle(Request::get(
			"/category/000000000000000000000000/missing",
		))
		.await;
	assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn edit_form_of_unknown_id_redirects_to_the_list() {
	let app = app().await;
	let response = app
		.router
		.handle(Request::get(
			"/category/000000000000000000000000/missing/edit",
		))
		.await
		.unwrap();
	assert_eq!(response.location(), Some("/categories"));
}

#[tokio::test]
async fn product_create_stores_price_in_minor_units() {
	let app = app().await;
	let category = app
		.store
		.insert_category(&Category::new("Boxed Sets", None))
		.await
		.unwrap();

	let response = app
		.router
		.handle(Request::post(
			"/product/create",
			&format!("name=Combat+Patrol&category={}&price=20.99&stock=3", category.to_hex()),
		))
		.await
		.unwrap();
	assert!(response.is_redirect());

	let products = app.store.list_products().await.unwrap();
	assert_eq!(products.len(), 1);
	assert_eq!(products[0].price, 2099);
	assert_eq!(products[0].stock, 3);
}

#[tokio::test]
async fn product_edit_form_prefills_the_major_unit_price() {
	let app = app().await;
	let category = app
		.store
		.insert_category(&Category::new("Boxed Sets", None))
		.await
		.unwrap();
	app.router
		.handle(Request::post(
			"/product/create",
			&format!("name=Combat+Patrol&category={}&price=20.99", category.to_hex()),
		))
		.await
		.unwrap();
	let product = &app.store.list_products().await.unwrap()[0];
	let id = product.id.unwrap();

	let response = app
		.router
		.handle(Request::get(&format!(
			"/product/{}/combat-patrol/edit",
			id.to_hex()
		)))
		.await
		.unwrap();

	assert!(body_text(&response).contains("value=\"20.99\""));
}

#[tokio::test]
async fn product_price_with_three_decimals_fails_validation() {
	let app = app().await;
	let category = app
		.store
		.insert_category(&Category::new("Boxed Sets", None))
		.await
		.unwrap();

	let response = app
		.router
		.handle(Request::post(
			"/product/create",
			&format!("name=Combat+Patrol&category={}&price=20.999", category.to_hex()),
		))
		.await
		.unwrap();

	assert!(!response.is_redirect());
	assert!(body_text(&response).contains("at most 2 decimal places"));
	assert!(app.store.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn product_without_price_stores_the_unset_sentinel() {
	let app = app().await;
	let category = app
		.store
		.insert_category(&Category::new("Boxed Sets", None))
		.await
		.unwrap();

	app.router
		.handle(Request::post(
			"/product/create",
			&format!("name=Mystery+Box&category={}", category.to_hex()),
		))
		.await
		.unwrap();

	let product = &app.store.list_products().await.unwrap()[0];
	assert_eq!(product.price, PRICE_UNSET);
	assert_eq!(product.stock, 0);

	// The sentinel pre-fills as an empty price input.
	let response = app
		.router
		.handle(Request::get(&format!(
			"/product/{}/mystery-box/edit",
			product.id.unwrap().to_hex()
		)))
		.await
		.unwrap();
	assert!(body_text(&response).contains("name=\"price\" value=\"\""));
}

#[tokio::test]
async fn product_rejects_subcategory_from_another_category() {
	let app = app().await;
	let marines = app
		.store
		.insert_category(&Category::new("Marines", None))
		.await
		.unwrap();
	let orks = app
		.store
		.insert_category(&Category::new("Orks", None))
		.await
		.unwrap();
	app.router
		.handle(Request::post(
			"/subcategory/create",
			&format!("name=Infantry&category={}", orks.to_hex()),
		))
		.await
		.unwrap();
	let subcategory = &app.store.list_subcategories().await.unwrap()[0];

	let response = app
		.router
		.handle(Request::post(
			"/product/create",
			&format!(
				"name=Intercessors&category={}&subcategory={}",
				marines.to_hex(),
				subcategory.id.unwrap().to_hex()
			),
		))
		.await
		.unwrap();

	assert!(!response.is_redirect());
	assert!(body_text(&response).contains("Chosen subcategory belongs to another category"));
	assert!(app.store.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn gated_category_delete_requires_the_admin_password() {
	let app = app_with_gate(true, Some("secret")).await;
	let id = app
		.store
		.insert_category(&Category::new("Doomed", None))
		.await
		.unwrap();
	let path = format!("/category/{}/doomed/delete", id.to_hex());

	// Wrong password: nothing is deleted.
	let response = app
		.router
		.handle(Request::post(&path, "password=nope"))
		.await
		.unwrap();
	assert!(body_text(&response).contains("Incorrect admin password"));
	assert!(app.store.get_category(id).await.unwrap().is_some());

	// Correct password: the category goes away.
	let response = app
		.router
		.handle(Request::post(&path, "password=secret"))
		.await
		.unwrap();
	assert_eq!(response.location(), Some("/categories"));
	assert!(app.store.get_category(id).await.unwrap().is_none());
}

#[tokio::test]
async fn ungated_delete_ignores_the_password_field() {
	let app = app().await;
	let id = app
		.store
		.insert_category(&Category::new("Doomed", None))
		.await
		.unwrap();

	let response = app
		.router
		.handle(Request::post(
			&format!("/category/{}/doomed/delete", id.to_hex()),
			"",
		))
		.await
		.unwrap();
	assert_eq!(response.location(), Some("/categories"));
}
