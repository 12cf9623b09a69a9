//! stocktake: a server-rendered inventory application.
//!
//! Categories, subcategories, and products live in three MongoDB
//! collections; deleting a category or subcategory reassigns or clears the
//! records that reference it inside one transaction, so readers never see a
//! dangling reference.

pub mod catalog;
pub mod conf;
pub mod db;
pub mod error;
pub mod forms;
pub mod http;
pub mod models;
pub mod pages;
pub mod server;
pub mod store;
pub mod urls;
pub mod views;

pub use error::{Error, Result};
