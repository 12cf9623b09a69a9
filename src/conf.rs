//! Environment-driven application settings.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Prefix for every environment variable the application reads
const ENV_PREFIX: &str = "STOCKTAKE_";

/// Runtime configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct Settings {
	/// MongoDB connection string
	pub mongodb_uri: String,
	/// Database name holding the three catalog collections
	pub database: String,
	/// Address the HTTP server binds to
	pub bind_addr: SocketAddr,
	/// Directory the Tera engine loads templates from
	pub template_dir: PathBuf,
	/// Whether category/subcategory deletion requires the admin password
	pub require_delete_password: bool,
	/// Admin password; required when the delete gate is enabled
	pub admin_password: Option<String>,
}

impl Settings {
	/// Load settings from `STOCKTAKE_*` environment variables.
	///
	/// Only the connection string is mandatory; everything else has a
	/// development-friendly default.
	pub fn from_env() -> Result<Self> {
		let env = Env::with_prefix(ENV_PREFIX);

		let mongodb_uri = env.required("MONGODB_URI")?;
		let database = env.str("DATABASE", "stocktake");
		let bind_addr = env
			.str("BIND_ADDR", "127.0.0.1:8000")
			.parse::<SocketAddr>()
			.map_err(|e| Error::Config(format!("invalid bind address: {e}")))?;
		let template_dir = PathBuf::from(env.str("TEMPLATE_DIR", "templates"));
		let require_delete_password = env.bool("REQUIRE_DELETE_PASSWORD", false)?;
		let admin_password = env.optional("ADMIN_PASSWORD");

		if require_delete_password && admin_password.is_none() {
			return Err(Error::Config(
				"STOCKTAKE_REQUIRE_DELETE_PASSWORD is set but STOCKTAKE_ADMIN_PASSWORD is not"
					.to_string(),
			));
		}

		Ok(Self {
			mongodb_uri,
			database,
			bind_addr,
			template_dir,
			require_delete_password,
			admin_password,
		})
	}
}

/// Environment variable accessor with prefix support
struct Env {
	prefix: &'static str,
}

impl Env {
	fn with_prefix(prefix: &'static str) -> Self {
		Self { prefix }
	}

	fn key(&self, name: &str) -> String {
		format!("{}{}", self.prefix, name)
	}

	fn optional(&self, name: &str) -> Option<String> {
		env::var(self.key(name)).ok().filter(|v| !v.is_empty())
	}

	fn required(&self, name: &str) -> Result<String> {
		self.optional(name)
			.ok_or_else(|| Error::Config(format!("missing environment variable {}", self.key(name))))
	}

	fn str(&self, name: &str, default: &str) -> String {
		self.optional(name).unwrap_or_else(|| default.to_string())
	}

	fn bool(&self, name: &str, default: bool) -> Result<bool> {
		match self.optional(name) {
			None => Ok(default),
			Some(raw) => match raw.to_ascii_lowercase().as_str() {
				"1" | "true" | "yes" | "on" => Ok(true),
				"0" | "false" | "no" | "off" => Ok(false),
				_ => Err(Error::Config(format!(
					"invalid boolean for {}: {raw}",
					self.key(name)
				))),
			},
		}
	}
}
