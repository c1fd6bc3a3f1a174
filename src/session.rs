//! Session descriptor data structures shared by every client operation.
//!
//! A [`SessionDescriptor`] names the origin that defines "same-origin", the server's auth API
//! endpoints, and the navigation routes used when a session cannot be recovered. Descriptors
//! are plain serde data so hosts can load them from configuration files.

/// Builder API for assembling session descriptors.
pub mod builder;

pub use builder::*;

// crates.io
use url::Origin;
// self
use crate::{_prelude::*, error::ConfigError, navigate::Location};

/// Strategy applied by [`SessionClient::logout`](crate::client::SessionClient::logout).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutStrategy {
	#[default]
	/// Navigate to the server-rendered logout route.
	Navigate,
	/// Call the logout API, ignore its outcome, then navigate to the home route.
	ApiThenHome,
}

/// Auth API endpoints, as absolute paths on the session origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionEndpoints {
	/// Session refresh endpoint (`POST`).
	pub refresh: String,
	/// Logout API endpoint (`POST`), used by [`LogoutStrategy::ApiThenHome`].
	pub logout: String,
	/// Session probe endpoint (`GET`).
	pub me: String,
}
impl Default for SessionEndpoints {
	fn default() -> Self {
		Self {
			refresh: "/api/auth/refresh".into(),
			logout: "/api/auth/logout".into(),
			me: "/api/auth/me".into(),
		}
	}
}

/// Navigation targets used for unrecoverable outcomes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationRoutes {
	/// Login page; receives a `redirect` query parameter.
	pub login: String,
	/// Authorization failure page.
	pub forbidden: String,
	/// Server-rendered logout flow.
	pub logout: String,
	/// Landing page after an API logout.
	pub home: String,
}
impl Default for NavigationRoutes {
	fn default() -> Self {
		Self {
			login: "/login".into(),
			forbidden: "/403".into(),
			logout: "/logout".into(),
			home: "/".into(),
		}
	}
}

/// Immutable session descriptor consumed by [`SessionClient`](crate::client::SessionClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
	/// Origin the session cookies belong to.
	pub origin: Url,
	/// Auth API endpoints.
	#[serde(default)]
	pub endpoints: SessionEndpoints,
	/// Navigation routes.
	#[serde(default)]
	pub routes: NavigationRoutes,
	/// Logout behavior.
	#[serde(default)]
	pub logout_strategy: LogoutStrategy,
}
impl SessionDescriptor {
	/// Creates a new builder for the provided origin.
	pub fn builder(origin: Url) -> SessionDescriptorBuilder {
		SessionDescriptorBuilder::new(origin)
	}

	/// Validates a descriptor obtained through deserialization.
	pub fn validated(self) -> Result<Self, SessionDescriptorError> {
		self.validate()?;

		Ok(self)
	}

	/// Returns the origin used for same-origin credential decisions.
	pub fn origin(&self) -> Origin {
		self.origin.origin()
	}

	/// Resolves an absolute path on the session origin.
	pub fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
		join(&self.origin, path)
	}

	/// Resolves `locator` the way a page at `location` would: absolute URLs pass through and
	/// relative ones resolve against the page URL.
	///
	/// The page always stays on the session origin, even for a path like `//other.host/x`.
	pub fn resolve(&self, location: &Location, locator: &str) -> Result<Url, ConfigError> {
		let mut page = self.origin.clone();

		page.set_path(&location.path);
		page.set_query(location.search.strip_prefix('?'));
		page.set_fragment(None);

		join(&page, locator)
	}

	/// Builds the login navigation target that returns the user to `location` afterwards.
	pub fn login_redirect(&self, location: &Location) -> String {
		format!(
			"{}?redirect={}",
			self.routes.login,
			urlencoding::encode(&location.path_and_search())
		)
	}
}

fn join(base: &Url, locator: &str) -> Result<Url, ConfigError> {
	base.join(locator)
		.map_err(|source| ConfigError::InvalidLocator { locator: locator.to_owned(), source })
}
