// self
use crate::{
	_prelude::*,
	session::{LogoutStrategy, NavigationRoutes, SessionDescriptor, SessionEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum SessionDescriptorError {
	/// Origin must be an http(s) URL with a host.
	#[error("Session origin must be an http(s) URL with a host: {url}.")]
	UnsupportedOrigin {
		/// Origin URL that failed validation.
		url: String,
	},
	/// Endpoints and routes must be absolute paths without query or fragment.
	#[error("The {field} path must be an absolute path without query or fragment: {path}.")]
	InvalidPath {
		/// Which endpoint or route failed validation.
		field: &'static str,
		/// Offending path.
		path: String,
	},
}

/// Builder for [`SessionDescriptor`] values.
#[derive(Debug)]
pub struct SessionDescriptorBuilder {
	/// Origin the session cookies belong to.
	pub origin: Url,
	/// Auth API endpoints.
	pub endpoints: SessionEndpoints,
	/// Navigation routes.
	pub routes: NavigationRoutes,
	/// Logout behavior.
	pub logout_strategy: LogoutStrategy,
}
impl SessionDescriptorBuilder {
	/// Creates a new builder seeded with the provided origin and default paths.
	pub fn new(origin: Url) -> Self {
		Self {
			origin,
			endpoints: SessionEndpoints::default(),
			routes: NavigationRoutes::default(),
			logout_strategy: LogoutStrategy::default(),
		}
	}

	/// Sets the refresh endpoint path.
	pub fn refresh_endpoint(mut self, path: impl Into<String>) -> Self {
		self.endpoints.refresh = path.into();

		self
	}

	/// Sets the logout API endpoint path.
	pub fn logout_endpoint(mut self, path: impl Into<String>) -> Self {
		self.endpoints.logout = path.into();

		self
	}

	/// Sets the session probe endpoint path.
	pub fn me_endpoint(mut self, path: impl Into<String>) -> Self {
		self.endpoints.me = path.into();

		self
	}

	/// Sets the login route.
	pub fn login_route(mut self, path: impl Into<String>) -> Self {
		self.routes.login = path.into();

		self
	}

	/// Sets the forbidden route.
	pub fn forbidden_route(mut self, path: impl Into<String>) -> Self {
		self.routes.forbidden = path.into();

		self
	}

	/// Sets the server-rendered logout route.
	pub fn logout_route(mut self, path: impl Into<String>) -> Self {
		self.routes.logout = path.into();

		self
	}

	/// Sets the home route.
	pub fn home_route(mut self, path: impl Into<String>) -> Self {
		self.routes.home = path.into();

		self
	}

	/// Overrides the logout strategy.
	pub fn logout_strategy(mut self, strategy: LogoutStrategy) -> Self {
		self.logout_strategy = strategy;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<SessionDescriptor, SessionDescriptorError> {
		let descriptor = SessionDescriptor {
			origin: self.origin,
			endpoints: self.endpoints,
			routes: self.routes,
			logout_strategy: self.logout_strategy,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl SessionDescriptor {
	/// Validates invariants for the descriptor.
	pub(crate) fn validate(&self) -> Result<(), SessionDescriptorError> {
		validate_origin(&self.origin)?;
		validate_path("refresh endpoint", &self.endpoints.refresh)?;
		validate_path("logout endpoint", &self.endpoints.logout)?;
		validate_path("me endpoint", &self.endpoints.me)?;
		validate_path("login route", &self.routes.login)?;
		validate_path("forbidden route", &self.routes.forbidden)?;
		validate_path("logout route", &self.routes.logout)?;
		validate_path("home route", &self.routes.home)?;

		Ok(())
	}
}

fn validate_origin(url: &Url) -> Result<(), SessionDescriptorError> {
	if matches!(url.scheme(), "http" | "https") && url.host().is_some() {
		Ok(())
	} else {
		Err(SessionDescriptorError::UnsupportedOrigin { url: url.to_string() })
	}
}

fn validate_path(field: &'static str, path: &str) -> Result<(), SessionDescriptorError> {
	if path.starts_with('/') && !path.starts_with("//") && !path.contains(['?', '#']) {
		Ok(())
	} else {
		Err(SessionDescriptorError::InvalidPath { field, path: path.to_owned() })
	}
}
