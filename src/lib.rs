//! Cookie-session HTTP client with same-origin credentials, single-flight session refresh with a
//! single retry, and navigation hooks for login and forbidden redirects.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod error;
pub mod http;
pub mod navigate;
pub mod obs;
pub mod session;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::SessionClient, http::ReqwestHttpClient, navigate::MemoryNavigator,
		session::SessionDescriptor,
	};

	/// Session client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = SessionClient<ReqwestHttpClient, MemoryNavigator>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests and leaves redirects to the transport.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a descriptor with default endpoints and routes for the provided origin.
	pub fn test_descriptor(origin: &str) -> SessionDescriptor {
		SessionDescriptor::builder(Url::parse(origin).expect("Test origin should parse."))
			.build()
			.expect("Test descriptor should build successfully.")
	}

	/// Constructs a [`SessionClient`] backed by the reqwest transport and an in-memory
	/// navigator parked at `location`.
	pub fn build_reqwest_test_client(
		descriptor: SessionDescriptor,
		location: &str,
	) -> (ReqwestTestClient, Arc<MemoryNavigator>) {
		let navigator = Arc::new(MemoryNavigator::at(location));
		let client =
			SessionClient::with_http_client(descriptor, test_reqwest_http_client(), navigator.clone());

		(client, navigator)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::OnceCell as AsyncOnceCell;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
