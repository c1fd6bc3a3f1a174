//! Session-aware request orchestration.
//!
//! [`SessionClient`] wraps a [`SessionHttpClient`] and a [`Navigator`]. Every request is sent
//! with same-origin credentials; a 401 triggers one shared session refresh followed by a single
//! retry, while unrecoverable outcomes navigate the browsing context instead of failing.

pub mod fetch;
pub mod logout;
pub mod probe;
pub mod refresh;

pub use probe::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{ApiRequest, ApiResponse, Credentials, RequestOptions, SessionHttpClient},
	navigate::Navigator,
	obs::{self, NavigationReason},
	session::SessionDescriptor,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Session client specialized for the crate's default reqwest transport.
pub type ReqwestSessionClient<N> = SessionClient<ReqwestHttpClient, N>;

/// Cookie-session HTTP client bound to a single origin.
///
/// Construct one per browsing context and hand clones to consumers; clones share the
/// transport, navigator, metrics, and the pending-refresh slot, so coalescing spans all of them.
pub struct SessionClient<C, N>
where
	C: ?Sized + SessionHttpClient,
	N: ?Sized + Navigator,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Browsing context that receives redirects.
	pub navigator: Arc<N>,
	/// Origin, endpoints, and routes of the session.
	pub descriptor: SessionDescriptor,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_gate: Arc<RefreshGate>,
}
impl<C, N> SessionClient<C, N>
where
	C: ?Sized + SessionHttpClient,
	N: ?Sized + Navigator,
{
	/// Creates a client that reuses the caller-provided transport + navigator pair.
	pub fn with_http_client(
		descriptor: SessionDescriptor,
		http_client: impl Into<Arc<C>>,
		navigator: impl Into<Arc<N>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			navigator: navigator.into(),
			descriptor,
			refresh_metrics: Default::default(),
			refresh_gate: Default::default(),
		}
	}

	/// Resolves `locator` against the current page and forces same-origin credentials.
	fn prepare(&self, locator: &str, mut options: RequestOptions) -> Result<ApiRequest> {
		options.credentials = Credentials::SameOrigin;

		let url = self.descriptor.resolve(&self.navigator.location(), locator)?;

		Ok(ApiRequest::new(url, self.descriptor.origin(), options))
	}

	async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
		let url = request.url.clone();

		self.http_client.execute(request).await.map_err(|err| TransportError::network(&url, err))
	}

	fn navigate(&self, reason: NavigationReason, target: &str) {
		obs::trace_navigation(reason, target);
		obs::record_navigation_metric(reason);

		self.navigator.navigate(target);
	}
}
#[cfg(feature = "reqwest")]
impl<N> SessionClient<ReqwestHttpClient, N>
where
	N: ?Sized + Navigator,
{
	/// Creates a new client backed by its own reqwest transport and cookie jar.
	pub fn new(descriptor: SessionDescriptor, navigator: impl Into<Arc<N>>) -> Self {
		Self::with_http_client(descriptor, ReqwestHttpClient::default(), navigator)
	}
}
impl<C, N> Clone for SessionClient<C, N>
where
	C: ?Sized + SessionHttpClient,
	N: ?Sized + Navigator,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			navigator: self.navigator.clone(),
			descriptor: self.descriptor.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_gate: self.refresh_gate.clone(),
		}
	}
}
impl<C, N> Debug for SessionClient<C, N>
where
	C: ?Sized + SessionHttpClient,
	N: ?Sized + Navigator,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionClient")
			.field("descriptor", &self.descriptor)
			.field("refresh_pending", &self.refresh_gate.is_pending())
			.finish()
	}
}
