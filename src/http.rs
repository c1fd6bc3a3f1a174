//! Transport primitives for session-aware requests.
//!
//! The module exposes [`SessionHttpClient`] alongside the [`ApiRequest`] and [`ApiResponse`]
//! value types so downstream crates can plug in custom HTTP stacks. Implementations must
//! honor [`ApiRequest::sends_credentials`]: cookies are attached, and `Set-Cookie` headers
//! accepted, only when the request's credential policy allows it for the target origin.

pub use ::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};

// std
use std::borrow::Cow;
// crates.io
use ::http::header::{
	AUTHORIZATION, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, COOKIE,
	PROXY_AUTHORIZATION,
};
#[cfg(feature = "reqwest")]
use reqwest::{
	cookie::{CookieStore, Jar},
	header::{LOCATION, SET_COOKIE},
	redirect::Policy,
};
use serde::de::DeserializeOwned;
use url::Origin;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError},
};

/// Redirect hops a transport follows before handing the last 3xx response back.
pub const MAX_REDIRECTS: usize = 20;

/// Boxed future returned by [`SessionHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Cookie inclusion policy applied to a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credentials {
	/// Never send or store cookies.
	Omit,
	#[default]
	/// Send and store cookies only when the target shares the session origin.
	SameOrigin,
	/// Send and store cookies for every target.
	Include,
}
impl Credentials {
	/// Returns whether cookies flow for a request from `origin` to `target`.
	pub fn allows(self, origin: &Origin, target: &Url) -> bool {
		match self {
			Self::Omit => false,
			Self::SameOrigin => &target.origin() == origin,
			Self::Include => true,
		}
	}
}

/// Caller-supplied options bag for a request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// HTTP method, `GET` unless overridden.
	pub method: Method,
	/// Extra request headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Cookie policy; the session client always overrides it with [`Credentials::SameOrigin`].
	pub credentials: Credentials,
}
impl RequestOptions {
	/// Options for a `GET` request.
	pub fn get() -> Self {
		Self::default()
	}

	/// Options for a `POST` request without a body.
	pub fn post() -> Self {
		Self::default().method(Method::POST)
	}

	/// Overrides the HTTP method.
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets a raw request body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `value` as the JSON request body and sets the content type.
	pub fn json<T>(self, value: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(value)?;

		Ok(self.header(CONTENT_TYPE, HeaderValue::from_static("application/json")).body(body))
	}

	/// Requests a cookie policy. Session clients replace it with [`Credentials::SameOrigin`].
	pub fn credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = credentials;

		self
	}
}

/// Fully resolved request handed to a [`SessionHttpClient`].
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// Absolute target URL.
	pub url: Url,
	/// Origin of the session issuing the request.
	pub origin: Origin,
	/// HTTP method.
	pub method: Method,
	/// Request headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Cookie policy in effect.
	pub credentials: Credentials,
}
impl ApiRequest {
	/// Builds a request for `url` issued from `origin` with the caller's options.
	pub fn new(url: Url, origin: Origin, options: RequestOptions) -> Self {
		let RequestOptions { method, headers, body, credentials } = options;

		Self { url, origin, method, headers, body, credentials }
	}

	/// Returns whether the transport should attach and store cookies for this request.
	pub fn sends_credentials(&self) -> bool {
		self.credentials.allows(&self.origin, &self.url)
	}

	/// Builds the follow-up request for a redirect response, or `None` when `status` is not a
	/// followable redirect or `location` cannot be resolved.
	///
	/// `301`/`302` after `POST` and `303` after anything but `HEAD` become a body-less `GET`;
	/// `307`/`308` replay the request as is. Authorization and cookie headers are dropped once
	/// the chain leaves the current origin.
	pub fn redirected(&self, status: StatusCode, location: &str) -> Option<Self> {
		let url = self.url.join(location).ok()?;
		let becomes_get = match status.as_u16() {
			301 | 302 => self.method == Method::POST,
			303 => self.method != Method::HEAD,
			307 | 308 => false,
			_ => return None,
		};
		let mut next = self.clone();

		if becomes_get {
			next.method = Method::GET;
			next.body = None;

			for name in [CONTENT_TYPE, CONTENT_LENGTH, CONTENT_ENCODING, CONTENT_LANGUAGE] {
				next.headers.remove(name);
			}
		}
		if url.origin() != self.url.origin() {
			for name in [AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION] {
				next.headers.remove(name);
			}
		}

		next.url = url;

		Some(next)
	}
}

/// Buffered HTTP response passed back to callers unchanged.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Final URL after redirects.
	pub url: Url,
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for statuses in the `200..=299` range.
	pub fn ok(&self) -> bool {
		self.status.is_success()
	}

	/// Returns the numeric status code.
	pub fn status_code(&self) -> u16 {
		self.status.as_u16()
	}

	/// Returns the body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Decodes the body as JSON into `T`.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let de = &mut serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(de)
			.map_err(|source| DecodeError::Json { source, status: self.status_code() }.into())
	}
}

/// Abstraction over HTTP transports able to execute session requests.
///
/// The trait is the client's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can back many clients, and the futures they return
/// must be `Send` so request flows can hop executors.
pub trait SessionHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Dispatches `request` and buffers the response.
	///
	/// Only transport failures are errors; every HTTP status is a successful [`ApiResponse`].
	fn execute(&self, request: ApiRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Reqwest transport paired with a cookie jar that is consulted per request.
///
/// The jar is not installed as reqwest's cookie provider; the transport attaches and stores
/// cookies itself, and follows redirects itself, so [`Credentials`] is enforced on every hop.
/// Clients passed to [`ReqwestHttpClient::with_client`] should disable reqwest's own redirect
/// handling with [`Policy::none`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient {
	client: ReqwestClient,
	jar: Arc<Jar>,
}
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`] with an empty cookie jar.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, jar: Default::default() }
	}

	/// Replaces the cookie jar, e.g. to share cookies between transports.
	pub fn with_jar(mut self, jar: Arc<Jar>) -> Self {
		self.jar = jar;

		self
	}

	/// Returns the cookie jar backing this transport.
	pub fn jar(&self) -> &Arc<Jar> {
		&self.jar
	}
}
#[cfg(feature = "reqwest")]
impl Default for ReqwestHttpClient {
	fn default() -> Self {
		// Only a broken TLS backend fails here, and `ReqwestClient::default` reports that too.
		let client =
			ReqwestClient::builder().redirect(Policy::none()).build().unwrap_or_default();

		Self::with_client(client)
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestHttpClient").field("client", &self.client).finish_non_exhaustive()
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl SessionHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: ApiRequest) -> HttpFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let mut request = request;
			let mut hops = 0;

			loop {
				let credentialed = request.sends_credentials();
				let mut builder = self
					.client
					.request(request.method.clone(), request.url.clone())
					.headers(request.headers.clone());

				if credentialed {
					if let Some(cookie) = self.jar.cookies(&request.url) {
						builder = builder.header(COOKIE, cookie);
					}
				}
				if let Some(body) = &request.body {
					builder = builder.body(body.clone());
				}

				let response = builder.send().await?;
				let status = response.status();
				let headers = response.headers().to_owned();

				if credentialed {
					let mut cookies = headers.get_all(SET_COOKIE).iter();

					self.jar.set_cookies(&mut cookies, &request.url);
				}

				let next = headers
					.get(LOCATION)
					.and_then(|location| location.to_str().ok())
					.filter(|_| hops < MAX_REDIRECTS)
					.and_then(|location| request.redirected(status, location));

				if let Some(next) = next {
					request = next;
					hops += 1;

					continue;
				}

				let body = response.bytes().await?.to_vec();

				return Ok(ApiResponse { url: request.url, status, headers, body });
			}
		})
	}
}
