//! Client-level error types shared across requests, refreshes, and configuration.

// self
use crate::{_prelude::*, session::SessionDescriptorError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS) of an application request.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The shared session refresh failed before any response arrived.
	///
	/// Every caller coalesced onto the same refresh observes the same source.
	#[error("Session refresh failed at the transport level.")]
	RefreshTransport {
		/// Transport failure shared by all coalesced callers.
		#[source]
		source: Arc<TransportError>,
	},
	/// A helper expecting a successful response received another status.
	#[error("Endpoint `{endpoint}` responded with unexpected status {status}.")]
	UnexpectedStatus {
		/// Path of the endpoint that was called.
		endpoint: String,
		/// HTTP status code of the final response.
		status: u16,
	},
}

impl From<SessionDescriptorError> for Error {
	fn from(e: SessionDescriptorError) -> Self {
		ConfigError::from(e).into()
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request locator cannot be resolved into a URL.
	#[error("Request locator `{locator}` is invalid.")]
	InvalidLocator {
		/// Locator supplied by the caller.
		locator: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Session descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] SessionDescriptorError),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialize(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target of the failed request.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error raised while calling `url`.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

/// Body decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body was not the expected JSON document.
	#[error("Response body is malformed JSON.")]
	Json {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
}
