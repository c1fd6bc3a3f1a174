//! Session probe against the server's `me` endpoint.

// self
use crate::{
	_prelude::*,
	client::SessionClient,
	http::{RequestOptions, SessionHttpClient},
	navigate::Navigator,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Authentication state reported by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
	/// Whether the request carried a valid session.
	pub authenticated: bool,
	/// Account name, present when authenticated.
	#[serde(default)]
	pub username: Option<String>,
	/// Granted roles, e.g. `ROLE_USER`.
	#[serde(default)]
	pub roles: Vec<String>,
}
impl SessionStatus {
	/// Checks whether the session holds `role`.
	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|granted| granted == role)
	}
}

impl<C, N> SessionClient<C, N>
where
	C: ?Sized + SessionHttpClient,
	N: ?Sized + Navigator,
{
	/// Fetches the current [`SessionStatus`] through [`SessionClient::request`], so an expired
	/// session is refreshed first.
	pub async fn current_session(&self) -> Result<SessionStatus> {
		const KIND: FlowKind = FlowKind::SessionProbe;

		let span = FlowSpan::new(KIND, "current_session");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let endpoint = &self.descriptor.endpoints.me;
				let response = self.request(endpoint, RequestOptions::get()).await?;

				if !response.ok() {
					return Err(Error::UnexpectedStatus {
						endpoint: endpoint.to_owned(),
						status: response.status_code(),
					});
				}

				response.json::<SessionStatus>()
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
