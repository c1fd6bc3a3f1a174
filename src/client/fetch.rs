//! The wrapped request: same-origin credentials, refresh-and-retry on 401, redirects on
//! unrecoverable outcomes.

// crates.io
use ::http::StatusCode;
// self
use crate::{
	_prelude::*,
	client::SessionClient,
	http::{ApiRequest, ApiResponse, RequestOptions, SessionHttpClient},
	navigate::Navigator,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, NavigationReason},
};

impl<C, N> SessionClient<C, N>
where
	C: ?Sized + SessionHttpClient,
	N: ?Sized + Navigator,
{
	/// Sends `locator` with `options`, recovering from an expired session once.
	///
	/// The credential policy in `options` is always replaced with same-origin cookies.
	///
	/// - `401`: refresh the session (shared with concurrent callers). On success the request is
	///   reissued exactly once and that response is returned whatever its status. On failure the
	///   browsing context goes to the login route and the refresh response is returned, or
	///   [`Error::RefreshTransport`] when the refresh never produced one.
	/// - `403`: the browsing context goes to the forbidden route and the response is returned.
	/// - Anything else is returned untouched.
	///
	/// Transport failures of the initial or retried request surface as [`Error::Transport`].
	pub async fn request(&self, locator: &str, options: RequestOptions) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "request");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.prepare(locator, options)?;
				let response = self.dispatch(request.clone()).await?;

				match response.status {
					status if status == StatusCode::UNAUTHORIZED =>
						self.recover_session(request).await,
					status if status == StatusCode::FORBIDDEN => {
						self.navigate(NavigationReason::Forbidden, &self.descriptor.routes.forbidden);

						Ok(response)
					},
					_ => Ok(response),
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn recover_session(&self, request: ApiRequest) -> Result<ApiResponse> {
		match self.refresh_session().await {
			Ok(refresh) if refresh.ok() => Ok(self.dispatch(request).await?),
			Ok(refresh) => {
				self.redirect_to_login();

				Ok(refresh)
			},
			Err(err) => {
				self.redirect_to_login();

				Err(err)
			},
		}
	}

	fn redirect_to_login(&self) {
		let target = self.descriptor.login_redirect(&self.navigator.location());

		self.navigate(NavigationReason::LoginRequired, &target);
	}
}
