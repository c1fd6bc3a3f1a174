//! Logout navigation.

// self
use crate::{
	client::SessionClient,
	http::{ApiRequest, RequestOptions, SessionHttpClient},
	navigate::Navigator,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, NavigationReason},
	session::LogoutStrategy,
};

impl<C, N> SessionClient<C, N>
where
	C: ?Sized + SessionHttpClient,
	N: ?Sized + Navigator,
{
	/// Ends the session according to the descriptor's [`LogoutStrategy`].
	///
	/// [`LogoutStrategy::Navigate`] only navigates to the logout route. With
	/// [`LogoutStrategy::ApiThenHome`] the logout endpoint is called first; its outcome is
	/// ignored and the browsing context always lands on the home route.
	pub async fn logout(&self) {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		span.instrument(async move {
			match self.descriptor.logout_strategy {
				LogoutStrategy::Navigate =>
					self.navigate(NavigationReason::Logout, &self.descriptor.routes.logout),
				LogoutStrategy::ApiThenHome => {
					if let Ok(url) = self.descriptor.endpoint_url(&self.descriptor.endpoints.logout)
					{
						let request =
							ApiRequest::new(url, self.descriptor.origin(), RequestOptions::post());
						let _ = self.dispatch(request).await;
					}

					self.navigate(NavigationReason::Logout, &self.descriptor.routes.home);
				},
			}
		})
		.await;

		obs::record_flow_outcome(KIND, FlowOutcome::Success);
	}
}
