#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use session_fetch::{
	_preludet::*,
	http::{Credentials, Method, RequestOptions, StatusCode},
};

const LIST: &str = "/api/as/list";
const REFRESH: &str = "/api/auth/refresh";

#[tokio::test]
async fn expired_session_refreshes_and_retries_once() {
	let server = MockServer::start_async().await;
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/as/list");
	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path(LIST).header_missing("cookie");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200)
				.header("set-cookie", "accessToken=fresh; Path=/; HttpOnly")
				.header("content-type", "application/json")
				.body("{\"ok\":true}");
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path(LIST).header("cookie", "accessToken=fresh");
			then.status(200).header("content-type", "application/json").body("[1,2,3]");
		})
		.await;
	let response = client
		.request(LIST, RequestOptions::get())
		.await
		.expect("Request should recover after the session refresh.");

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.json::<Vec<u32>>().expect("Retry body should decode."), vec![1, 2, 3]);
	assert!(navigator.history().is_empty());
	assert!(!client.refresh_pending());
	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.refresh_metrics.successes(), 1);

	expired.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	fresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn retried_unauthorized_response_is_returned_without_looping() {
	let server = MockServer::start_async().await;
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/as/list");
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path(LIST);
			then.status(401).body("still expired");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200);
		})
		.await;
	let response = client
		.request(LIST, RequestOptions::get())
		.await
		.expect("A second 401 is returned, not raised.");

	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(response.text(), "still expired");
	assert_eq!(response.url.path(), LIST);
	assert!(navigator.history().is_empty());

	list.assert_calls_async(2).await;
	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_expiries_share_one_refresh() {
	let server = MockServer::start_async().await;
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/as/list");
	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path(LIST).header_missing("cookie");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200)
				.header("set-cookie", "accessToken=shared; Path=/")
				.delay(std::time::Duration::from_millis(300));
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path(LIST).header("cookie", "accessToken=shared");
			then.status(200).body("ok");
		})
		.await;
	let (a, b, c, d) = tokio::join!(
		client.request(LIST, RequestOptions::get()),
		client.request(LIST, RequestOptions::get()),
		client.request(LIST, RequestOptions::get()),
		client.request(LIST, RequestOptions::get()),
	);

	for response in [a, b, c, d] {
		let response = response.expect("Every coalesced caller should recover.");

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.text(), "ok");
	}

	assert!(navigator.history().is_empty());
	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.refresh_metrics.coalesced(), 3);

	expired.assert_calls_async(4).await;
	refresh.assert_calls_async(1).await;
	fresh.assert_calls_async(4).await;
}

#[tokio::test]
async fn concurrent_expiries_share_one_failed_refresh() {
	let server = MockServer::start_async().await;
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/as/list?page=2");
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path(LIST);
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(401).body("refresh expired").delay(std::time::Duration::from_millis(300));
		})
		.await;
	let cloned = client.clone();
	let (a, b, c) = tokio::join!(
		client.request(LIST, RequestOptions::get()),
		cloned.request(LIST, RequestOptions::get()),
		client.request(LIST, RequestOptions::get()),
	);

	for response in [a, b, c] {
		let response = response.expect("A failed refresh response is returned, not raised.");

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert_eq!(response.url.path(), REFRESH);
		assert_eq!(response.text(), "refresh expired");
	}

	assert_eq!(navigator.history(), vec!["/login?redirect=%2Fas%2Flist%3Fpage%3D2"; 3]);
	assert_eq!(client.refresh_metrics.failures(), 1);

	list.assert_calls_async(3).await;
	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn failed_refresh_redirects_to_login_with_encoded_location() {
	let server = MockServer::start_async().await;
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/dashboard?tab=2");
	let stats = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/dashboard/stats");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(401);
		})
		.await;
	let response = client
		.request("/api/dashboard/stats", RequestOptions::get())
		.await
		.expect("Refresh failures are returned as responses.");

	assert_eq!(response.url.path(), REFRESH);
	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(
		navigator.last_navigation().as_deref(),
		Some("/login?redirect=%2Fdashboard%3Ftab%3D2")
	);

	stats.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn settled_refresh_is_not_reused() {
	let server = MockServer::start_async().await;
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/as/list");
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path(LIST);
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(500);
		})
		.await;

	for _ in 0..2 {
		let response = client
			.request(LIST, RequestOptions::get())
			.await
			.expect("Refresh failures are returned as responses.");

		assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(!client.refresh_pending());
	}

	assert_eq!(navigator.history().len(), 2);
	assert_eq!(client.refresh_metrics.attempts(), 2);
	assert_eq!(client.refresh_metrics.coalesced(), 0);

	list.assert_calls_async(2).await;
	refresh.assert_calls_async(2).await;
}

#[tokio::test]
async fn forbidden_response_is_returned_and_redirects() {
	let server = MockServer::start_async().await;
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/admin/users");
	let users = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/admin/users/9");
			then.status(403).body("denied");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200);
		})
		.await;
	let response = client
		.request("/api/admin/users/9", RequestOptions::default().method(Method::DELETE))
		.await
		.expect("Forbidden responses are returned, not raised.");

	assert_eq!(response.status, StatusCode::FORBIDDEN);
	assert_eq!(response.text(), "denied");
	assert_eq!(navigator.history(), vec!["/403"]);

	users.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn other_statuses_pass_through_without_side_effects() {
	let server = MockServer::start_async().await;
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/as/list");
	let missing = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/as/404");
			then.status(404).body("no such item");
		})
		.await;
	let broken = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/as").body("{\"title\":\"pump\"}");
			then.status(500);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH);
			then.status(200);
		})
		.await;
	let response = client
		.request("/api/as/404", RequestOptions::get())
		.await
		.expect("404 responses pass through.");

	assert_eq!(response.status, StatusCode::NOT_FOUND);
	assert_eq!(response.text(), "no such item");

	let response = client
		.request(
			"/api/as",
			RequestOptions::post()
				.json(&serde_json::json!({ "title": "pump" }))
				.expect("JSON body should serialize."),
		)
		.await
		.expect("500 responses pass through.");

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(navigator.history().is_empty());

	missing.assert_calls_async(1).await;
	broken.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn session_cookies_follow_same_origin_policy() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let other = MockServer::start_async().await;
	let (client, _navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/as/list");
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200).header("set-cookie", "accessToken=abc; Path=/");
		})
		.await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path(LIST).header("cookie", "accessToken=abc");
			then.status(200);
		})
		.await;
	let foreign = other
		.mock_async(|when, then| {
			when.method(GET).path("/feed").header_missing("cookie");
			then.status(200);
		})
		.await;

	client.request("/api/auth/login", RequestOptions::post()).await?;

	// An explicit opt-out is overridden by the forced same-origin policy.
	let response =
		client.request(LIST, RequestOptions::get().credentials(Credentials::Omit)).await?;

	assert_eq!(response.status, StatusCode::OK);

	let response = client
		.request(&other.url("/feed"), RequestOptions::get().credentials(Credentials::Include))
		.await?;

	assert_eq!(response.status, StatusCode::OK);

	login.assert_calls_async(1).await;
	list.assert_calls_async(1).await;
	foreign.assert_calls_async(1).await;

	Ok(())
}

#[tokio::test]
async fn redirect_hops_store_and_scope_cookies() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let other = MockServer::start_async().await;
	let (client, _navigator) =
		build_reqwest_test_client(test_descriptor(&server.base_url()), "/login");
	let sso = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/sso").body("ticket=42");
			then.status(303)
				.header("set-cookie", "accessToken=hop; Path=/")
				.header("location", "/api/landing");
		})
		.await;
	let landing = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/landing").header("cookie", "accessToken=hop");
			then.status(307).header("location", other.url("/feed"));
		})
		.await;
	let feed = other
		.mock_async(|when, then| {
			when.method(GET).path("/feed").header_missing("cookie");
			then.status(200).body("feed");
		})
		.await;
	let response =
		client.request("/api/auth/sso", RequestOptions::post().body("ticket=42")).await?;

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(response.text(), "feed");
	assert_eq!(response.url.as_str(), other.url("/feed"));

	sso.assert_calls_async(1).await;
	landing.assert_calls_async(1).await;
	feed.assert_calls_async(1).await;

	Ok(())
}

#[tokio::test]
async fn unreachable_server_propagates_transport_error() {
	let port = std::net::TcpListener::bind("127.0.0.1:0")
		.and_then(|listener| listener.local_addr())
		.expect("An ephemeral port should be available.")
		.port();
	let (client, navigator) =
		build_reqwest_test_client(test_descriptor(&format!("http://127.0.0.1:{port}")), "/as/list");
	let err = client
		.request(LIST, RequestOptions::get())
		.await
		.expect_err("Connection failures should surface to the caller.");

	assert!(matches!(err, Error::Transport(_)));
	assert!(navigator.history().is_empty());
	assert_eq!(client.refresh_metrics.attempts(), 0);
}
