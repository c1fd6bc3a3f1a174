//! Browsing-context navigation seam.
//!
//! Full-page navigations are side effects the client triggers but never observes. They are
//! routed through [`Navigator`] so hosts (a webview bridge, a CLI that prints the target, a test
//! harness) decide what a navigation means.

// self
use crate::_prelude::*;

/// Current page location: path plus search string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
	/// Absolute path, always starting with `/`.
	pub path: String,
	/// Search string including the leading `?`, or empty when there is no query.
	pub search: String,
}
impl Location {
	/// Parses a path-and-query target such as `/dashboard?tab=2#top`.
	///
	/// Fragments are dropped, an empty query (`/a?`) yields an empty search string, and leading
	/// slashes collapse to one so the path can never read as a protocol-relative URL.
	pub fn parse(target: &str) -> Self {
		let target = target.split_once('#').map_or(target, |(head, _)| head);
		let (path, query) = match target.split_once('?') {
			Some((path, query)) => (path, query),
			None => (target, ""),
		};
		let path = format!("/{}", path.trim_start_matches('/'));
		let search = if query.is_empty() { String::new() } else { format!("?{query}") };

		Self { path, search }
	}

	/// Returns the path followed by the search string.
	pub fn path_and_search(&self) -> String {
		format!("{}{}", self.path, self.search)
	}
}
impl Default for Location {
	fn default() -> Self {
		Self { path: "/".into(), search: String::new() }
	}
}
impl Display for Location {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}{}", self.path, self.search)
	}
}

/// Host-provided access to the browsing context.
pub trait Navigator
where
	Self: 'static + Send + Sync,
{
	/// Returns the location of the current page.
	fn location(&self) -> Location;

	/// Navigates the browsing context to `target`.
	///
	/// Navigation is fire-and-forget; implementations must not fail.
	fn navigate(&self, target: &str);
}

/// Thread-safe navigator that keeps the current location and history in-process for tests and
/// headless hosts.
///
/// Like a page whose `location` was just assigned, navigating only records the target; the
/// current location stays put until [`MemoryNavigator::set_location`] simulates the new page.
#[derive(Clone, Debug, Default)]
pub struct MemoryNavigator(Arc<RwLock<NavigatorState>>);
impl MemoryNavigator {
	/// Creates a navigator parked at `target`.
	pub fn at(target: &str) -> Self {
		Self(Arc::new(RwLock::new(NavigatorState {
			location: Location::parse(target),
			history: Vec::new(),
		})))
	}

	/// Moves the current location, as if a new page finished loading.
	pub fn set_location(&self, target: &str) {
		self.0.write().location = Location::parse(target);
	}

	/// Returns every navigation target recorded so far, oldest first.
	pub fn history(&self) -> Vec<String> {
		self.0.read().history.clone()
	}

	/// Returns the most recent navigation target, if any.
	pub fn last_navigation(&self) -> Option<String> {
		self.0.read().history.last().cloned()
	}
}
impl Navigator for MemoryNavigator {
	fn location(&self) -> Location {
		self.0.read().location.clone()
	}

	fn navigate(&self, target: &str) {
		self.0.write().history.push(target.to_owned());
	}
}

#[derive(Debug, Default)]
struct NavigatorState {
	location: Location,
	history: Vec<String>,
}
