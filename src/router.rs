//! Console route table and navigation driver.
//!
//! DESIGN
//! ======
//! The route table is static. [`Router::navigate`] runs the navigation guard
//! as the pre-hook on every hop, follows guard redirects and route-level
//! redirects (`/` → `/index`) until a concrete route is reached, commits the
//! new location, and then runs the post-hook, which only traces.
//!
//! A redirect chain longer than [`MAX_REDIRECTS`] is reported as an error
//! instead of spinning.

use crate::error::ErrorCode;
use crate::guard::{LOGIN_PATH, NavigationGuard, NavigationRequest, REDIRECT_PARAM, ROOT_PATH, decode_query_value};

/// Hops allowed before a navigation is declared a loop.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("navigation to {target} did not settle after {hops} redirects")]
    RedirectLoop { target: String, hops: usize },
}

impl ErrorCode for RouterError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RedirectLoop { .. } => "E_REDIRECT_LOOP",
        }
    }
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

/// Screen a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Login,
    Layout,
    Home,
    StreamingSetting,
    CoilDetection,
    UserManagement,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RouteMeta {
    pub title: &'static str,
    pub icon: &'static str,
    /// Hidden routes never show in the sidebar menu.
    pub hidden: bool,
    /// Affixed routes stay pinned in the tab bar.
    pub affix: bool,
}

const HIDDEN: RouteMeta = RouteMeta { title: "", icon: "", hidden: true, affix: false };

const fn menu_entry(title: &'static str) -> RouteMeta {
    RouteMeta { title, icon: "dashboard", hidden: false, affix: true }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RouteRecord {
    /// Exact path; `None` marks the catch-all.
    pub path: Option<&'static str>,
    pub name: &'static str,
    pub view: View,
    pub redirect: Option<&'static str>,
    pub meta: RouteMeta,
}

pub const INDEX_PATH: &str = "/index";

/// Routes of the console, in match order.
pub const CONSOLE_ROUTES: &[RouteRecord] = &[
    RouteRecord { path: Some(LOGIN_PATH), name: "login", view: View::Login, redirect: None, meta: HIDDEN },
    RouteRecord { path: Some(ROOT_PATH), name: "layout", view: View::Layout, redirect: Some(INDEX_PATH), meta: HIDDEN },
    RouteRecord { path: Some(INDEX_PATH), name: "index", view: View::Home, redirect: None, meta: menu_entry("Home") },
    RouteRecord {
        path: Some("/setting"),
        name: "setting",
        view: View::StreamingSetting,
        redirect: None,
        meta: menu_entry("YOLO Detection"),
    },
    RouteRecord {
        path: Some("/coil"),
        name: "coil",
        view: View::CoilDetection,
        redirect: None,
        meta: menu_entry("Coil Detection"),
    },
    RouteRecord {
        path: Some("/user"),
        name: "user",
        view: View::UserManagement,
        redirect: None,
        meta: menu_entry("User Management"),
    },
    RouteRecord { path: None, name: "not-found", view: View::NotFound, redirect: None, meta: HIDDEN },
];

// =============================================================================
// LOCATION
// =============================================================================

/// A path plus its raw query pairs. Values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let path = if path.is_empty() { ROOT_PATH.to_owned() } else { path.to_owned() };
        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key.to_owned(), value.to_owned())
            })
            .collect();
        Self { path, query }
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Where to go once the user has logged in from this location. Only
    /// same-origin paths are honoured; `//host` is not one.
    #[must_use]
    pub fn post_login_target(&self) -> String {
        match self.query_value(REDIRECT_PARAM).map(decode_query_value) {
            Some(target) if target.starts_with('/') && !target.starts_with("//") => target,
            _ => ROOT_PATH.to_owned(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// A settled navigation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Resolved {
    pub location: Location,
    pub route: RouteRecord,
    /// Set when the final location differs from the requested one.
    pub redirected_from: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Router {
    guard: NavigationGuard,
    routes: &'static [RouteRecord],
    current: Location,
}

impl Router {
    #[must_use]
    pub fn new(guard: NavigationGuard) -> Self {
        Self::with_routes(guard, CONSOLE_ROUTES)
    }

    #[must_use]
    pub fn with_routes(guard: NavigationGuard, routes: &'static [RouteRecord]) -> Self {
        Self { guard, routes, current: Location::parse(ROOT_PATH) }
    }

    #[must_use]
    pub fn current(&self) -> &Location {
        &self.current
    }

    /// Resolve and commit a navigation.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RedirectLoop`] when redirects do not settle.
    pub fn navigate(&mut self, target: &str) -> Result<Resolved, RouterError> {
        let requested = Location::parse(target);
        let mut location = requested.clone();

        for _ in 0..MAX_REDIRECTS {
            let request = NavigationRequest::new(location.path.clone(), self.current.path.clone());
            if let Some(next) = self.guard.resolve(&request).location() {
                location = Location::parse(&next);
                continue;
            }
            let route = self.match_route(&location.path);
            if let Some(next) = route.redirect {
                location = Location::parse(next);
                continue;
            }

            let from = std::mem::replace(&mut self.current, location.clone());
            after_each(&from, &location);
            let redirected_from = (location != requested).then(|| requested.to_string());
            return Ok(Resolved { location, route, redirected_from });
        }

        Err(RouterError::RedirectLoop { target: requested.to_string(), hops: MAX_REDIRECTS })
    }

    /// Routes shown in the sidebar.
    #[must_use]
    pub fn menu(&self) -> Vec<RouteRecord> {
        self.routes.iter().filter(|r| !r.meta.hidden).copied().collect()
    }

    fn match_route(&self, path: &str) -> RouteRecord {
        self.routes
            .iter()
            .find(|r| r.path == Some(path))
            .or_else(|| self.routes.iter().find(|r| r.path.is_none()))
            .copied()
            .unwrap_or(RouteRecord { path: None, name: "not-found", view: View::NotFound, redirect: None, meta: HIDDEN })
    }
}

fn after_each(from: &Location, to: &Location) {
    tracing::debug!(%from, %to, "navigation settled");
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
