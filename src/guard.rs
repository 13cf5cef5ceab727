//! Navigation guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Installed as the router's pre-navigation hook. Every transition, the
//! first load included, is resolved here against the session's recognition
//! state and the route whitelist. No network, no state of its own.
//!
//! | recognized | target           | decision                     |
//! |------------|------------------|------------------------------|
//! | yes        | `/login`         | redirect to `/`              |
//! | yes        | anything else    | proceed                      |
//! | no         | whitelisted      | proceed                      |
//! | no         | anything else    | redirect to `/login?redirect=<target>` |

use std::collections::BTreeSet;

use crate::session::SessionHandle;

pub const LOGIN_PATH: &str = "/login";
pub const ROOT_PATH: &str = "/";
/// Query key carrying the post-login destination.
pub const REDIRECT_PARAM: &str = "redirect";

/// Paths reachable without a session. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteWhitelist {
    paths: BTreeSet<String>,
}

impl RouteWhitelist {
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { paths: paths.into_iter().map(Into::into).collect() }
    }

    /// Whitelist holding only the login page.
    #[must_use]
    pub fn login_only() -> Self {
        Self::new([LOGIN_PATH])
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }
}

impl Default for RouteWhitelist {
    fn default() -> Self {
        Self::login_only()
    }
}

/// One attempted route transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub target_path: String,
    pub origin_path: String,
}

impl NavigationRequest {
    pub fn new(target_path: impl Into<String>, origin_path: impl Into<String>) -> Self {
        Self { target_path: target_path.into(), origin_path: origin_path.into() }
    }
}

/// Outcome of guarding a [`NavigationRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    RedirectRoot,
    RedirectLogin { redirect: String },
}

impl GuardDecision {
    /// Location to navigate to instead, `None` when the transition proceeds.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Proceed => None,
            Self::RedirectRoot => Some(ROOT_PATH.to_owned()),
            Self::RedirectLogin { redirect } => {
                Some(format!("{LOGIN_PATH}?{REDIRECT_PARAM}={}", encode_query_value(redirect)))
            }
        }
    }
}

/// Escape the characters that would end or split a query value. Slashes and
/// everything else stay readable.
#[must_use]
pub fn encode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '#' => out.push_str("%23"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`encode_query_value`]. Unknown escapes are left as written.
#[must_use]
pub fn decode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(at) = rest.find('%') {
        out.push_str(&rest[..at]);
        let escape = rest.get(at..at + 3);
        let decoded = match escape {
            Some("%25") => Some('%'),
            Some("%26") => Some('&'),
            Some("%23") => Some('#'),
            _ => None,
        };
        if let Some(c) = decoded {
            out.push(c);
            rest = &rest[at + 3..];
        } else {
            out.push('%');
            rest = &rest[at + 1..];
        }
    }
    out.push_str(rest);
    out
}

/// Resolves transitions against the shared session.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    session: SessionHandle,
    whitelist: RouteWhitelist,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(session: SessionHandle, whitelist: RouteWhitelist) -> Self {
        Self { session, whitelist }
    }

    #[must_use]
    pub fn resolve(&self, request: &NavigationRequest) -> GuardDecision {
        let decision = decide(self.session.is_recognized(), &request.target_path, &self.whitelist);
        tracing::debug!(
            from = %request.origin_path,
            to = %request.target_path,
            ?decision,
            "navigation guarded"
        );
        decision
    }
}

/// The guard's decision table as a pure function.
#[must_use]
pub fn decide(recognized: bool, target_path: &str, whitelist: &RouteWhitelist) -> GuardDecision {
    if recognized {
        if target_path == LOGIN_PATH { GuardDecision::RedirectRoot } else { GuardDecision::Proceed }
    } else if whitelist.contains(target_path) {
        GuardDecision::Proceed
    } else {
        GuardDecision::RedirectLogin { redirect: target_path.to_owned() }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
