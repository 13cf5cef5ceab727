//! watchdesk — session and navigation core of the traffic-monitoring console.
//!
//! ```text
//! SessionStore ──writes──▶ SessionHandle ◀──reads── NavigationGuard ◀── Router
//!      │                        ▲
//!      ▼                        └──reads── ConsoleApi (bearer token)
//!   AuthApi / CredentialPersistence
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod router;
pub mod session;
pub mod storage;
pub mod store;

pub use app::App;
pub use error::ErrorCode;
pub use guard::{GuardDecision, NavigationGuard, NavigationRequest, RouteWhitelist};
pub use router::{Location, Resolved, Router};
pub use session::{Session, SessionHandle, SessionPhase};
pub use storage::{CredentialPersistence, FileStorage, MemoryStorage};
pub use store::{SessionError, SessionStore};
