//! Admin authentication: session store, verification codes, and the
//! session-pinned auth guard

pub mod codes;
pub mod guard;
pub mod handler;
pub mod store;

pub use codes::CodeIssuer;
pub use guard::{client_address, require_admin, AuthState, CurrentAdmin};
pub use handler::{auth_router, AuthApiState};
pub use store::SessionStore;
