//! Auth-domain identifiers, state records, and credential blobs.

pub mod credentials;
pub mod id;
pub mod secret;
pub mod state;

pub use credentials::*;
pub use id::*;
pub use secret::*;
pub use state::*;
