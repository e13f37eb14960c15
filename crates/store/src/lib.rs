//! `rolegate-store` — the credential store boundary.
//!
//! User records, the role catalog, role assignments, and role-to-menu grants
//! live in durable storage this crate consults but does not own. The rest of
//! the system talks to it only through [`CredentialStore`].

pub mod credential;
pub mod error;
pub mod in_memory;
pub mod postgres;
pub mod records;

pub use credential::CredentialStore;
pub use error::StoreError;
pub use in_memory::InMemoryCredentialStore;
pub use postgres::PostgresCredentialStore;
pub use records::{MenuNode, RoleRecord, UserRecord};
