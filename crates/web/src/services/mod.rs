//! Clients for hosted services the site delegates to.

pub mod identity;

pub use identity::{AuthUser, IdentityClient, IdentityError};
