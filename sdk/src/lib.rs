//! Client-side mirror of the slotlock vault wire protocol.
//!
//! The on-chain program is the authority on every byte it writes; this crate
//! re-implements the account layout, instruction encoding and address
//! derivation so clients can read, pre-validate and build transactions
//! without guessing at offsets. Layouts live in declarative tables
//! ([`layout`]) consumed by one generic codec, and every component takes its
//! program id from an injected [`config::ClientConfig`] rather than a
//! crate-level constant.
//!
//! The lifecycle checks in [`lifecycle`] are advisory only: they exist to
//! fail obviously-doomed requests before a network round trip, never to
//! replace on-chain validation.

pub mod config;
pub mod derive;
pub mod error;
pub mod gateway;
pub mod instruction;
pub mod layout;
pub mod lifecycle;
pub mod vault;

pub use config::ClientConfig;
pub use error::VaultClientError;
pub use vault::{Vault, VaultRecord};
