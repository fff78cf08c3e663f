//! Mortar: a self-hosted marketing site with an admin-managed content backend.
//!
//! The crate is layered the same way the binary is wired: `domain` holds the
//! entities and the draft/attachment state machines, `application` holds the
//! services and repository contracts, `infra` holds the Postgres, filesystem
//! and HTTP adapters, and `presentation` holds the askama view models.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
