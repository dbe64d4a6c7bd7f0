//! # DPM Core
//!
//! Business logic for the dental-practice management client:
//!
//! - Patient onboarding: a type-state session that sequences the partial
//!   create, per-step validation and the final merged submit
//! - Document handling: uploads gated on a persisted patient identity,
//!   with the replace-by-kind attachment policy
//! - Asset lifecycle: mark-serviced / dispose / set-interval operations
//!   and the derived cost and report computations
//! - List queries: search/filter/sort composition for the asset register
//! - Reminders with optimistic activate/delete
//! - Medical-record detail parsing for display
//!
//! **No transport concerns**: everything here talks to the hosted backend
//! exclusively through the `dpm-backend` contracts, which are injected at
//! service construction. Nothing in this crate owns a durable store.

pub mod assets;
mod auth;
pub mod config;
mod constants;
mod error;
pub mod optimistic;
pub mod patients;
pub mod records;
pub mod reminders;
mod shared;

pub use config::CoreConfig;
pub use error::{ClinicError, ClinicResult};

// The shared validated primitives are part of this crate's public API.
pub use dpm_types::{E164Phone, EmailAddress, NonEmptyText};
