//! # DPM Forms
//!
//! Pure validation layer for the patient-intake flow. Each onboarding step
//! has a schema: a function from raw client input (strings, flags, pasted
//! text) to either a validated, typed value or a collection of field-keyed
//! error messages. Schemas have no side effects and never touch the
//! backend.
//!
//! Cross-field conditional requirements ("if the patient reports pain, a
//! pain description is required") are expressed as *named refinement
//! rules*: standalone functions evaluated after the per-field checks, each
//! unit-testable on its own.
//!
//! The multi-step controller lives here too ([`stepper`]); it tracks the
//! current step and nothing else — callers validate before advancing.

mod error;
pub mod normalise;
pub mod stepper;
pub mod steps;

pub use error::{FieldError, FieldErrors};
pub use stepper::{OnboardingStep, StepController};
