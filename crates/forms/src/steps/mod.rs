//! Per-step validation schemas.
//!
//! One module per onboarding section. Each exposes a raw input struct (the
//! client representation: strings and flags, with `#[serde(default)]` so a
//! partially-filled form deserialises), a validated data struct, a
//! `validate` function, and its named refinement rules.
//!
//! The documents section has no schema of its own: file acceptance is
//! decided per file by `dpm_files::PendingUpload` at selection time.

pub mod consent;
pub mod contact;
pub mod dental;
pub mod family;
pub mod lifestyle;
pub mod medical;
pub mod personal;

pub use consent::{ConsentData, ConsentInput};
pub use contact::{ContactData, ContactInput};
pub use dental::{DentalData, DentalInput};
pub use family::{FamilyData, FamilyInput};
pub use lifestyle::{LifestyleData, LifestyleInput};
pub use medical::{MedicalData, MedicalInput};
pub use personal::{PersonalData, PersonalInput};
