//! Multi-step form controller.
//!
//! Tracks position in an ordered sequence of steps and nothing more. The
//! controller performs no validation; callers validate the step being left
//! before invoking [`StepController::next`]. All index changes are
//! synchronous and immediately observable.

use serde::{Deserialize, Serialize};

/// The ordered steps of patient onboarding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Personal,
    Contact,
    Medical,
    Dental,
    Family,
    Lifestyle,
    Consent,
    Documents,
}

impl OnboardingStep {
    /// All steps in presentation order.
    pub const ALL: [OnboardingStep; 8] = [
        OnboardingStep::Personal,
        OnboardingStep::Contact,
        OnboardingStep::Medical,
        OnboardingStep::Dental,
        OnboardingStep::Family,
        OnboardingStep::Lifestyle,
        OnboardingStep::Consent,
        OnboardingStep::Documents,
    ];

    /// Title shown in the progress bar.
    pub fn title(self) -> &'static str {
        match self {
            OnboardingStep::Personal => "Personal details",
            OnboardingStep::Contact => "Contact details",
            OnboardingStep::Medical => "Medical history",
            OnboardingStep::Dental => "Dental history",
            OnboardingStep::Family => "Family history",
            OnboardingStep::Lifestyle => "Lifestyle",
            OnboardingStep::Consent => "Consent",
            OnboardingStep::Documents => "Documents",
        }
    }
}

/// Position tracker over an ordered step sequence.
///
/// `next` and `back` clamp at the ends rather than wrapping or panicking;
/// `go_to` ignores out-of-range targets (the progress bar only ever emits
/// in-range indices, so an out-of-range jump is a caller bug that should
/// not corrupt position).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepController<S> {
    steps: Vec<S>,
    current: usize,
}

impl<S: Copy> StepController<S> {
    /// Creates a controller positioned at the first step.
    ///
    /// An empty step sequence is a programming error; the controller
    /// requires at least one step.
    pub fn new(steps: Vec<S>) -> Self {
        debug_assert!(!steps.is_empty(), "step sequence cannot be empty");
        Self { steps, current: 0 }
    }

    /// The step the user is currently on.
    pub fn current(&self) -> S {
        self.steps[self.current]
    }

    /// Zero-based index of the current step.
    pub fn index(&self) -> usize {
        self.current
    }

    /// Total number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// Advances one step; a no-op at the last step.
    pub fn next(&mut self) {
        if !self.is_last() {
            self.current += 1;
        }
    }

    /// Retreats one step; a no-op at the first step.
    pub fn back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Jumps directly to `index`. Out-of-range input leaves the position
    /// unchanged.
    pub fn go_to(&mut self, index: usize) {
        if index < self.steps.len() {
            self.current = index;
        }
    }

    /// Completion fraction for the progress bar, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        (self.current + 1) as f32 / self.steps.len() as f32
    }
}

impl StepController<OnboardingStep> {
    /// Controller over the full onboarding sequence.
    pub fn onboarding() -> Self {
        Self::new(OnboardingStep::ALL.to_vec())
    }
}
