//! UI Components for the Minerva marketplace frontend.
//!
//! This module contains all Leptos components organized by function:
//!
//! # Layout Components
//! - [`Header`] - Navigation bar with wallet connection and busy badge
//! - [`Hero`] - Main title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`PublishWizard`] - Multi-step model/dataset publish flow
//! - [`StepIndicator`] - Wizard progress header
//! - [`ProviderPicker`] - Platform and provider selection
//! - [`SuccessModal`] - Auto-dismissing publish confirmation

mod footer;
mod header;
mod hero;
mod modal;
mod progress;
mod provider_picker;
mod wizard;

pub use footer::*;
pub use header::*;
pub use hero::*;
pub use modal::*;
pub use progress::*;
pub use provider_picker::*;
pub use wizard::*;
