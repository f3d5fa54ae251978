//! # pa-wizard-core
//!
//! Deterministic core of the prior authorization request wizard.
//!
//! This crate owns everything the wizard decides on its own:
//! - Which step the user is on, and where they may move
//! - Which category-specific detail record applies
//! - Which documents the active category requires, and which are attached
//! - What the final review shows
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same draft and catalog always produce the same review
//! 2. **Non-blocking**: Navigation never validates; hints are advisory
//! 3. **Isolated slices**: Updating one part of the draft leaves the rest shared
//! 4. **No I/O**: Persistence and delivery live in `pa-wizard-runtime`
//!
//! ## Example
//!
//! ```rust,ignore
//! use pa_wizard_core::{DraftSlice, PaType, ServiceInfo, StaticCatalog, WizardController};
//!
//! let catalog = StaticCatalog::standard();
//! let mut wizard = WizardController::new();
//! wizard.update_slice(DraftSlice::ServiceInfo(ServiceInfo {
//!     pa_type: PaType::Imaging,
//!     ..Default::default()
//! }));
//! wizard.toggle_document(&catalog, "img-order");
//!
//! let metrics = wizard.checklist_metrics(&catalog);
//! println!("{} documents attached", metrics.progress_label());
//! ```

pub mod catalog;
pub mod checklist;
pub mod details;
pub mod draft;
pub mod hints;
pub mod review;
pub mod types;
pub mod wizard;

// Re-export main types at crate root
pub use catalog::{CatalogError, CatalogFile, RequirementCatalog, StaticCatalog};
pub use checklist::{ChecklistMetrics, ReconciledChecklist};
pub use details::{
    DetailEditor, DurableEquipmentDetails, HomeHealthDetails, ImagingDetails, InpatientDetails,
    OutpatientDetails, PaTypeDetails, PharmacyDetails, VariantEditor, VariantRecord,
};
pub use draft::{DraftSlice, PaWizardDraft, SliceName};
pub use hints::{FieldHint, HintLevel};
pub use review::{
    EligibilityBanner, EligibilityPolarity, Review, ReviewAggregator, ReviewField, ReviewSection,
    SectionKind, EMPTY_PLACEHOLDER,
};
pub use types::{
    DocumentChecklistItem, DocumentRequirement, MemberInfo, PaEligibilityCheck, PaType,
    ProviderInfo, ServiceInfo, UnknownPaType, Urgency,
};
pub use wizard::{CancelSink, SubmitSink, WizardController, WizardStatus, WizardStep};
