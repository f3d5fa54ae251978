//! Wizard controller: step sequencing and draft ownership.
//!
//! The wizard is a linear machine over seven steps. Navigation never
//! validates: a user may move forward with incomplete slices, and `submit`
//! hands the draft over as-is. Once submitted or cancelled the wizard is
//! finished and ignores further navigation and edits.
//!
//! | From | Event | To |
//! |------|-------|----|
//! | step *i* < 6 | `go_next` | step *i* + 1 |
//! | step *i* > 0 | `go_back` | step *i* - 1 |
//! | Review | `submit` | Submitted |
//! | any step | `cancel` | Abandoned |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::RequirementCatalog;
use crate::checklist::{ChecklistMetrics, ReconciledChecklist};
use crate::details::{DetailEditor, PaTypeDetails};
use crate::draft::{DraftSlice, PaWizardDraft};
use crate::hints::{collect_hints, FieldHint};
use crate::review::{Review, ReviewAggregator};

/// The seven wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    Member,
    Service,
    Eligibility,
    TypeDetails,
    Provider,
    Documents,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        WizardStep::Member,
        WizardStep::Service,
        WizardStep::Eligibility,
        WizardStep::TypeDetails,
        WizardStep::Provider,
        WizardStep::Documents,
        WizardStep::Review,
    ];

    /// Number of steps.
    pub const COUNT: usize = Self::ALL.len();

    /// Zero-based position.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Step at `index`, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_first(&self) -> bool {
        self.index() == 0
    }

    pub fn is_last(&self) -> bool {
        self.index() == Self::COUNT - 1
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Member => "Member",
            WizardStep::Service => "Service",
            WizardStep::Eligibility => "Eligibility",
            WizardStep::TypeDetails => "Type Details",
            WizardStep::Provider => "Provider",
            WizardStep::Documents => "Documents",
            WizardStep::Review => "Review",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Lifecycle of a wizard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStatus {
    /// Accepting navigation and edits
    Active,
    /// Draft handed to the submit sink
    Submitted,
    /// Draft discarded
    Abandoned,
}

/// Receives the finished draft.
///
/// Fire-and-forget from the wizard's side; delivery failures belong to the
/// sink.
pub trait SubmitSink {
    fn submit(&mut self, draft: PaWizardDraft);
}

impl<F> SubmitSink for F
where
    F: FnMut(PaWizardDraft),
{
    fn submit(&mut self, draft: PaWizardDraft) {
        self(draft)
    }
}

/// Notified when the user abandons the wizard.
pub trait CancelSink {
    fn cancel(&mut self);
}

impl<F> CancelSink for F
where
    F: FnMut(),
{
    fn cancel(&mut self) {
        self()
    }
}

/// Owns the current step and the draft.
#[derive(Debug, Clone)]
pub struct WizardController {
    step: WizardStep,
    draft: PaWizardDraft,
    status: WizardStatus,
}

impl WizardController {
    /// Start at the first step with an empty draft.
    pub fn new() -> Self {
        Self::with_draft(PaWizardDraft::new())
    }

    /// Start at the first step with a prepared draft.
    ///
    /// Details tagged for a category other than the draft's are cleared.
    pub fn with_draft(draft: PaWizardDraft) -> Self {
        let draft = if draft.details_consistent() {
            draft
        } else {
            tracing::warn!(
                category = %draft.category(),
                "Loaded draft holds details for another category, clearing them"
            );
            draft.with_slice(DraftSlice::TypeDetails(None))
        };
        Self {
            step: WizardStep::Member,
            draft,
            status: WizardStatus::Active,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Zero-based index of the current step.
    pub fn current_step(&self) -> usize {
        self.step.index()
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == WizardStatus::Active
    }

    pub fn draft(&self) -> &PaWizardDraft {
        &self.draft
    }

    /// Advance one step. No-op at the last step or once finished.
    pub fn go_next(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Some(next) = WizardStep::from_index(self.step.index() + 1) {
            tracing::debug!(from = %self.step, to = %next, "Wizard step forward");
            self.step = next;
        }
    }

    /// Go back one step. No-op at the first step or once finished.
    pub fn go_back(&mut self) {
        if !self.is_active() || self.step.is_first() {
            return;
        }
        if let Some(prev) = WizardStep::from_index(self.step.index() - 1) {
            tracing::debug!(from = %self.step, to = %prev, "Wizard step back");
            self.step = prev;
        }
    }

    /// Replace one top-level field of the draft.
    ///
    /// Every other slice is shared with the previous draft. The one coupling:
    /// a service update that changes the category also clears `type_details`.
    /// A details record tagged for another category is ignored, so the draft
    /// never holds details that do not match its category.
    pub fn update_slice(&mut self, slice: DraftSlice) {
        if !self.is_active() {
            tracing::warn!(slice = ?slice.name(), "Ignoring slice update on finished wizard");
            return;
        }

        if let DraftSlice::TypeDetails(Some(details)) = &slice {
            if details.category() != self.draft.category() {
                tracing::warn!(
                    details = %details.category(),
                    active = %self.draft.category(),
                    "Ignoring details for inactive category"
                );
                return;
            }
        }

        let category_change = match &slice {
            DraftSlice::ServiceInfo(service) if service.pa_type != self.draft.category() => {
                Some((self.draft.category(), service.pa_type))
            }
            _ => None,
        };

        tracing::debug!(slice = ?slice.name(), "Updating draft slice");
        let mut next = self.draft.with_slice(slice);

        if let Some((from, to)) = category_change {
            if next.type_details.is_some() {
                tracing::debug!(%from, %to, "Category changed, clearing stale type details");
                next = next.with_slice(DraftSlice::TypeDetails(None));
            }
        }

        self.draft = next;
    }

    /// Editor for the current category, opened on the draft's details.
    ///
    /// `None` for the `general` category.
    pub fn detail_editor(&self) -> Option<DetailEditor> {
        DetailEditor::for_category(self.draft.category(), self.draft.type_details.as_deref())
    }

    /// Store an edited details record (the editor's change callback).
    ///
    /// Same rules as [`update_slice`](Self::update_slice): a record for an
    /// inactive category is ignored.
    pub fn apply_details(&mut self, details: PaTypeDetails) {
        self.update_slice(DraftSlice::TypeDetails(Some(details)));
    }

    /// Checklist reconciled against the active category's requirements.
    pub fn checklist(&self, catalog: &dyn RequirementCatalog) -> ReconciledChecklist {
        let requirements = catalog.requirements_for(self.draft.category());
        ReconciledChecklist::reconcile(&requirements, &self.draft.document_checklist)
    }

    /// Completion counts for the reconciled checklist.
    pub fn checklist_metrics(&self, catalog: &dyn RequirementCatalog) -> ChecklistMetrics {
        self.checklist(catalog).metrics()
    }

    /// Reconcile, toggle one item, and store the reconciled checklist.
    ///
    /// Returns the item's new `uploaded` value, or `None` if the id is not
    /// required by the active category (the draft is left unchanged).
    pub fn toggle_document(
        &mut self,
        catalog: &dyn RequirementCatalog,
        requirement_id: &str,
    ) -> Option<bool> {
        if !self.is_active() {
            return None;
        }
        let mut checklist = self.checklist(catalog);
        let uploaded = checklist.toggle(requirement_id)?;
        self.update_slice(DraftSlice::DocumentChecklist(checklist.into_items()));
        Some(uploaded)
    }

    /// Review projection of the current draft.
    pub fn review(&self, catalog: &dyn RequirementCatalog) -> Review {
        ReviewAggregator::new().aggregate(&self.draft, catalog)
    }

    /// Advisory format hints for the current draft. Never block navigation.
    pub fn hints(&self) -> Vec<FieldHint> {
        collect_hints(&self.draft)
    }

    /// Hand the draft to `sink` and finish.
    ///
    /// Only meaningful at the review step; elsewhere, or once finished, it is
    /// a no-op and returns false. No required-field checks are made. The
    /// sink is called at most once per wizard.
    pub fn submit(&mut self, sink: &mut dyn SubmitSink) -> bool {
        if !self.is_active() || !self.step.is_last() {
            tracing::debug!(step = %self.step, status = ?self.status, "Submit ignored");
            return false;
        }
        tracing::info!(category = %self.draft.category(), "Submitting prior authorization draft");
        self.status = WizardStatus::Submitted;
        sink.submit(self.draft.clone());
        true
    }

    /// Abandon the wizard from any step, discarding the draft.
    pub fn cancel(&mut self, sink: &mut dyn CancelSink) {
        if !self.is_active() {
            return;
        }
        tracing::info!(step = %self.step, "Prior authorization wizard cancelled");
        self.status = WizardStatus::Abandoned;
        self.draft = PaWizardDraft::new();
        sink.cancel();
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}
