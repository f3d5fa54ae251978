//! The in-progress request record.
//!
//! Every top-level field sits behind an `Arc`. Replacing one slice builds a
//! new draft that shares all other slices with the old one, so collaborators
//! can detect change with `Arc::ptr_eq` and never observe a partial write.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::details::PaTypeDetails;
use crate::types::{
    DocumentChecklistItem, MemberInfo, PaEligibilityCheck, PaType, ProviderInfo, ServiceInfo,
};

/// Identifies one top-level field of [`PaWizardDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SliceName {
    MemberInfo,
    ServiceInfo,
    EligibilityCheck,
    TypeDetails,
    ProviderInfo,
    DocumentChecklist,
    Notes,
}

/// A replacement value for exactly one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftSlice {
    MemberInfo(MemberInfo),
    ServiceInfo(ServiceInfo),
    EligibilityCheck(Option<PaEligibilityCheck>),
    TypeDetails(Option<PaTypeDetails>),
    ProviderInfo(ProviderInfo),
    DocumentChecklist(Vec<DocumentChecklistItem>),
    Notes(String),
}

impl DraftSlice {
    pub fn name(&self) -> SliceName {
        match self {
            DraftSlice::MemberInfo(_) => SliceName::MemberInfo,
            DraftSlice::ServiceInfo(_) => SliceName::ServiceInfo,
            DraftSlice::EligibilityCheck(_) => SliceName::EligibilityCheck,
            DraftSlice::TypeDetails(_) => SliceName::TypeDetails,
            DraftSlice::ProviderInfo(_) => SliceName::ProviderInfo,
            DraftSlice::DocumentChecklist(_) => SliceName::DocumentChecklist,
            DraftSlice::Notes(_) => SliceName::Notes,
        }
    }
}

/// One prior authorization request being assembled by the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PaWizardDraft {
    pub member_info: Arc<MemberInfo>,
    pub service_info: Arc<ServiceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility_check: Option<Arc<PaEligibilityCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_details: Option<Arc<PaTypeDetails>>,
    pub provider_info: Arc<ProviderInfo>,
    pub document_checklist: Arc<Vec<DocumentChecklistItem>>,
    pub notes: Arc<String>,
}

impl PaWizardDraft {
    /// Empty draft, as created at wizard start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty draft with the category preselected.
    pub fn for_category(pa_type: PaType) -> Self {
        Self {
            service_info: Arc::new(ServiceInfo {
                pa_type,
                ..Default::default()
            }),
            ..Self::default()
        }
    }

    /// Active category.
    pub fn category(&self) -> PaType {
        self.service_info.pa_type
    }

    /// A copy of this draft with one slice replaced.
    ///
    /// All other slices are shared with `self`.
    pub fn with_slice(&self, slice: DraftSlice) -> Self {
        let mut next = self.clone();
        match slice {
            DraftSlice::MemberInfo(v) => next.member_info = Arc::new(v),
            DraftSlice::ServiceInfo(v) => next.service_info = Arc::new(v),
            DraftSlice::EligibilityCheck(v) => next.eligibility_check = v.map(Arc::new),
            DraftSlice::TypeDetails(v) => next.type_details = v.map(Arc::new),
            DraftSlice::ProviderInfo(v) => next.provider_info = Arc::new(v),
            DraftSlice::DocumentChecklist(v) => next.document_checklist = Arc::new(v),
            DraftSlice::Notes(v) => next.notes = Arc::new(v),
        }
        next
    }

    /// Whether `type_details` is absent or tagged for the active category.
    pub fn details_consistent(&self) -> bool {
        self.type_details
            .as_deref()
            .map_or(true, |d| d.category() == self.category())
    }

    /// Load a draft from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the draft as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
