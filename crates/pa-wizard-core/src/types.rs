//! Core types for the prior authorization wizard.
//!
//! These are the plain slices of a draft plus the records supplied by
//! external collaborators (eligibility result, requirement catalog).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Service category of a prior authorization request.
///
/// The six detail categories each select a [`crate::details::PaTypeDetails`]
/// variant. `General` is the category of a fresh draft and has no detail
/// variant of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PaType {
    #[default]
    General,
    Inpatient,
    Outpatient,
    Pharmacy,
    Imaging,
    DurableEquipment,
    HomeHealth,
}

impl PaType {
    /// Every category, in display order.
    pub const ALL: [PaType; 7] = [
        PaType::General,
        PaType::Inpatient,
        PaType::Outpatient,
        PaType::Pharmacy,
        PaType::Imaging,
        PaType::DurableEquipment,
        PaType::HomeHealth,
    ];

    /// Serialized tag (kebab-case).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaType::General => "general",
            PaType::Inpatient => "inpatient",
            PaType::Outpatient => "outpatient",
            PaType::Pharmacy => "pharmacy",
            PaType::Imaging => "imaging",
            PaType::DurableEquipment => "durable-equipment",
            PaType::HomeHealth => "home-health",
        }
    }

    /// Human-readable label used by the review.
    pub fn label(&self) -> &'static str {
        match self {
            PaType::General => "General",
            PaType::Inpatient => "Inpatient Admission",
            PaType::Outpatient => "Outpatient Procedure",
            PaType::Pharmacy => "Pharmacy",
            PaType::Imaging => "Advanced Imaging",
            PaType::DurableEquipment => "Durable Medical Equipment",
            PaType::HomeHealth => "Home Health",
        }
    }

    /// Whether this category carries a detail variant.
    pub fn has_details(&self) -> bool {
        !matches!(self, PaType::General)
    }
}

impl fmt::Display for PaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown PA category: {0}")]
pub struct UnknownPaType(pub String);

impl FromStr for PaType {
    type Err = UnknownPaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownPaType(s.to_string()))
    }
}

/// How quickly the service is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    #[default]
    Routine,
    Urgent,
    Emergent,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Routine => "Routine",
            Urgency::Urgent => "Urgent",
            Urgency::Emergent => "Emergent",
        }
    }
}

/// Member section of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberInfo {
    pub member_id: String,
    pub member_name: String,
    /// Date of birth as entered (ISO `YYYY-MM-DD` expected, not enforced)
    pub dob: String,
    pub subscriber_id: String,
}

/// Service section of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceInfo {
    /// Category; selects the detail variant
    #[serde(rename = "type")]
    pub pa_type: PaType,
    pub urgency: Urgency,
    pub service_code: String,
    pub service_description: String,
    pub diagnosis_code: String,
    pub diagnosis_description: String,
    pub start_date: String,
    pub end_date: String,
    pub quantity: u32,
}

/// Requesting provider section of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderInfo {
    pub provider_name: String,
    pub provider_npi: String,
    pub facility_name: String,
    pub facility_address: String,
}

/// Eligibility result produced by an external lookup.
///
/// The wizard never computes this; it only stores and displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PaEligibilityCheck {
    pub checked: bool,
    pub eligible: bool,
    pub plan_name: String,
    pub coverage_status: String,
    pub auth_required: bool,
}

/// One entry of the document checklist.
///
/// `file_name` is present exactly when `uploaded` is true; use
/// [`DocumentChecklistItem::pending`] and [`DocumentChecklistItem::attached`]
/// to keep that pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChecklistItem {
    pub requirement_id: String,
    pub uploaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl DocumentChecklistItem {
    /// Item for a requirement with nothing attached.
    pub fn pending(requirement_id: impl Into<String>) -> Self {
        Self {
            requirement_id: requirement_id.into(),
            uploaded: false,
            file_name: None,
        }
    }

    /// Item for a requirement with an attached file.
    pub fn attached(requirement_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            requirement_id: requirement_id.into(),
            uploaded: true,
            file_name: Some(file_name.into()),
        }
    }
}

/// A supporting document the catalog lists for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl DocumentRequirement {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pa_type_round_trips_through_str() {
        for t in PaType::ALL {
            assert_eq!(t.as_str().parse::<PaType>().unwrap(), t);
        }
        assert!("dental".parse::<PaType>().is_err());
    }

    #[test]
    fn test_pa_type_serializes_kebab_case() {
        let json = serde_json::to_string(&PaType::DurableEquipment).unwrap();
        assert_eq!(json, "\"durable-equipment\"");
        let parsed: PaType = serde_json::from_str("\"home-health\"").unwrap();
        assert_eq!(parsed, PaType::HomeHealth);
    }

    #[test]
    fn test_service_info_uses_type_key() {
        let service = ServiceInfo {
            pa_type: PaType::Imaging,
            ..Default::default()
        };
        let value = serde_json::to_value(&service).unwrap();
        assert_eq!(value["type"], "imaging");
        assert_eq!(value["diagnosisCode"], "");
    }

    #[test]
    fn test_checklist_item_constructors_pair_file_name() {
        let pending = DocumentChecklistItem::pending("a");
        assert!(!pending.uploaded);
        assert!(pending.file_name.is_none());

        let attached = DocumentChecklistItem::attached("a", "a.pdf");
        assert!(attached.uploaded);
        assert_eq!(attached.file_name.as_deref(), Some("a.pdf"));
    }
}
