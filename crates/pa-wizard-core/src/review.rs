//! Review aggregator: projects a draft into display sections.
//!
//! Every value is a display string. Empty source values render as
//! [`EMPTY_PLACEHOLDER`] so "no value" stays distinguishable from an empty
//! cell.
//!
//! The category-details section is chosen from the discriminant of
//! `type_details` alone. It does not cross-check `service_info.type`; the
//! controller never stores details for an inactive category.

use serde::Serialize;

use crate::catalog::{find_requirement, RequirementCatalog};
use crate::details::{Discipline, PaTypeDetails};
use crate::draft::PaWizardDraft;
use crate::types::{DocumentRequirement, PaEligibilityCheck};

/// Placeholder shown for an empty value.
pub const EMPTY_PLACEHOLDER: &str = "\u{2014}";

/// One label/value row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewField {
    pub label: String,
    pub value: String,
}

impl ReviewField {
    fn text(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: display(value),
        }
    }

    fn number(label: &str, value: u32) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    fn flag(label: &str, value: bool) -> Self {
        Self {
            label: label.to_string(),
            value: if value { "Yes" } else { "No" }.to_string(),
        }
    }
}

/// Which part of the draft a section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Member,
    Service,
    CategoryDetails,
    Provider,
    Documents,
    Notes,
}

/// A titled group of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSection {
    pub kind: SectionKind,
    pub title: String,
    pub fields: Vec<ReviewField>,
}

impl ReviewSection {
    /// Value of the first row with `label`.
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

/// Eligibility outcome polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EligibilityPolarity {
    Eligible,
    NotEligible,
}

/// Banner shown when an eligibility check has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityBanner {
    pub polarity: EligibilityPolarity,
    pub message: String,
    /// Independent of polarity
    pub auth_required_badge: Option<String>,
}

impl EligibilityBanner {
    /// Build the banner, or `None` if the check has not run.
    pub fn from_check(check: &PaEligibilityCheck) -> Option<Self> {
        if !check.checked {
            return None;
        }

        let plan = display(&check.plan_name);
        let coverage = display(&check.coverage_status);

        let (polarity, message) = if check.eligible {
            (
                EligibilityPolarity::Eligible,
                format!("Member is eligible under {}. Coverage: {}.", plan, coverage),
            )
        } else {
            (
                EligibilityPolarity::NotEligible,
                format!(
                    "Member is not eligible under {}. Coverage status: {}. Review before submitting.",
                    plan, coverage
                ),
            )
        };

        let auth_required_badge = check
            .auth_required
            .then(|| "Prior authorization required".to_string());

        Some(Self {
            polarity,
            message,
            auth_required_badge,
        })
    }
}

/// Everything the review step displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub eligibility: Option<EligibilityBanner>,
    pub sections: Vec<ReviewSection>,
}

impl Review {
    /// First section of `kind`.
    pub fn section(&self, kind: SectionKind) -> Option<&ReviewSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// Builds a [`Review`] from a draft and the catalog.
pub struct ReviewAggregator;

impl ReviewAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Project `draft` into review sections.
    ///
    /// Section order: member, service, category details (only when the draft
    /// carries details), provider, documents, notes.
    pub fn aggregate(&self, draft: &PaWizardDraft, catalog: &dyn RequirementCatalog) -> Review {
        let requirements = catalog.requirements_for(draft.category());

        let mut sections = vec![self.member_section(draft), self.service_section(draft)];
        if let Some(details) = draft.type_details.as_deref() {
            sections.push(self.details_section(details));
        }
        sections.push(self.provider_section(draft));
        sections.push(self.documents_section(draft, &requirements));
        sections.push(self.notes_section(draft));

        Review {
            eligibility: draft
                .eligibility_check
                .as_deref()
                .and_then(EligibilityBanner::from_check),
            sections,
        }
    }

    fn member_section(&self, draft: &PaWizardDraft) -> ReviewSection {
        let m = &draft.member_info;
        ReviewSection {
            kind: SectionKind::Member,
            title: "Member Information".to_string(),
            fields: vec![
                ReviewField::text("Member ID", &m.member_id),
                ReviewField::text("Member Name", &m.member_name),
                ReviewField::text("Date of Birth", &m.dob),
                ReviewField::text("Subscriber ID", &m.subscriber_id),
            ],
        }
    }

    fn service_section(&self, draft: &PaWizardDraft) -> ReviewSection {
        let s = &draft.service_info;
        ReviewSection {
            kind: SectionKind::Service,
            title: "Service Information".to_string(),
            fields: vec![
                ReviewField::text("Request Type", s.pa_type.label()),
                ReviewField::text("Urgency", s.urgency.label()),
                ReviewField::text("Service Code", &s.service_code),
                ReviewField::text("Service Description", &s.service_description),
                ReviewField::text("Diagnosis Code", &s.diagnosis_code),
                ReviewField::text("Diagnosis Description", &s.diagnosis_description),
                ReviewField::text("Start Date", &s.start_date),
                ReviewField::text("End Date", &s.end_date),
                ReviewField::number("Quantity", s.quantity),
            ],
        }
    }

    /// Field list selected purely by the details discriminant.
    fn details_section(&self, details: &PaTypeDetails) -> ReviewSection {
        let fields = match details {
            PaTypeDetails::Inpatient(d) => vec![
                ReviewField::text("Admission Date", &d.admission_date),
                ReviewField::number("Estimated Length of Stay (days)", d.estimated_los),
                ReviewField::text("Bed Type", d.bed_type.label()),
                ReviewField::text("Attending Physician", &d.attending_physician),
                ReviewField::text("Facility", &d.facility_name),
            ],
            PaTypeDetails::Outpatient(d) => vec![
                ReviewField::text("Procedure Code", &d.procedure_code),
                ReviewField::text("Facility Type", d.facility_type.label()),
                ReviewField::flag("Anesthesia Required", d.anesthesia_required),
                ReviewField::text("Follow-Up Plan", &d.follow_up_plan),
            ],
            PaTypeDetails::Pharmacy(d) => vec![
                ReviewField::text("NDC Code", &d.ndc_code),
                ReviewField::text("Drug Name", &d.drug_name),
                ReviewField::text("Dosage", &d.dosage),
                ReviewField::number("Quantity Requested", d.quantity_requested),
                ReviewField::number("Days Supply", d.days_supply),
                ReviewField::text("Pharmacy NPI", &d.pharmacy_npi),
            ],
            PaTypeDetails::Imaging(d) => vec![
                ReviewField::text("Modality", d.modality.label()),
                ReviewField::text("Body Part", &d.body_part),
                ReviewField::flag("Contrast Required", d.contrast_required),
                ReviewField::text("Clinical Indication", &d.clinical_indication),
                ReviewField::text("Ordering Provider", &d.ordering_provider),
            ],
            PaTypeDetails::DurableEquipment(d) => vec![
                ReviewField::text("HCPCS Code", &d.hcpcs_code),
                ReviewField::text("Item Description", &d.item_description),
                ReviewField::text("Rental or Purchase", d.rental_or_purchase.label()),
                ReviewField::number("Duration (months)", d.duration_months),
                ReviewField::flag("CMN Required", d.cmn_required),
            ],
            PaTypeDetails::HomeHealth(d) => vec![
                ReviewField::text("Visit Frequency", &d.visit_frequency),
                ReviewField::text("Disciplines", &join_disciplines(d.discipline.iter())),
                ReviewField::flag("Homebound", d.homebound_status),
                ReviewField::text("Certification Start", &d.certification_period_start),
                ReviewField::text("Certification End", &d.certification_period_end),
            ],
        };

        ReviewSection {
            kind: SectionKind::CategoryDetails,
            title: format!("{} Details", details.category().label()),
            fields,
        }
    }

    fn provider_section(&self, draft: &PaWizardDraft) -> ReviewSection {
        let p = &draft.provider_info;
        ReviewSection {
            kind: SectionKind::Provider,
            title: "Provider Information".to_string(),
            fields: vec![
                ReviewField::text("Provider Name", &p.provider_name),
                ReviewField::text("Provider NPI", &p.provider_npi),
                ReviewField::text("Facility Name", &p.facility_name),
                ReviewField::text("Facility Address", &p.facility_address),
            ],
        }
    }

    /// Uploaded items only, named from the catalog when it knows the id.
    fn documents_section(
        &self,
        draft: &PaWizardDraft,
        requirements: &[DocumentRequirement],
    ) -> ReviewSection {
        let fields = draft
            .document_checklist
            .iter()
            .filter(|item| item.uploaded)
            .map(|item| {
                let label = find_requirement(requirements, &item.requirement_id)
                    .map(|r| r.name.as_str())
                    .unwrap_or(item.requirement_id.as_str());
                ReviewField::text(label, item.file_name.as_deref().unwrap_or_default())
            })
            .collect();

        ReviewSection {
            kind: SectionKind::Documents,
            title: "Supporting Documents".to_string(),
            fields,
        }
    }

    fn notes_section(&self, draft: &PaWizardDraft) -> ReviewSection {
        ReviewSection {
            kind: SectionKind::Notes,
            title: "Additional Notes".to_string(),
            fields: vec![ReviewField::text("Notes", &draft.notes)],
        }
    }
}

impl Default for ReviewAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Display form of a text value.
pub fn display(value: &str) -> String {
    if value.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

fn join_disciplines<'a>(disciplines: impl Iterator<Item = &'a Discipline>) -> String {
    disciplines.map(|d| d.label()).collect::<Vec<_>>().join(", ")
}
