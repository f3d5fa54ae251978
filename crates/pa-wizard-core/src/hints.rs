//! Advisory field-format hints.
//!
//! Hints flag common slips (a nine-digit NPI, a date typed backwards) so the
//! review can point at them. They are never consulted by navigation or
//! submit: the wizard does not block on them.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::details::PaTypeDetails;
use crate::draft::{PaWizardDraft, SliceName};

lazy_static! {
    /// National Provider Identifier: exactly ten digits
    static ref NPI_PATTERN: Regex = Regex::new(r"^\d{10}$").unwrap();

    /// ICD-10-CM shape: letter, digit, alphanumeric, optional dot and up to four more
    static ref ICD10_PATTERN: Regex = Regex::new(
        r"^[A-TV-Z][0-9][0-9A-Z](\.?[0-9A-Z]{1,4})?$"
    ).unwrap();

    /// National Drug Code: 10-digit 4-4-2, 5-3-2 or 5-4-1, billing 5-4-2,
    /// or 11 digits unhyphenated
    static ref NDC_PATTERN: Regex = Regex::new(
        r"^(\d{4}-\d{4}-\d{2}|\d{5}-\d{3}-\d{2}|\d{5}-\d{4}-\d{1,2}|\d{11})$"
    ).unwrap();

    /// HCPCS Level II: one letter then four digits
    static ref HCPCS_PATTERN: Regex = Regex::new(r"^[A-Z]\d{4}$").unwrap();
}

/// How much attention a hint deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HintLevel {
    Info,
    Warning,
}

/// One advisory notice about a draft field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldHint {
    pub slice: SliceName,
    /// Field path within the slice (e.g., "providerNpi")
    pub field: String,
    pub level: HintLevel,
    pub message: String,
}

impl FieldHint {
    fn warning(slice: SliceName, field: &str, message: impl Into<String>) -> Self {
        Self {
            slice,
            field: field.to_string(),
            level: HintLevel::Warning,
            message: message.into(),
        }
    }

    fn info(slice: SliceName, field: &str, message: impl Into<String>) -> Self {
        Self {
            slice,
            field: field.to_string(),
            level: HintLevel::Info,
            message: message.into(),
        }
    }
}

/// Check if a value is a well-formed NPI.
pub fn is_npi(value: &str) -> bool {
    NPI_PATTERN.is_match(value)
}

/// Check if a value looks like an ICD-10 diagnosis code.
pub fn is_icd10(value: &str) -> bool {
    ICD10_PATTERN.is_match(&value.to_ascii_uppercase())
}

/// Check if a value is in a recognized NDC layout.
pub fn is_ndc(value: &str) -> bool {
    NDC_PATTERN.is_match(value)
}

/// Check if a value looks like a HCPCS Level II code.
pub fn is_hcpcs(value: &str) -> bool {
    HCPCS_PATTERN.is_match(&value.to_ascii_uppercase())
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Collect hints for the whole draft.
///
/// Empty optional fields are not flagged; only values that are present but
/// malformed, plus a few fields the payer always asks for.
pub fn collect_hints(draft: &PaWizardDraft) -> Vec<FieldHint> {
    let mut hints = Vec::new();

    check_member(draft, &mut hints);
    check_service(draft, &mut hints);
    check_provider(draft, &mut hints);
    if let Some(details) = draft.type_details.as_deref() {
        check_details(details, &mut hints);
    }

    hints
}

fn check_member(draft: &PaWizardDraft, hints: &mut Vec<FieldHint>) {
    let m = &draft.member_info;
    if m.member_id.trim().is_empty() {
        hints.push(FieldHint::warning(SliceName::MemberInfo, "memberId", "Member ID is empty"));
    }
    if m.member_name.trim().is_empty() {
        hints.push(FieldHint::warning(SliceName::MemberInfo, "memberName", "Member name is empty"));
    }
    if !m.dob.is_empty() && parse_date(&m.dob).is_none() {
        hints.push(FieldHint::warning(
            SliceName::MemberInfo,
            "dob",
            format!("Date of birth '{}' is not a YYYY-MM-DD date", m.dob),
        ));
    }
}

fn check_service(draft: &PaWizardDraft, hints: &mut Vec<FieldHint>) {
    let s = &draft.service_info;
    if !s.diagnosis_code.is_empty() && !is_icd10(&s.diagnosis_code) {
        hints.push(FieldHint::warning(
            SliceName::ServiceInfo,
            "diagnosisCode",
            format!("Diagnosis code '{}' does not look like ICD-10", s.diagnosis_code),
        ));
    }
    check_date_range(
        SliceName::ServiceInfo,
        ("startDate", s.start_date.as_str()),
        ("endDate", s.end_date.as_str()),
        hints,
    );
}

fn check_provider(draft: &PaWizardDraft, hints: &mut Vec<FieldHint>) {
    let p = &draft.provider_info;
    if !p.provider_npi.is_empty() && !is_npi(&p.provider_npi) {
        hints.push(FieldHint::warning(
            SliceName::ProviderInfo,
            "providerNpi",
            "Provider NPI must be exactly 10 digits",
        ));
    }
}

fn check_details(details: &PaTypeDetails, hints: &mut Vec<FieldHint>) {
    match details {
        PaTypeDetails::Pharmacy(d) => {
            if !d.ndc_code.is_empty() && !is_ndc(&d.ndc_code) {
                hints.push(FieldHint::warning(
                    SliceName::TypeDetails,
                    "ndcCode",
                    format!("NDC '{}' is not in a recognized 10 or 11-digit form", d.ndc_code),
                ));
            }
            if !d.pharmacy_npi.is_empty() && !is_npi(&d.pharmacy_npi) {
                hints.push(FieldHint::warning(
                    SliceName::TypeDetails,
                    "pharmacyNpi",
                    "Pharmacy NPI must be exactly 10 digits",
                ));
            }
        }
        PaTypeDetails::DurableEquipment(d) => {
            if !d.hcpcs_code.is_empty() && !is_hcpcs(&d.hcpcs_code) {
                hints.push(FieldHint::warning(
                    SliceName::TypeDetails,
                    "hcpcsCode",
                    format!(
                        "HCPCS code '{}' should be a letter followed by four digits",
                        d.hcpcs_code
                    ),
                ));
            }
        }
        PaTypeDetails::HomeHealth(d) => {
            if d.discipline.is_empty() {
                hints.push(FieldHint::info(
                    SliceName::TypeDetails,
                    "discipline",
                    "No home health discipline selected",
                ));
            }
            check_date_range(
                SliceName::TypeDetails,
                ("certificationPeriodStart", d.certification_period_start.as_str()),
                ("certificationPeriodEnd", d.certification_period_end.as_str()),
                hints,
            );
        }
        PaTypeDetails::Inpatient(d) => {
            if !d.admission_date.is_empty() && parse_date(&d.admission_date).is_none() {
                hints.push(FieldHint::warning(
                    SliceName::TypeDetails,
                    "admissionDate",
                    format!("Admission date '{}' is not a YYYY-MM-DD date", d.admission_date),
                ));
            }
        }
        PaTypeDetails::Outpatient(_) | PaTypeDetails::Imaging(_) => {}
    }
}

fn check_date_range(
    slice: SliceName,
    (start_field, start): (&str, &str),
    (end_field, end): (&str, &str),
    hints: &mut Vec<FieldHint>,
) {
    let start_date = parse_date(start);
    let end_date = parse_date(end);

    if !start.is_empty() && start_date.is_none() {
        hints.push(FieldHint::warning(
            slice,
            start_field,
            format!("'{}' is not a YYYY-MM-DD date", start),
        ));
    }
    if !end.is_empty() && end_date.is_none() {
        hints.push(FieldHint::warning(
            slice,
            end_field,
            format!("'{}' is not a YYYY-MM-DD date", end),
        ));
    }
    if let (Some(s), Some(e)) = (start_date, end_date) {
        if e < s {
            hints.push(FieldHint::warning(
                slice,
                end_field,
                format!("End date {} is before start date {}", e, s),
            ));
        }
    }
}
