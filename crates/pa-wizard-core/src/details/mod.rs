//! Category detail model.
//!
//! Each service category except `general` carries one extra record of
//! category-specific fields. [`PaTypeDetails`] is the closed sum over those
//! records, tagged on the wire by `type` to mirror `serviceInfo.type`.
//!
//! ## Defaults
//!
//! | Kind | Default |
//! |------|---------|
//! | strings | empty |
//! | integers with a floor of 1 | 1 |
//! | booleans | false |
//! | sets | empty |
//! | closed value sets | first listed value |

mod editor;

pub use editor::{DetailEditor, VariantEditor, VariantRecord};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::PaType;

/// Bed type for an inpatient admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BedType {
    #[default]
    MedicalSurgical,
    Icu,
    StepDown,
    Rehab,
}

impl BedType {
    pub fn label(&self) -> &'static str {
        match self {
            BedType::MedicalSurgical => "Medical/Surgical",
            BedType::Icu => "ICU",
            BedType::StepDown => "Step-Down",
            BedType::Rehab => "Rehabilitation",
        }
    }
}

/// Where an outpatient procedure takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FacilityType {
    #[default]
    Ambulatory,
    HospitalOutpatient,
    Office,
}

impl FacilityType {
    pub fn label(&self) -> &'static str {
        match self {
            FacilityType::Ambulatory => "Ambulatory Surgery Center",
            FacilityType::HospitalOutpatient => "Hospital Outpatient",
            FacilityType::Office => "Office",
        }
    }
}

/// Imaging modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Modality {
    #[default]
    #[serde(rename = "MRI")]
    Mri,
    #[serde(rename = "CT")]
    Ct,
    #[serde(rename = "PET")]
    Pet,
    Ultrasound,
    #[serde(rename = "X-Ray")]
    XRay,
    Nuclear,
}

impl Modality {
    pub fn label(&self) -> &'static str {
        match self {
            Modality::Mri => "MRI",
            Modality::Ct => "CT",
            Modality::Pet => "PET",
            Modality::Ultrasound => "Ultrasound",
            Modality::XRay => "X-Ray",
            Modality::Nuclear => "Nuclear",
        }
    }
}

/// Whether durable equipment is rented or bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RentalOrPurchase {
    #[default]
    Rental,
    Purchase,
}

impl RentalOrPurchase {
    pub fn label(&self) -> &'static str {
        match self {
            RentalOrPurchase::Rental => "Rental",
            RentalOrPurchase::Purchase => "Purchase",
        }
    }
}

/// Home health discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Discipline {
    SkilledNursing,
    Pt,
    Ot,
    Speech,
    Msw,
    Aide,
}

impl Discipline {
    pub const ALL: [Discipline; 6] = [
        Discipline::SkilledNursing,
        Discipline::Pt,
        Discipline::Ot,
        Discipline::Speech,
        Discipline::Msw,
        Discipline::Aide,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Discipline::SkilledNursing => "Skilled Nursing",
            Discipline::Pt => "Physical Therapy",
            Discipline::Ot => "Occupational Therapy",
            Discipline::Speech => "Speech Therapy",
            Discipline::Msw => "Medical Social Work",
            Discipline::Aide => "Home Health Aide",
        }
    }
}

/// Inpatient admission details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InpatientDetails {
    pub admission_date: String,
    /// Estimated length of stay in days (at least 1)
    #[serde(rename = "estimatedLOS")]
    pub estimated_los: u32,
    pub bed_type: BedType,
    pub attending_physician: String,
    pub facility_name: String,
}

impl Default for InpatientDetails {
    fn default() -> Self {
        Self {
            admission_date: String::new(),
            estimated_los: 1,
            bed_type: BedType::default(),
            attending_physician: String::new(),
            facility_name: String::new(),
        }
    }
}

/// Outpatient procedure details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OutpatientDetails {
    pub procedure_code: String,
    pub facility_type: FacilityType,
    pub anesthesia_required: bool,
    pub follow_up_plan: String,
}

/// Pharmacy request details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PharmacyDetails {
    pub ndc_code: String,
    pub drug_name: String,
    pub dosage: String,
    pub quantity_requested: u32,
    pub days_supply: u32,
    pub pharmacy_npi: String,
}

impl Default for PharmacyDetails {
    fn default() -> Self {
        Self {
            ndc_code: String::new(),
            drug_name: String::new(),
            dosage: String::new(),
            quantity_requested: 1,
            days_supply: 1,
            pharmacy_npi: String::new(),
        }
    }
}

/// Advanced imaging details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagingDetails {
    pub modality: Modality,
    pub body_part: String,
    pub contrast_required: bool,
    pub clinical_indication: String,
    pub ordering_provider: String,
}

/// Durable medical equipment details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DurableEquipmentDetails {
    pub hcpcs_code: String,
    pub item_description: String,
    pub rental_or_purchase: RentalOrPurchase,
    pub duration_months: u32,
    /// Certificate of Medical Necessity required
    pub cmn_required: bool,
}

impl Default for DurableEquipmentDetails {
    fn default() -> Self {
        Self {
            hcpcs_code: String::new(),
            item_description: String::new(),
            rental_or_purchase: RentalOrPurchase::default(),
            duration_months: 1,
            cmn_required: false,
        }
    }
}

/// Home health details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeHealthDetails {
    pub visit_frequency: String,
    /// Ordered set: no duplicates, canonical iteration order
    pub discipline: BTreeSet<Discipline>,
    pub homebound_status: bool,
    pub certification_period_start: String,
    pub certification_period_end: String,
}

impl HomeHealthDetails {
    /// Add the discipline if absent, remove it if present.
    ///
    /// Returns true when the discipline is selected afterwards.
    pub fn toggle_discipline(&mut self, discipline: Discipline) -> bool {
        if self.discipline.remove(&discipline) {
            false
        } else {
            self.discipline.insert(discipline);
            true
        }
    }
}

/// Category-specific details, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PaTypeDetails {
    Inpatient(InpatientDetails),
    Outpatient(OutpatientDetails),
    Pharmacy(PharmacyDetails),
    Imaging(ImagingDetails),
    DurableEquipment(DurableEquipmentDetails),
    HomeHealth(HomeHealthDetails),
}

impl PaTypeDetails {
    /// The discriminant as a category.
    pub fn category(&self) -> PaType {
        match self {
            PaTypeDetails::Inpatient(_) => PaType::Inpatient,
            PaTypeDetails::Outpatient(_) => PaType::Outpatient,
            PaTypeDetails::Pharmacy(_) => PaType::Pharmacy,
            PaTypeDetails::Imaging(_) => PaType::Imaging,
            PaTypeDetails::DurableEquipment(_) => PaType::DurableEquipment,
            PaTypeDetails::HomeHealth(_) => PaType::HomeHealth,
        }
    }

    /// Fully-populated default record for a category.
    ///
    /// Returns `None` for `general`, which has no detail variant.
    pub fn default_for(pa_type: PaType) -> Option<Self> {
        match pa_type {
            PaType::General => None,
            PaType::Inpatient => Some(PaTypeDetails::Inpatient(InpatientDetails::default())),
            PaType::Outpatient => Some(PaTypeDetails::Outpatient(OutpatientDetails::default())),
            PaType::Pharmacy => Some(PaTypeDetails::Pharmacy(PharmacyDetails::default())),
            PaType::Imaging => Some(PaTypeDetails::Imaging(ImagingDetails::default())),
            PaType::DurableEquipment => Some(PaTypeDetails::DurableEquipment(
                DurableEquipmentDetails::default(),
            )),
            PaType::HomeHealth => Some(PaTypeDetails::HomeHealth(HomeHealthDetails::default())),
        }
    }

    /// Details to edit for `pa_type`, given whatever the draft holds.
    ///
    /// Missing data and data tagged for another category both collapse to
    /// the category default. Matching data is returned as-is.
    pub fn resolve(pa_type: PaType, data: Option<&PaTypeDetails>) -> Option<Self> {
        match data {
            Some(details) if details.category() == pa_type => Some(details.clone()),
            _ => Self::default_for(pa_type),
        }
    }
}
