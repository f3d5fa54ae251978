//! Document requirement catalog.
//!
//! The wizard only ever asks one question of the catalog: which documents
//! does this category call for, in what order. [`RequirementCatalog`] is that
//! single method, so the checklist and review can be driven by any source.

mod parser;
mod schema;

pub use parser::{CatalogError, CatalogFile};
pub use schema::validate_catalog_schema;

use std::collections::BTreeMap;
use std::path::Path;

use crate::types::{DocumentRequirement, PaType};

/// Lookup of the documents a category requires.
///
/// Implementations must be deterministic for a given category.
pub trait RequirementCatalog {
    /// Requirements for `pa_type`, in display order. May be empty.
    fn requirements_for(&self, pa_type: PaType) -> Vec<DocumentRequirement>;
}

impl<F> RequirementCatalog for F
where
    F: Fn(PaType) -> Vec<DocumentRequirement>,
{
    fn requirements_for(&self, pa_type: PaType) -> Vec<DocumentRequirement> {
        self(pa_type)
    }
}

/// In-memory catalog keyed by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticCatalog {
    name: String,
    categories: BTreeMap<PaType, Vec<DocumentRequirement>>,
}

impl StaticCatalog {
    /// Empty catalog; every category maps to no documents.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: BTreeMap::new(),
        }
    }

    /// Set the requirements for a category, replacing any already present.
    pub fn with_category(
        mut self,
        pa_type: PaType,
        requirements: Vec<DocumentRequirement>,
    ) -> Self {
        self.categories.insert(pa_type, requirements);
        self
    }

    /// Catalog name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load and validate a catalog file (YAML or JSON).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Ok(CatalogFile::from_file(path)?.into())
    }

    /// Load and validate a YAML catalog.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        Ok(CatalogFile::from_yaml(yaml)?.into())
    }

    /// The built-in reference catalog.
    pub fn standard() -> Self {
        let req = DocumentRequirement::new;

        StaticCatalog::new("Standard PA Requirements")
            .with_category(PaType::General, Vec::new())
            .with_category(
                PaType::Inpatient,
                vec![
                    req(
                        "inp-history-physical",
                        "History and Physical",
                        "Admitting history and physical examination",
                        true,
                    ),
                    req(
                        "inp-admission-order",
                        "Admission Order",
                        "Signed order to admit from the attending physician",
                        true,
                    ),
                    req(
                        "inp-clinical-notes",
                        "Clinical Notes",
                        "Progress notes supporting the level of care",
                        true,
                    ),
                    req(
                        "inp-lab-results",
                        "Lab Results",
                        "Recent laboratory results relevant to the admission",
                        false,
                    ),
                ],
            )
            .with_category(
                PaType::Outpatient,
                vec![
                    req(
                        "out-procedure-order",
                        "Procedure Order",
                        "Signed order naming the planned procedure",
                        true,
                    ),
                    req(
                        "out-clinical-notes",
                        "Clinical Notes",
                        "Office notes documenting medical necessity",
                        true,
                    ),
                    req(
                        "out-conservative-care",
                        "Conservative Care History",
                        "Record of conservative treatment tried first",
                        false,
                    ),
                ],
            )
            .with_category(
                PaType::Pharmacy,
                vec![
                    req(
                        "rx-prescription",
                        "Prescription",
                        "Copy of the prescription as written",
                        true,
                    ),
                    req(
                        "rx-step-therapy",
                        "Step Therapy History",
                        "Formulary alternatives tried and their outcomes",
                        true,
                    ),
                    req(
                        "rx-medical-necessity",
                        "Letter of Medical Necessity",
                        "Prescriber letter supporting the request",
                        false,
                    ),
                ],
            )
            .with_category(
                PaType::Imaging,
                vec![
                    req(
                        "img-order",
                        "Imaging Order",
                        "Signed order from the ordering provider",
                        true,
                    ),
                    req(
                        "img-clinical-notes",
                        "Clinical Notes",
                        "Notes documenting the clinical indication",
                        true,
                    ),
                    req(
                        "img-prior-imaging",
                        "Prior Imaging Reports",
                        "Reports from earlier studies of the same region",
                        false,
                    ),
                ],
            )
            .with_category(
                PaType::DurableEquipment,
                vec![
                    req(
                        "dme-written-order",
                        "Detailed Written Order",
                        "Order describing the item, quantity and duration",
                        true,
                    ),
                    req(
                        "dme-cmn",
                        "Certificate of Medical Necessity",
                        "CMN form where the payer requires one",
                        true,
                    ),
                    req(
                        "dme-face-to-face",
                        "Face-to-Face Encounter Note",
                        "Encounter documentation within the lookback window",
                        true,
                    ),
                    req(
                        "dme-supplier-quote",
                        "Supplier Quote",
                        "Itemized quote from the equipment supplier",
                        false,
                    ),
                ],
            )
            .with_category(
                PaType::HomeHealth,
                vec![
                    req("hh-plan-of-care", "Plan of Care", "Signed home health plan of care", true),
                    req(
                        "hh-face-to-face",
                        "Face-to-Face Encounter Note",
                        "Encounter supporting the need for home services",
                        true,
                    ),
                    req(
                        "hh-homebound",
                        "Homebound Certification",
                        "Physician statement of homebound status",
                        false,
                    ),
                ],
            )
    }

    /// Categories that have an explicit entry, with their requirements.
    pub fn categories(&self) -> impl Iterator<Item = (PaType, &[DocumentRequirement])> {
        self.categories.iter().map(|(t, r)| (*t, r.as_slice()))
    }
}

impl From<CatalogFile> for StaticCatalog {
    fn from(file: CatalogFile) -> Self {
        Self {
            name: file.name,
            categories: file.categories,
        }
    }
}

impl RequirementCatalog for StaticCatalog {
    fn requirements_for(&self, pa_type: PaType) -> Vec<DocumentRequirement> {
        self.categories.get(&pa_type).cloned().unwrap_or_default()
    }
}

/// Look up a requirement by id within a category.
pub fn find_requirement<'a>(
    requirements: &'a [DocumentRequirement],
    id: &str,
) -> Option<&'a DocumentRequirement> {
    requirements.iter().find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_general_is_empty() {
        let catalog = StaticCatalog::standard();
        assert!(catalog.requirements_for(PaType::General).is_empty());
    }

    #[test]
    fn test_standard_covers_every_detail_category() {
        let catalog = StaticCatalog::standard();
        for t in PaType::ALL.iter().filter(|t| t.has_details()) {
            let reqs = catalog.requirements_for(*t);
            assert!(!reqs.is_empty(), "no requirements for {}", t);
            assert!(reqs.iter().any(|r| r.required));
        }
    }

    #[test]
    fn test_standard_is_deterministic() {
        let a = StaticCatalog::standard().requirements_for(PaType::Imaging);
        let b = StaticCatalog::standard().requirements_for(PaType::Imaging);
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_category_is_empty() {
        let catalog = StaticCatalog::new("Sparse");
        assert!(catalog.requirements_for(PaType::Pharmacy).is_empty());
    }

    #[test]
    fn test_closure_is_a_catalog() {
        let catalog = |t: PaType| -> Vec<DocumentRequirement> {
            if t == PaType::Imaging {
                vec![DocumentRequirement::new("a", "A", "", true)]
            } else {
                Vec::new()
            }
        };
        assert_eq!(catalog.requirements_for(PaType::Imaging).len(), 1);
        assert!(catalog.requirements_for(PaType::Inpatient).is_empty());
    }

    #[test]
    fn test_standard_matches_schema_shape() {
        let catalog = StaticCatalog::standard();
        let file = CatalogFile {
            catalog_version: "1.0".to_string(),
            name: catalog.name().to_string(),
            description: None,
            categories: catalog.categories().map(|(t, r)| (t, r.to_vec())).collect(),
        };
        let value = serde_json::to_value(&file).unwrap();
        assert!(validate_catalog_schema(&value).is_ok());
    }
}
