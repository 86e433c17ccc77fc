//! Resolution and extraction pipeline.
//!
//! Stages run in order, each handing its output to the next:
//! - Site resolution (address or coordinates → valuation id)
//! - Document tree walk (valuation id → zone policy document ids)
//! - Policy fetch (document ids → HTML, concurrent, order preserved)
//! - Table extraction and validation (HTML → typed assessment)
//!
//! Resolution, walk and fetch failures abort the run. Extraction never
//! fails; validation problems are recorded per field.

pub mod documents;
pub mod fetch;
pub mod site;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

pub use documents::{list_zone_policy_documents, select_zone_documents};
pub use fetch::{fetch_all, fetch_policy, fetch_policy_content};
pub use site::{resolve, resolve_by_address, resolve_by_coordinates};

use crate::error::{PipelineError, Result};
use crate::export;
use crate::extract::{extract_with_selectors, MarkerSelectors, TableExtraction};
use crate::report::{build_rows, ReportRow};
use crate::traits::PlanningApi;
use crate::types::{PipelineConfig, PolicyContent, PolicyDocumentRef, Site, SiteQuery};
use crate::validate::{validate, ValidationOutcome};
use crate::variations::{fetch_zone_variations, ZoneVariations};

/// Extraction and validation results for one policy document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAssessment {
    pub document_id: String,
    pub extraction: TableExtraction,
    pub outcome: ValidationOutcome,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub site: Site,
    pub documents: Vec<PolicyDocumentRef>,
    pub assessments: Vec<DocumentAssessment>,
    pub variations: ZoneVariations,
}

impl PipelineReport {
    /// `NoPolicyDocuments` when the site has no zone policies. The run itself
    /// still succeeds in that case; callers decide whether it matters.
    pub fn ensure_documents(&self) -> Result<()> {
        if self.documents.is_empty() {
            return Err(PipelineError::NoPolicyDocuments {
                valuation_id: self.site.valuation_id.clone(),
            });
        }
        Ok(())
    }

    /// Report rows for each document, paired with its id.
    pub fn rows(&self) -> Vec<(&str, Vec<ReportRow>)> {
        self.assessments
            .iter()
            .map(|a| {
                (
                    a.document_id.as_str(),
                    build_rows(&a.outcome.assessment, &self.variations),
                )
            })
            .collect()
    }
}

pub struct Pipeline {
    api: Arc<dyn PlanningApi>,
    config: PipelineConfig,
    selectors: MarkerSelectors,
}

impl Pipeline {
    /// Fails when the configured table markers are not valid selectors.
    pub fn new(api: Arc<dyn PlanningApi>, config: PipelineConfig) -> Result<Self> {
        let selectors = config
            .markers
            .compile()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            api,
            config,
            selectors,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, query: SiteQuery) -> Result<PipelineReport> {
        let api = self.api.as_ref();
        info!(query = %query, "Pipeline run starting");

        // 1. Resolve the site
        let site = site::resolve(api, &query).await?;

        // 2. Walk the document tree
        let documents = documents::list_zone_policy_documents(api, &site.valuation_id).await?;

        // 3. Fetch every zone document
        let responses = fetch::fetch_all(
            api,
            &site.valuation_id,
            &documents,
            self.config.max_concurrent_fetches,
        )
        .await?;
        let contents = responses
            .iter()
            .map(fetch::canonical_content)
            .collect::<Result<Vec<PolicyContent>>>()?;

        if let Some(dir) = &self.config.export_dir {
            if let Err(e) = export::write_snapshots(dir, &contents).await {
                warn!(dir = %dir.display(), error = %e, "Failed to export policy snapshots");
            }
        }

        // 4. Extract and validate
        let assessments: Vec<DocumentAssessment> = contents
            .iter()
            .map(|content| {
                let extraction = extract_with_selectors(&content.html, &self.selectors);
                let outcome = validate(&extraction.criteria);
                info!(
                    document_id = %content.document_id,
                    structure = ?extraction.structure,
                    extracted = outcome.assessment.extracted_count(),
                    rejected = outcome.rejected.len(),
                    "Assessed policy document"
                );
                DocumentAssessment {
                    document_id: content.document_id.clone(),
                    extraction,
                    outcome,
                }
            })
            .collect();

        // 5. Zone variations are supplementary; losing them does not fail the run
        let variations = if self.config.fetch_variations {
            fetch_zone_variations(api, &site.valuation_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(valuation_id = %site.valuation_id, error = %e, "Failed to fetch zone variations");
                    ZoneVariations::default()
                })
        } else {
            ZoneVariations::default()
        };

        info!(
            valuation_id = %site.valuation_id,
            documents = documents.len(),
            variations = variations.len(),
            "Pipeline run complete"
        );

        Ok(PipelineReport {
            site,
            documents,
            assessments,
            variations,
        })
    }
}
