//! Zoning resolution and extraction for South Australian properties.
//!
//! Resolves an address or coordinate pair to a parcel's valuation id, walks
//! the planning policy tree for the zone documents, fetches them and turns
//! their quantitative assessment tables into typed development controls.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use plansa_client::{ClientConfig, PlanSaClient};
//! use zoning::{Pipeline, PipelineConfig, SiteQuery};
//!
//! let api = Arc::new(PlanSaClient::new(ClientConfig::from_env())?);
//! let pipeline = Pipeline::new(api, PipelineConfig::from_env())?;
//!
//! let report = pipeline.run(SiteQuery::address("9 ELIZABETH ST NORWOOD SA 5067")).await?;
//! for assessment in &report.assessments {
//!     println!("{}: {:?}", assessment.document_id, assessment.outcome.assessment.site_coverage);
//! }
//! ```
//!
//! Extraction and validation also work on HTML already in hand:
//!
//! ```rust
//! use zoning::{extract_criterion_strings, validate, ControlValue, Criterion};
//!
//! let strings = extract_criterion_strings("<p>Buildings do not exceed 60% site coverage.</p>");
//! let outcome = validate(&strings);
//! assert!(matches!(outcome.assessment.site_coverage, ControlValue::Limit(_)));
//! assert!(outcome.assessment.get(Criterion::Overlooking).is_default());
//! ```

pub mod error;
pub mod export;
pub mod extract;
pub mod geo;
pub mod pipeline;
pub mod report;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validate;
pub mod variations;

pub use error::{PipelineError, Result};
pub use extract::{
    detect_structure, extract, extract_criterion_strings, extract_with, visible_text,
    ExtractError, TableExtraction, TableMarkers, TableStructure,
};
pub use geo::{WebMercator, WEB_MERCATOR};
pub use pipeline::{DocumentAssessment, Pipeline, PipelineReport};
pub use report::{build_rows, ReportRow};
pub use traits::PlanningApi;
pub use types::{
    ControlValue, Criterion, CriterionStrings, CriterionValue, InvalidUnit, LimitKind,
    NumericLimit, PipelineConfig, PolicyContent, PolicyDocumentRef, PolicyResponse,
    QuantitativeAssessment, Sentinel, Site, SiteQuery, Unit, ValueSource,
};
pub use validate::{validate, validate_strict, ValidationError, ValidationOutcome};
pub use variations::{fetch_zone_variations, DwellingType, ZoneVariation, ZoneVariations};
