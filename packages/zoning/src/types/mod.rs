//! Data types shared by the pipeline stages.

pub mod assessment;
pub mod config;
pub mod criterion;
pub mod limit;
pub mod site;

pub use assessment::{ControlValue, Sentinel};
pub use config::PipelineConfig;
pub use criterion::{Criterion, CriterionStrings, CriterionValue, QuantitativeAssessment, ValueSource};
pub use limit::{InvalidUnit, LimitKind, NumericLimit, Unit};
pub use site::{PolicyContent, PolicyDocumentRef, PolicyResponse, Site, SiteQuery};
