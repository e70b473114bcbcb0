//! Multi-dimensional assessment scoring.
//!
//! The pipeline runs in a fixed order: dimension scoring, weighted
//! aggregation, profile classification, normative comparison, validity
//! estimation and recommendations. Every stage is a pure function of the
//! definition and the response set, except normative comparison, which reads
//! from a [`NormativeStore`] and degrades to a default when the store cannot
//! answer.

pub mod bands;
pub mod catalog;
pub mod definition;
pub mod domain;
mod engine;
pub mod normative;
pub mod recommendations;
pub mod registry;
pub mod repository;
pub mod router;
pub mod scorer;
pub mod service;
pub mod validity;

#[cfg(test)]
mod tests;

pub use bands::{Band, BandTable, BandTableError};
pub use definition::{
    AssessmentDefinition, DefinitionError, DimensionDefinition, RecommendationRules,
    RecommendationTier,
};
pub use domain::{
    AnswerOption, AssessmentId, AssessmentRecord, DemographicGroup, DimensionId, DimensionScore,
    OverallResult, Question, Response, ScoreLevel, SubmissionId,
};
pub use engine::AssessmentEngine;
pub use normative::{
    InMemoryNormativeStore, Interpretation, NormativeComparator, NormativeComparison,
    NormativeImportError, NormativeRecord, NormativeStore, NormativeStoreError, NormativeTable,
};
pub use registry::{AssessmentRegistry, AssessmentSummary, RegistryError};
pub use repository::{RepositoryError, ResultRepository, SubmissionSummaryView};
pub use router::{assessment_router, AssessmentRouterState};
pub use scorer::{aggregate, score_dimensions, DimensionScoring};
pub use service::{AssessmentService, AssessmentServiceError, SubmissionRequest};
pub use validity::{estimate_validity, DistortionFlag, ValidityAssessment, ValidityLabel};
