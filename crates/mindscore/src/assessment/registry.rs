use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::catalog;
use super::definition::{AssessmentDefinition, DefinitionError};
use super::domain::{AssessmentId, DimensionId, Question};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read assessment definitions: {0}")]
    Io(#[from] std::io::Error),
    #[error("assessment definitions are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Public listing entry for an assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentSummary {
    pub id: AssessmentId,
    pub title: String,
    pub description: String,
    pub dimensions: Vec<DimensionSummary>,
    pub question_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSummary {
    pub id: DimensionId,
    pub label: String,
}

/// Validated assessment definitions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct AssessmentRegistry {
    definitions: BTreeMap<AssessmentId, Arc<AssessmentDefinition>>,
}

impl AssessmentRegistry {
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for definition in catalog::builtin() {
            registry
                .definitions
                .insert(definition.id.clone(), Arc::new(definition));
        }
        registry
    }

    /// Add or replace a definition after validating it.
    pub fn register(&mut self, definition: AssessmentDefinition) -> Result<(), DefinitionError> {
        definition.validate()?;
        info!(assessment = %definition.id, questions = definition.questions.len(), "assessment registered");
        self.definitions
            .insert(definition.id.clone(), Arc::new(definition));
        Ok(())
    }

    /// Merge a JSON array of definitions. Nothing is registered unless every
    /// definition in the file is valid.
    pub fn load_json(&mut self, raw: &str) -> Result<usize, RegistryError> {
        let definitions: Vec<AssessmentDefinition> = serde_json::from_str(raw)?;
        for definition in &definitions {
            definition.validate()?;
        }
        let count = definitions.len();
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(count)
    }

    pub fn load_json_path<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, RegistryError> {
        let raw = std::fs::read_to_string(path)?;
        self.load_json(&raw)
    }

    pub fn get(&self, id: &AssessmentId) -> Option<Arc<AssessmentDefinition>> {
        self.definitions.get(id).cloned()
    }

    pub fn questions(&self, id: &AssessmentId) -> Option<Vec<Question>> {
        self.definitions
            .get(id)
            .map(|definition| definition.questions.clone())
    }

    pub fn list(&self) -> Vec<AssessmentSummary> {
        self.definitions
            .values()
            .map(|definition| AssessmentSummary {
                id: definition.id.clone(),
                title: definition.title.clone(),
                description: definition.description.clone(),
                dimensions: definition
                    .dimensions
                    .iter()
                    .map(|dimension| DimensionSummary {
                        id: dimension.id.clone(),
                        label: dimension.label.clone(),
                    })
                    .collect(),
                question_count: definition.questions.len(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
