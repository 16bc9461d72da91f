use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shared::Disease;
use shared::schema::schema;
use strum::IntoEnumIterator;

use super::artifact::{ArtifactError, ModelArtifact};
use super::predictor::{Predictor, RegisteredModel};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no model registered for {0}")]
    Missing(Disease),
    #[error("failed to load model artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: ArtifactError,
    },
}

/// One registered predictor per disease. Total over [`Disease`] once built.
#[derive(Clone, Debug)]
pub struct ModelRegistry {
    models: HashMap<Disease, RegisteredModel>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Loads `<dir>/<slug>.json` for every disease.
    pub fn load_from_dir(dir: &Path) -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        for disease in Disease::iter() {
            let path = artifact_path(dir, disease);
            let artifact = ModelArtifact::from_path(&path)
                .and_then(|artifact| {
                    artifact.validate(disease, schema(disease).len())?;
                    Ok(artifact)
                })
                .map_err(|source| RegistryError::Artifact {
                    path: path.clone(),
                    source,
                })?;

            log::info!(
                "Loaded {} model from {} ({})",
                disease,
                path.display(),
                artifact.capability()
            );
            builder = builder.register(disease, artifact.into_predictor());
        }
        builder.build()
    }

    pub fn get(&self, disease: Disease) -> Result<&RegisteredModel, RegistryError> {
        self.models
            .get(&disease)
            .ok_or(RegistryError::Missing(disease))
    }
}

pub fn artifact_path(dir: &Path, disease: Disease) -> PathBuf {
    dir.join(format!("{}.json", disease.slug()))
}

#[derive(Default)]
pub struct ModelRegistryBuilder {
    models: HashMap<Disease, RegisteredModel>,
}

impl ModelRegistryBuilder {
    pub fn register(mut self, disease: Disease, predictor: Arc<dyn Predictor>) -> Self {
        self.models.insert(disease, RegisteredModel::new(predictor));
        self
    }

    pub fn build(self) -> Result<ModelRegistry, RegistryError> {
        if let Some(missing) = Disease::iter().find(|d| !self.models.contains_key(d)) {
            return Err(RegistryError::Missing(missing));
        }
        Ok(ModelRegistry {
            models: self.models,
        })
    }
}
