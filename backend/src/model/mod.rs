pub mod artifact;
pub mod predictor;
pub mod registry;

pub use predictor::{Capability, ModelError, Predictor, RegisteredModel};
pub use registry::{ModelRegistry, RegistryError};
