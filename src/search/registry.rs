//! Backend instance registry.
//!
//! # Responsibilities
//! - Hold the ordered mirror families (primary first) and their instances
//! - Parse instance base URLs once at startup
//!
//! # Design Decisions
//! - Built once from configuration and never mutated; shared via Arc
//! - Order is exactly the configured order; no runtime reprioritization

use thiserror::Error;
use url::Url;

use crate::config::{FamilyConfig, ResponseShape};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("family '{family}' has invalid instance URL '{url}'")]
    InvalidInstance { family: String, url: String },
}

/// A group of interchangeable mirrors sharing one response shape.
#[derive(Debug, Clone)]
pub struct BackendFamily {
    pub name: String,
    pub shape: ResponseShape,
    pub instances: Vec<Url>,
}

/// Immutable, ordered set of backend families.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    families: Vec<BackendFamily>,
}

impl Registry {
    pub fn new(families: Vec<BackendFamily>) -> Self {
        Self { families }
    }

    pub fn from_config(families: &[FamilyConfig]) -> Result<Self, RegistryError> {
        let mut built = Vec::with_capacity(families.len());
        for family in families {
            let mut instances = Vec::with_capacity(family.instances.len());
            for raw in &family.instances {
                let url = Url::parse(raw)
                    .ok()
                    .filter(|u| matches!(u.scheme(), "http" | "https") && !u.cannot_be_a_base())
                    .ok_or_else(|| RegistryError::InvalidInstance {
                        family: family.name.clone(),
                        url: raw.clone(),
                    })?;
                instances.push(url);
            }
            built.push(BackendFamily {
                name: family.name.clone(),
                shape: family.shape,
                instances,
            });
        }
        Ok(Self::new(built))
    }

    /// Families in the order they must be tried.
    pub fn families(&self) -> &[BackendFamily] {
        &self.families
    }

    pub fn instance_count(&self) -> usize {
        self.families.iter().map(|f| f.instances.len()).sum()
    }
}
