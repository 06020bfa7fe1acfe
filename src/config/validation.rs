//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (task lists reference existing imports)
//! - Check target shapes (`module.attribute` imports, non-empty modules)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Findings are advisory: resolution stays lazy, so a bad alias only
//!   fails when something actually resolves it

use std::fmt;

use crate::config::schema::AliasConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A lifecycle task names an alias missing from `imports`.
    UnknownTask { task: String },
    /// An import target is not of the form `module.attribute`.
    MalformedImport { alias: String, target: String },
    /// A module alias has an empty target.
    EmptyModule { alias: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownTask { task } => {
                write!(f, "task '{}' is not defined under imports", task)
            }
            ValidationError::MalformedImport { alias, target } => {
                write!(f, "import '{}' target '{}' is not of the form module.attribute", alias, target)
            }
            ValidationError::EmptyModule { alias } => {
                write!(f, "module '{}' has an empty target", alias)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration document.
pub fn validate_config(config: &AliasConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for task in config.task_names() {
        let declared = matches!(config.imports.get(task), Some(Some(_)));
        if !declared {
            errors.push(ValidationError::UnknownTask { task: task.to_string() });
        }
    }

    for (alias, target) in &config.imports {
        if let Some(target) = target {
            let well_formed = matches!(
                target.rsplit_once('.'),
                Some((module, attr)) if !module.is_empty() && !attr.is_empty()
            );
            if !well_formed {
                errors.push(ValidationError::MalformedImport {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    for (alias, target) in &config.modules {
        if matches!(target, Some(t) if t.is_empty()) {
            errors.push(ValidationError::EmptyModule { alias: alias.clone() });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
