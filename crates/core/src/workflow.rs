// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow templates: the phase/step layout a job is created from.
//!
//! Templates are plain data so they can travel inside `job:created` events
//! and be loaded from TOML:
//!
//! ```toml
//! [[phases]]
//! id = "analysis"
//! name = "Repository Analysis"
//!
//! [[phases.steps]]
//! id = "clone"
//! name = "Clone Repository"
//! description = "Fetching repository contents"
//! ```

use crate::error::WorkflowError;
use crate::phase::Phase;
use crate::step::Step;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<StepTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub phases: Vec<PhaseTemplate>,
}

impl WorkflowTemplate {
    /// The standard documentation pipeline.
    pub fn documentation() -> Self {
        fn phase(id: &str, name: &str, steps: &[(&str, &str, &str)]) -> PhaseTemplate {
            PhaseTemplate {
                id: id.to_string(),
                name: name.to_string(),
                steps: steps
                    .iter()
                    .map(|(id, name, description)| StepTemplate {
                        id: id.to_string(),
                        name: name.to_string(),
                        description: description.to_string(),
                    })
                    .collect(),
            }
        }

        Self {
            phases: vec![
                phase(
                    "phase-1",
                    "Repository Analysis",
                    &[
                        ("step-1-1", "Clone Repository", "Fetching repository contents"),
                        (
                            "step-1-2",
                            "Detect Languages",
                            "Identifying programming languages and frameworks",
                        ),
                        (
                            "step-1-3",
                            "Parse File Structure",
                            "Building dependency graph and module map",
                        ),
                    ],
                ),
                phase(
                    "phase-2",
                    "Code Understanding",
                    &[
                        (
                            "step-2-1",
                            "Extract Components",
                            "Analyzing components and their relationships",
                        ),
                        (
                            "step-2-2",
                            "Analyze Business Logic",
                            "Understanding core application logic and data flow",
                        ),
                        ("step-2-3", "Map API Endpoints", "Documenting API routes and handlers"),
                        (
                            "step-2-4",
                            "Identify Patterns",
                            "Detecting design patterns and architectural decisions",
                        ),
                    ],
                ),
                phase(
                    "phase-3",
                    "Documentation Generation",
                    &[
                        ("step-3-1", "Generate Overview", "Creating high-level project documentation"),
                        (
                            "step-3-2",
                            "Write Technical Docs",
                            "Generating detailed technical documentation",
                        ),
                        ("step-3-3", "Create Diagrams", "Building architecture and flow diagrams"),
                        (
                            "step-3-4",
                            "Generate API Reference",
                            "Creating API documentation with examples",
                        ),
                    ],
                ),
                phase(
                    "phase-4",
                    "Finalization",
                    &[
                        (
                            "step-4-1",
                            "Review & Validate",
                            "Checking documentation accuracy and completeness",
                        ),
                        (
                            "step-4-2",
                            "Format Output",
                            "Formatting and organizing final documentation",
                        ),
                        ("step-4-3", "Save Results", "Persisting documentation to storage"),
                    ],
                ),
            ],
        }
    }

    /// Parse and validate a template from TOML.
    pub fn from_toml(source: &str) -> Result<Self, WorkflowError> {
        let template: Self =
            toml::from_str(source).map_err(|e| WorkflowError::InvalidWorkflow(e.to_string()))?;
        template.validate()?;
        Ok(template)
    }

    pub fn to_toml(&self) -> Result<String, WorkflowError> {
        toml::to_string(self).map_err(|e| WorkflowError::InvalidWorkflow(e.to_string()))
    }

    /// Recover the layout of existing phases (statuses are dropped).
    pub fn from_phases(phases: &[Phase]) -> Self {
        Self {
            phases: phases
                .iter()
                .map(|phase| PhaseTemplate {
                    id: phase.id.clone(),
                    name: phase.name.clone(),
                    steps: phase
                        .steps
                        .iter()
                        .map(|step| StepTemplate {
                            id: step.id.clone(),
                            name: step.name.clone(),
                            description: step.description.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// At least one phase; non-empty names; phase ids unique; step ids unique
    /// across the whole workflow (steps are addressed by id within a job).
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let invalid = |msg: String| Err(WorkflowError::InvalidWorkflow(msg));
        if self.phases.is_empty() {
            return invalid("workflow has no phases".to_string());
        }
        let mut phase_ids = HashSet::new();
        let mut step_ids = HashSet::new();
        for phase in &self.phases {
            if phase.id.trim().is_empty() || phase.name.trim().is_empty() {
                return invalid("phase id and name must not be empty".to_string());
            }
            if !phase_ids.insert(phase.id.as_str()) {
                return invalid(format!("duplicate phase id '{}'", phase.id));
            }
            for step in &phase.steps {
                if step.id.trim().is_empty() || step.name.trim().is_empty() {
                    return invalid(format!("step in phase '{}' has an empty id or name", phase.id));
                }
                if !step_ids.insert(step.id.as_str()) {
                    return invalid(format!("duplicate step id '{}'", step.id));
                }
            }
        }
        Ok(())
    }

    /// Fresh phases with every step pending.
    pub fn instantiate(&self) -> Vec<Phase> {
        self.phases
            .iter()
            .map(|phase| {
                Phase::new(
                    phase.id.clone(),
                    phase.name.clone(),
                    phase
                        .steps
                        .iter()
                        .map(|s| Step::new(s.id.clone(), s.name.clone(), s.description.clone()))
                        .collect(),
                )
            })
            .collect()
    }

    pub fn step_count(&self) -> usize {
        self.phases.iter().map(|p| p.steps.len()).sum()
    }
}

impl Default for WorkflowTemplate {
    fn default() -> Self {
        Self::documentation()
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
