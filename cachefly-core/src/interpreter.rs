//! Interpreter - Execute a Plan using a Provider
//!
//! The Interpreter executes planned changes in order, collecting the
//! resulting states. This is where side effects actually occur.

use crate::diagnostics::Diagnostics;
use crate::plan::{Action, Plan, PlannedChange};
use crate::provider::{Provider, ProviderError, ProviderResult};
use crate::resource::{ResourceId, State};

/// Result of executing one planned change
#[derive(Debug)]
pub enum ApplyOutcome {
    /// Create or Replace succeeded
    Created { state: State },
    /// Update succeeded
    Updated { state: State },
    /// Delete succeeded
    Deleted { id: ResourceId },
    /// Nothing to do
    Unchanged { id: ResourceId },
    /// Skipped (e.g., dry-run)
    Skipped { id: ResourceId, reason: String },
}

/// Result of executing the entire Plan
#[derive(Debug)]
pub struct ApplyResult {
    pub outcomes: Vec<ProviderResult<ApplyOutcome>>,
    /// Warnings from changes that succeeded
    pub warnings: Diagnostics,
    pub success_count: usize,
    pub failure_count: usize,
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        self.failure_count == 0
    }
}

/// Interpreter configuration
#[derive(Debug, Clone, Default)]
pub struct InterpreterConfig {
    /// If true, skip actual side effects
    pub dry_run: bool,
    /// Continue on error
    pub continue_on_error: bool,
}

/// Interpreter that executes planned changes using a Provider
pub struct Interpreter<'a> {
    provider: &'a dyn Provider,
    config: InterpreterConfig,
}

impl<'a> Interpreter<'a> {
    pub fn new(provider: &'a dyn Provider) -> Self {
        Self {
            provider,
            config: InterpreterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute a Plan, causing side effects
    pub async fn apply(&self, plan: &Plan) -> ApplyResult {
        let mut outcomes = Vec::new();
        let mut warnings = Diagnostics::new();
        let mut success_count = 0;
        let mut failure_count = 0;

        for change in plan.changes() {
            let mut diags = Diagnostics::new();
            let mut prior_deleted = false;
            let result = self
                .execute_change(change, &mut diags, &mut prior_deleted)
                .await;

            match &result {
                Ok(_) => {
                    success_count += 1;
                    warnings.extend(diags);
                }
                Err(e) => {
                    failure_count += 1;
                    log::debug!("Applying {} failed: {}", change.id, e);
                    // The remote object is gone even though its replacement failed
                    if prior_deleted {
                        outcomes.push(Ok(ApplyOutcome::Deleted {
                            id: change.id.clone(),
                        }));
                    }
                    if !self.config.continue_on_error {
                        outcomes.push(result);
                        break;
                    }
                }
            }

            outcomes.push(result);
        }

        ApplyResult {
            outcomes,
            warnings,
            success_count,
            failure_count,
        }
    }

    async fn execute_change(
        &self,
        change: &PlannedChange,
        diags: &mut Diagnostics,
        prior_deleted: &mut bool,
    ) -> ProviderResult<ApplyOutcome> {
        let id = change.id.clone();

        if self.config.dry_run {
            return Ok(ApplyOutcome::Skipped {
                id,
                reason: "dry-run mode".to_string(),
            });
        }

        if change.action == Action::NoOp {
            return Ok(ApplyOutcome::Unchanged { id });
        }

        let resource = self
            .provider
            .resource(&id.resource_type)
            .map_err(|e| e.for_resource(id.clone()))?;

        let outcome = match change.action {
            Action::Create => resource
                .create(diags, &change.planned_resource())
                .await
                .map(|state| ApplyOutcome::Created { state }),
            Action::Update => match &change.prior {
                Some(prior) => resource
                    .update(diags, prior, &change.planned_resource())
                    .await
                    .map(|state| ApplyOutcome::Updated { state }),
                None => {
                    diags.add_error("Missing Prior State", "Update planned without prior state.");
                    None
                }
            },
            Action::Replace => {
                if let Some(prior) = &change.prior {
                    resource.delete(diags, prior).await;
                }
                if diags.has_error() {
                    None
                } else {
                    *prior_deleted = change.prior.is_some();
                    resource
                        .create(diags, &change.planned_resource())
                        .await
                        .map(|state| ApplyOutcome::Created { state })
                }
            }
            Action::Delete => {
                if let Some(prior) = &change.prior {
                    resource.delete(diags, prior).await;
                }
                Some(ApplyOutcome::Deleted { id: id.clone() })
            }
            Action::NoOp => Some(ApplyOutcome::Unchanged { id: id.clone() }),
        };

        if diags.has_error() {
            return Err(ProviderError::from_diagnostics(std::mem::take(diags)).for_resource(id));
        }

        outcome.ok_or_else(|| {
            ProviderError::new("Provider returned no state without reporting an error")
                .for_resource(id)
        })
    }
}
