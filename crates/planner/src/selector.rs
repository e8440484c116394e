//! Step selection
//!
//! Membership in the selection decides whether a stage runs; the registry
//! order decides when. Input order never matters.

use std::collections::HashSet;

use contracts::{ContractError, ExecutionSelection, RawSelection, StageId};
use tracing::{debug, instrument};

use crate::StageRegistry;

/// Turns raw user selections into validated `ExecutionSelection`s
pub struct StepSelector;

impl StepSelector {
    /// Normalize, deduplicate and validate a raw selection.
    ///
    /// # Errors
    /// - `UnknownStage` for any id (or alias) not in the registry
    /// - `MalformedSelection` if nothing remains after normalization
    #[instrument(name = "step_selector_select", skip(registry))]
    pub fn select(
        raw: &RawSelection,
        registry: &StageRegistry,
    ) -> Result<ExecutionSelection, ContractError> {
        let mut wanted: HashSet<StageId> = HashSet::new();
        for name in raw.segments() {
            let stage = registry
                .find(name)
                .ok_or_else(|| ContractError::unknown_stage(name, registry.known_ids()))?;
            wanted.insert(stage.id.clone());
        }

        if wanted.is_empty() {
            return Err(ContractError::malformed_selection(
                "selection contains no stage ids",
            ));
        }

        let stages: Vec<StageId> = registry
            .stages()
            .iter()
            .filter(|s| wanted.contains(&s.id))
            .map(|s| s.id.clone())
            .collect();

        debug!(selected = ?stages, "Selection normalized");
        Ok(ExecutionSelection::from_canonical(stages))
    }

    /// Like [`StepSelector::select`], with an absent selection meaning every stage.
    pub fn select_or_all(
        raw: Option<&RawSelection>,
        registry: &StageRegistry,
    ) -> Result<ExecutionSelection, ContractError> {
        match raw {
            Some(raw) => Self::select(raw, registry),
            None => Ok(ExecutionSelection::from_canonical(
                registry.stages().iter().map(|s| s.id.clone()).collect(),
            )),
        }
    }
}
