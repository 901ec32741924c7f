//! Step flow model: the ordered approvers of a document.

use serde::{Deserialize, Serialize};

use super::Role;
use crate::error::{ApprovalError, Result};

/// One approval step within a document's flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowStep {
    /// 1-based position within the flow
    pub position: u32,

    /// Role the deciding user must hold
    pub role: Role,

    /// Specific user required to decide, or `None` for any holder of `role`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<u64>,
}

/// Ordered, non-empty sequence of steps with contiguous positions `1..=N`.
///
/// The only ways to obtain a value are [`StepFlow::new`] and deserialization,
/// both of which run the same validation, so every `StepFlow` in the program
/// is well formed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<FlowStep>", into = "Vec<FlowStep>")]
pub struct StepFlow(Vec<FlowStep>);

impl StepFlow {
    /// Validates and wraps a list of steps.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalError::Validation` when the list is empty or the
    /// positions are not exactly `1..=N` in order.
    pub fn new(steps: Vec<FlowStep>) -> Result<Self> {
        if steps.is_empty() {
            return Err(ApprovalError::validation("step_flow")
                .with_reason("Step flow must contain at least one step"));
        }

        for (index, step) in steps.iter().enumerate() {
            let expected = index as u32 + 1;
            if step.position != expected {
                return Err(ApprovalError::validation("step_flow").with_reason(format!(
                    "Step positions must be contiguous from 1; found {} where {expected} was expected",
                    step.position
                )));
            }
        }

        Ok(Self(steps))
    }

    /// Number of steps in the flow.
    pub fn len(&self) -> u32 {
        self.0.len() as u32
    }

    /// Whether the flow has no steps; false for any validated flow.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Step at a 1-based position.
    pub fn step(&self, position: u32) -> Option<&FlowStep> {
        position
            .checked_sub(1)
            .and_then(|index| self.0.get(index as usize))
    }

    /// Iterate steps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, FlowStep> {
        self.0.iter()
    }

    /// Borrow the steps as a slice.
    pub fn as_slice(&self) -> &[FlowStep] {
        &self.0
    }
}

impl TryFrom<Vec<FlowStep>> for StepFlow {
    type Error = ApprovalError;

    fn try_from(steps: Vec<FlowStep>) -> Result<Self> {
        Self::new(steps)
    }
}

impl From<StepFlow> for Vec<FlowStep> {
    fn from(flow: StepFlow) -> Self {
        flow.0
    }
}

impl<'a> IntoIterator for &'a StepFlow {
    type Item = &'a FlowStep;
    type IntoIter = std::slice::Iter<'a, FlowStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
