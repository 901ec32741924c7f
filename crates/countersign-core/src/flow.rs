//! Step flow definition: turning a role template into a document's flow.

use std::collections::BTreeMap;

use crate::{
    error::{ApprovalError, Result},
    models::{FlowStep, Role, StepFlow, User},
};

/// Ordered roles every new document is routed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTemplate {
    roles: Vec<Role>,
}

impl StepTemplate {
    /// Creates a template from an ordered list of roles.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalError::Validation` for an empty list.
    pub fn new(roles: Vec<Role>) -> Result<Self> {
        if roles.is_empty() {
            return Err(ApprovalError::validation("step_template")
                .with_reason("Template must contain at least one role"));
        }
        Ok(Self { roles })
    }

    /// Roles in approval order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Builds a concrete flow, pinning the explicitly assigned users.
    ///
    /// Steps without an assignment stay open to any holder of the role.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalError::Validation` when an assignment names a position
    /// outside the template.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use countersign_core::{flow::StepTemplate, models::Role};
    ///
    /// let template = StepTemplate::default();
    /// let flow = template.materialize(&BTreeMap::from([(4, 42)]))?;
    /// assert_eq!(flow.len(), 4);
    /// assert_eq!(flow.step(1).map(|s| s.role), Some(Role::AccountingAssistant));
    /// assert_eq!(flow.step(4).and_then(|s| s.assigned_user), Some(42));
    /// # Ok::<(), countersign_core::ApprovalError>(())
    /// ```
    pub fn materialize(&self, assignments: &BTreeMap<u32, u64>) -> Result<StepFlow> {
        let len = self.roles.len() as u32;
        if let Some(position) = assignments.keys().find(|p| **p == 0 || **p > len) {
            return Err(ApprovalError::validation("approvers").with_reason(format!(
                "Step {position} does not exist; the flow has steps 1 to {len}"
            )));
        }

        let steps = self
            .roles
            .iter()
            .zip(1u32..)
            .map(|(role, position)| FlowStep {
                position,
                role: *role,
                assigned_user: assignments.get(&position).copied(),
            })
            .collect();

        StepFlow::new(steps)
    }
}

impl Default for StepTemplate {
    fn default() -> Self {
        Self {
            roles: Role::ALL.to_vec(),
        }
    }
}

/// Checks that every pinned approver exists and holds the step's role.
///
/// `lookup` resolves a user ID against storage.
pub fn verify_assignees<F>(flow: &StepFlow, mut lookup: F) -> Result<()>
where
    F: FnMut(u64) -> Result<Option<User>>,
{
    for step in flow {
        let Some(user_id) = step.assigned_user else {
            continue;
        };
        let user = lookup(user_id)?.ok_or_else(|| {
            ApprovalError::validation("approvers")
                .with_reason(format!("User {user_id} assigned to step {} does not exist", step.position))
        })?;
        if user.role != step.role {
            return Err(ApprovalError::validation("approvers").with_reason(format!(
                "User {user_id} is {} but step {} requires {}",
                user.role.label(),
                step.position,
                step.role.label()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_order() {
        let template = StepTemplate::default();
        assert_eq!(
            template.roles(),
            &[
                Role::AccountingAssistant,
                Role::AccountingHead,
                Role::Auditor,
                Role::Svp
            ]
        );
    }

    #[test]
    fn test_empty_template_rejected() {
        assert!(matches!(
            StepTemplate::new(vec![]),
            Err(ApprovalError::Validation { .. })
        ));
    }

    #[test]
    fn test_materialize_without_assignments() {
        let flow = StepTemplate::default()
            .materialize(&BTreeMap::new())
            .expect("valid flow");
        assert!(flow.iter().all(|s| s.assigned_user.is_none()));
        let positions: Vec<u32> = flow.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_materialize_rejects_out_of_range_assignment() {
        let template = StepTemplate::new(vec![Role::Auditor]).expect("template");
        for position in [0, 2] {
            let err = template
                .materialize(&BTreeMap::from([(position, 1)]))
                .unwrap_err();
            assert!(matches!(err, ApprovalError::Validation { ref field, .. } if field == "approvers"));
        }
    }

    #[test]
    fn test_verify_assignees_role_mismatch() {
        let flow = StepTemplate::default()
            .materialize(&BTreeMap::from([(3, 9)]))
            .expect("valid flow");

        let err = verify_assignees(&flow, |id| {
            Ok(Some(User {
                id,
                name: "Sam".to_string(),
                role: Role::Svp,
            }))
        })
        .unwrap_err();
        assert!(err.to_string().contains("requires Auditor"));
    }

    #[test]
    fn test_verify_assignees_unknown_user() {
        let flow = StepTemplate::default()
            .materialize(&BTreeMap::from([(1, 5)]))
            .expect("valid flow");
        let err = verify_assignees(&flow, |_| Ok(None)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_verify_assignees_skips_open_steps() {
        let flow = StepTemplate::default()
            .materialize(&BTreeMap::new())
            .expect("valid flow");
        verify_assignees(&flow, |_| panic!("lookup should not run")).expect("no pinned users");
    }
}
