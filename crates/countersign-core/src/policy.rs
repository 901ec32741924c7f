//! Capability check: may this actor decide this step?

use crate::{
    error::{ApprovalError, Result},
    models::{Actor, FlowStep},
};

/// Whether `actor` satisfies the role and assignee requirements of `step`.
///
/// An unassigned step may be decided by any holder of the role. An assigned
/// step additionally requires the actor to be the assignee.
///
/// ```rust
/// use countersign_core::{models::{Actor, FlowStep, Role}, policy::can_act};
///
/// let step = FlowStep { position: 3, role: Role::Auditor, assigned_user: None };
/// assert!(can_act(&Actor { id: 8, role: Role::Auditor }, &step));
/// assert!(!can_act(&Actor { id: 8, role: Role::Svp }, &step));
/// ```
pub fn can_act(actor: &Actor, step: &FlowStep) -> bool {
    actor.role == step.role && step.assigned_user.map_or(true, |user| user == actor.id)
}

/// [`can_act`] with a reason attached.
///
/// # Errors
///
/// Returns `ApprovalError::Forbidden` naming the unmet requirement.
pub fn authorize(actor: &Actor, step: &FlowStep) -> Result<()> {
    if actor.role != step.role {
        return Err(ApprovalError::forbidden(format!(
            "Step {} requires {}, user {} is {}",
            step.position,
            step.role.label(),
            actor.id,
            actor.role.label()
        )));
    }
    match step.assigned_user {
        Some(assignee) if assignee != actor.id => Err(ApprovalError::forbidden(format!(
            "Step {} is assigned to user {assignee}, not user {}",
            step.position, actor.id
        ))),
        _ => Ok(()),
    }
}
