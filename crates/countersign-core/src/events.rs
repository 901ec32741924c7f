//! Audit facts and notifications emitted after committed changes.
//!
//! Delivery is the business of the sinks. The engine hands every event to its
//! configured [`AuditSink`] and [`NotificationSink`] once the storage commit
//! has succeeded; sink failures are logged at `warn` and otherwise ignored, so
//! they never undo or fail the operation that produced them.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use jiff::Timestamp;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    machine::Transition,
    models::{Decision, Document, DocumentKind, Role},
};

/// Kinds of events the engine emits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DocumentCreated,
    DocumentApproved,
    DocumentRejected,
    StepAdvanced,
}

impl EventType {
    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::DocumentCreated => "document_created",
            EventType::DocumentApproved => "document_approved",
            EventType::DocumentRejected => "document_rejected",
            EventType::StepAdvanced => "step_advanced",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The document an event is about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub document_id: u64,
    pub kind: DocumentKind,
    pub control_number: String,
}

impl From<&Document> for Subject {
    fn from(document: &Document) -> Self {
        Self {
            document_id: document.id,
            kind: document.kind,
            control_number: document.control_number.clone(),
        }
    }
}

/// A structured, append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditFact {
    pub event_type: EventType,
    pub subject: Subject,
    pub actor_id: u64,
    pub step_number: u32,
    pub timestamp: Timestamp,
    pub properties: serde_json::Value,
}

/// Who a notification is for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Recipient {
    /// A specific user
    User(u64),
    /// Every user holding the role
    Role(Role),
}

/// A message for an approver or the document's creator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub recipient: Recipient,
    pub event_type: EventType,
    pub subject: Subject,
    pub message: String,
    pub timestamp: Timestamp,
}

/// Receives audit facts.
pub trait AuditSink: Send + Sync {
    fn record(&self, fact: &AuditFact) -> anyhow::Result<()>;
}

/// Receives notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Writes events to the `log` facade as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AuditSink for LogSink {
    fn record(&self, fact: &AuditFact) -> anyhow::Result<()> {
        info!(target: "countersign::audit", "{}", serde_json::to_string(fact)?);
        Ok(())
    }
}

impl NotificationSink for LogSink {
    fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(target: "countersign::notify", "{}", serde_json::to_string(notification)?);
        Ok(())
    }
}

/// Keeps every event in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    facts: Mutex<Vec<AuditFact>>,
    notifications: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Audit facts received so far, oldest first.
    pub fn audit_facts(&self) -> Vec<AuditFact> {
        self.facts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Notifications received so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl AuditSink for MemorySink {
    fn record(&self, fact: &AuditFact) -> anyhow::Result<()> {
        self.facts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(fact.clone());
        Ok(())
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification.clone());
        Ok(())
    }
}

/// Audit facts and notifications produced by one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Events {
    pub facts: Vec<AuditFact>,
    pub notifications: Vec<Notification>,
}

/// Fans events out to the configured sinks, swallowing their failures.
#[derive(Clone)]
pub struct EventDispatcher {
    audit: Arc<dyn AuditSink>,
    notifications: Arc<dyn NotificationSink>,
}

impl EventDispatcher {
    pub fn new(audit: Arc<dyn AuditSink>, notifications: Arc<dyn NotificationSink>) -> Self {
        Self {
            audit,
            notifications,
        }
    }

    /// Delivers every event; returns how many deliveries failed.
    pub fn publish(&self, events: &Events) -> usize {
        let mut failures = 0;
        for fact in &events.facts {
            if let Err(e) = self.audit.record(fact) {
                failures += 1;
                warn!(
                    "Failed to record audit fact {} for document {}: {e:#}",
                    fact.event_type, fact.subject.document_id
                );
            }
        }
        for notification in &events.notifications {
            if let Err(e) = self.notifications.notify(notification) {
                failures += 1;
                warn!(
                    "Failed to deliver {} notification for document {}: {e:#}",
                    notification.event_type, notification.subject.document_id
                );
            }
        }
        failures
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(LogSink), Arc::new(LogSink))
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher").finish_non_exhaustive()
    }
}

/// The party expected to decide `document`'s current step.
fn next_approver(document: &Document) -> Option<Recipient> {
    document.current_flow_step().map(|step| match step.assigned_user {
        Some(user) => Recipient::User(user),
        None => Recipient::Role(step.role),
    })
}

/// Events for a freshly created document.
pub fn creation_events(document: &Document) -> Events {
    let subject = Subject::from(document);
    let facts = vec![AuditFact {
        event_type: EventType::DocumentCreated,
        subject: subject.clone(),
        actor_id: document.created_by,
        step_number: document.current_step,
        timestamp: document.created_at,
        properties: json!({
            "title": document.title,
            "steps": document.step_flow.len(),
            "total_debits": document.total_debits().to_string(),
        }),
    }];
    let notifications = next_approver(document)
        .map(|recipient| Notification {
            recipient,
            event_type: EventType::DocumentCreated,
            subject,
            message: format!(
                "{} '{}' awaits your approval (step 1 of {})",
                document.control_number,
                document.title,
                document.step_flow.len()
            ),
            timestamp: document.created_at,
        })
        .into_iter()
        .collect();

    Events {
        facts,
        notifications,
    }
}

/// Events for a committed decision.
///
/// Always one decision fact. A step_advanced fact follows when the document
/// is still pending. The next approver is notified while pending, the creator
/// once terminal.
pub fn decision_events(document: &Document, transition: &Transition) -> Events {
    let subject = Subject::from(document);
    let event_type = match transition.decision {
        Decision::Approved => EventType::DocumentApproved,
        Decision::Rejected => EventType::DocumentRejected,
    };

    let mut facts = vec![AuditFact {
        event_type,
        subject: subject.clone(),
        actor_id: transition.actor_id,
        step_number: transition.step_number,
        timestamp: transition.at,
        properties: json!({
            "step": transition.step_number,
            "remarks": transition.remarks,
            "status": transition.to.as_str(),
        }),
    }];

    let notification = match transition.next_step {
        Some(next_step) => {
            facts.push(AuditFact {
                event_type: EventType::StepAdvanced,
                subject: subject.clone(),
                actor_id: transition.actor_id,
                step_number: next_step,
                timestamp: transition.at,
                properties: json!({ "from_step": transition.step_number, "to_step": next_step }),
            });
            next_approver(document).map(|recipient| Notification {
                recipient,
                event_type: EventType::StepAdvanced,
                subject,
                message: format!(
                    "{} '{}' awaits your approval (step {next_step} of {})",
                    document.control_number,
                    document.title,
                    document.step_flow.len()
                ),
                timestamp: transition.at,
            })
        }
        None => Some(Notification {
            recipient: Recipient::User(document.created_by),
            event_type,
            subject,
            message: format!(
                "{} '{}' was {} at step {}",
                document.control_number,
                document.title,
                transition.to.as_str(),
                transition.step_number
            ),
            timestamp: transition.at,
        }),
    };

    Events {
        facts,
        notifications: notification.into_iter().collect(),
    }
}
