// board-collab-service/src/models/events.rs
use crate::models::CollaborationRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Domain events handed to the notification sink after a mutation commits
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event_type")]
pub enum DomainEvent {
    #[serde(rename = "invitation.created")]
    InvitationCreated {
        collaboration_id: String,
        project_id: String,
        inviter_id: String,
        invitee_id: String,
        role: CollaborationRole,
    },
    #[serde(rename = "invitation.accepted")]
    InvitationAccepted {
        collaboration_id: String,
        project_id: String,
        inviter_id: String,
        invitee_id: String,
    },
    #[serde(rename = "invitation.declined")]
    InvitationDeclined {
        collaboration_id: String,
        project_id: String,
        inviter_id: String,
        invitee_id: String,
    },
    #[serde(rename = "collaboration.revoked")]
    CollaborationRevoked {
        collaboration_id: String,
        project_id: String,
        invitee_id: String,
        revoked_by: String,
    },
    #[serde(rename = "task.created")]
    TaskCreated {
        task_id: String,
        project_id: String,
        column_id: String,
        created_by: String,
    },
    #[serde(rename = "task.updated")]
    TaskUpdated {
        task_id: String,
        project_id: String,
        updated_by: String,
    },
    #[serde(rename = "task.deleted")]
    TaskDeleted {
        task_id: String,
        project_id: String,
        deleted_by: String,
    },
    #[serde(rename = "task.commented")]
    TaskCommented {
        comment_id: String,
        task_id: String,
        project_id: String,
        author_id: String,
        // user names written as @name in the comment
        mentions: Vec<String>,
    },
    #[serde(rename = "task.moved")]
    TaskMoved {
        task_id: String,
        project_id: String,
        from_column_id: String,
        to_column_id: String,
        position: usize,
        moved_by: String,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::InvitationCreated { .. } => "invitation.created",
            DomainEvent::InvitationAccepted { .. } => "invitation.accepted",
            DomainEvent::InvitationDeclined { .. } => "invitation.declined",
            DomainEvent::CollaborationRevoked { .. } => "collaboration.revoked",
            DomainEvent::TaskCreated { .. } => "task.created",
            DomainEvent::TaskUpdated { .. } => "task.updated",
            DomainEvent::TaskDeleted { .. } => "task.deleted",
            DomainEvent::TaskCommented { .. } => "task.commented",
            DomainEvent::TaskMoved { .. } => "task.moved",
        }
    }
}

// Wire form written to the outbox
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EventEnvelope {
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn now(event: DomainEvent) -> Self {
        Self {
            occurred_at: Utc::now(),
            event,
        }
    }
}
