// board-collab-service/src/models/collaboration.rs
use crate::models::ServiceError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Invitations expire after 7 days unless configured otherwise
pub const DEFAULT_INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaborationRole {
    Viewer,
    Editor,
}

impl FromStr for CollaborationRole {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "VIEWER" => Ok(CollaborationRole::Viewer),
            "EDITOR" => Ok(CollaborationRole::Editor),
            other => Err(ServiceError::InvalidRole(format!(
                "'{}' is not a collaboration role, expected VIEWER or EDITOR",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollaborationStatus {
    Pending,
    Accepted,
    Declined,
    Revoked,
}

impl CollaborationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationStatus::Pending => "pending",
            CollaborationStatus::Accepted => "accepted",
            CollaborationStatus::Declined => "declined",
            CollaborationStatus::Revoked => "revoked",
        }
    }
}

// Invitee's answer to a pending invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    #[serde(alias = "accept", alias = "accepted")]
    Accept,
    #[serde(alias = "decline", alias = "declined")]
    Decline,
}

impl Decision {
    pub fn resulting_status(&self) -> CollaborationStatus {
        match self {
            Decision::Accept => CollaborationStatus::Accepted,
            Decision::Decline => CollaborationStatus::Declined,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Collaboration {
    pub id: String,
    pub project_id: String,
    pub inviter_id: String,
    pub invitee_id: String,
    pub role: CollaborationRole,
    pub status: CollaborationStatus,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl Collaboration {
    pub fn new(
        project_id: String,
        inviter_id: String,
        invitee_id: String,
        role: CollaborationRole,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id,
            inviter_id,
            invitee_id,
            role,
            status: CollaborationStatus::Pending,
            invited_at: now,
            responded_at: None,
            expires_at: now + ttl,
        }
    }

    // A pending invitation past its expiry reads as declined
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == CollaborationStatus::Pending && now > self.expires_at
    }

    pub fn effective_status(&self, now: DateTime<Utc>) -> CollaborationStatus {
        if self.is_expired(now) {
            CollaborationStatus::Declined
        } else {
            self.status
        }
    }

    // Blocks a second invitation for the same (project, invitee) pair.
    // expires_at only bounds the response window; acceptance does not lapse.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.effective_status(now),
            CollaborationStatus::Pending | CollaborationStatus::Accepted
        )
    }

    pub fn grants_access(&self) -> bool {
        self.status == CollaborationStatus::Accepted
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateInvitationRequest {
    pub project_id: String,
    pub invitee_id: String,
    pub role: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RespondInvitationRequest {
    pub decision: Decision,
}
