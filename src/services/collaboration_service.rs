// board-collab-service/src/services/collaboration_service.rs
use crate::models::{
    Collaboration, CollaborationRole, CollaborationStatus, CreateInvitationRequest, Decision,
    DomainEvent, ServiceError,
};
use crate::services::{permission_service, AppState};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

// Collaboration records keyed by id
#[derive(Clone, Default)]
pub struct CollaborationStore {
    records: Arc<Mutex<HashMap<String, Collaboration>>>,
}

impl CollaborationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Collaboration>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: Arc::new(Mutex::new(map)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Collaboration>>, ServiceError> {
        self.records.lock().map_err(|e| {
            error!("Collaboration store lock error: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    pub fn all(&self) -> Result<Vec<Collaboration>, ServiceError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    pub fn find(&self, collaboration_id: &str) -> Result<Option<Collaboration>, ServiceError> {
        Ok(self.lock()?.get(collaboration_id).cloned())
    }

    // Role of the principal's ACCEPTED record on the project, if any
    pub fn accepted_role(
        &self,
        project_id: &str,
        principal_id: &str,
    ) -> Result<Option<CollaborationRole>, ServiceError> {
        Ok(self
            .lock()?
            .values()
            .find(|record| {
                record.project_id == project_id
                    && record.invitee_id == principal_id
                    && record.grants_access()
            })
            .map(|record| record.role))
    }

    pub fn discard(&self, collaboration_id: &str) -> Result<Option<Collaboration>, ServiceError> {
        Ok(self.lock()?.remove(collaboration_id))
    }

    pub fn remove_for_project(&self, project_id: &str) -> Result<usize, ServiceError> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, record| record.project_id != project_id);
        Ok(before - records.len())
    }

    fn select<F>(&self, predicate: F) -> Result<Vec<Collaboration>, ServiceError>
    where
        F: Fn(&Collaboration) -> bool,
    {
        let mut selected: Vec<Collaboration> = self
            .lock()?
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.invited_at.cmp(&b.invited_at).then(a.id.cmp(&b.id)));
        Ok(selected)
    }
}

// Mark an expired PENDING record as DECLINED; returns whether it changed
fn self_heal(record: &mut Collaboration, now: DateTime<Utc>) -> bool {
    if record.is_expired(now) {
        debug!("Invitation {} expired at {}, marking declined", record.id, record.expires_at);
        record.status = CollaborationStatus::Declined;
        true
    } else {
        false
    }
}

// A project deleted between the access check and the insert has already
// had its records purged; drop the new one so nothing outlives the board.
pub(crate) fn discard_if_project_gone(
    state: &AppState,
    invitation: &Collaboration,
) -> Result<(), ServiceError> {
    match state.boards.project_access(&invitation.project_id) {
        Err(ServiceError::NotFound(message)) => {
            error!(
                "❌ Project {} was deleted while inviting {}",
                invitation.project_id, invitation.invitee_id
            );
            state.collaborations.discard(&invitation.id)?;
            Err(ServiceError::NotFound(message))
        }
        Err(e) => Err(e),
        Ok(_) => Ok(()),
    }
}

// Create a PENDING invitation for `request.invitee_id`
pub fn create_invitation(
    state: &AppState,
    inviter_id: &str,
    request: &CreateInvitationRequest,
    now: DateTime<Utc>,
) -> Result<Collaboration, ServiceError> {
    info!(
        "📧 Creating invitation to project: {} for user: {}",
        request.project_id, request.invitee_id
    );

    let (owner_id, _) = state.boards.project_access(&request.project_id)?;
    permission_service::authorize_write(state, &request.project_id, inviter_id)?;

    let role: CollaborationRole = request.role.parse()?;

    if request.invitee_id == owner_id {
        error!("❌ Refusing to invite the owner of project {}", request.project_id);
        return Err(ServiceError::SelfInvite);
    }
    if request.invitee_id.trim().is_empty() {
        return Err(ServiceError::BadRequest("invitee_id must not be empty".to_string()));
    }

    let invitation = {
        let mut records = state.collaborations.lock()?;

        let mut active = false;
        for record in records.values_mut().filter(|record| {
            record.project_id == request.project_id && record.invitee_id == request.invitee_id
        }) {
            self_heal(record, now);
            active |= record.is_active(now);
        }

        if active {
            error!(
                "❌ Active collaboration already exists for user {} on project {}",
                request.invitee_id, request.project_id
            );
            return Err(ServiceError::Conflict(
                "An active invitation or collaboration already exists for this user on this project"
                    .to_string(),
            ));
        }

        let invitation = Collaboration::new(
            request.project_id.clone(),
            inviter_id.to_string(),
            request.invitee_id.clone(),
            role,
            now,
            state.invitation_ttl,
        );
        records.insert(invitation.id.clone(), invitation.clone());
        invitation
    };

    discard_if_project_gone(state, &invitation)?;
    info!("✅ Invitation created: {}", invitation.id);

    state.publish(DomainEvent::InvitationCreated {
        collaboration_id: invitation.id.clone(),
        project_id: invitation.project_id.clone(),
        inviter_id: invitation.inviter_id.clone(),
        invitee_id: invitation.invitee_id.clone(),
        role: invitation.role,
    });
    state.persist();

    Ok(invitation)
}

// Accept or decline. Re-sending the decision a record already carries is a
// no-op success so client retries are harmless.
pub fn respond(
    state: &AppState,
    invitation_id: &str,
    principal_id: &str,
    decision: Decision,
    now: DateTime<Utc>,
) -> Result<Collaboration, ServiceError> {
    info!("🔄 Responding to invitation {}: {:?}", invitation_id, decision);

    let (outcome, healed) = {
        let mut records = state.collaborations.lock()?;
        let record = records
            .get_mut(invitation_id)
            .ok_or_else(|| ServiceError::not_found("Invitation", invitation_id))?;

        if record.invitee_id != principal_id {
            error!("❌ Invitation {} is not addressed to user {}", invitation_id, principal_id);
            return Err(ServiceError::Forbidden);
        }

        let healed = self_heal(record, now);
        let target = decision.resulting_status();

        let outcome = if record.status == CollaborationStatus::Pending {
            record.status = target;
            record.responded_at = Some(now);
            Ok((record.clone(), true))
        } else if record.status == target {
            debug!("Invitation {} already {}", invitation_id, target.as_str());
            Ok((record.clone(), false))
        } else if healed {
            Err(ServiceError::InvalidState("Invitation has expired".to_string()))
        } else {
            Err(ServiceError::InvalidState(format!(
                "Invitation is already {}",
                record.status.as_str()
            )))
        };
        (outcome, healed)
    };

    if healed {
        state.persist();
    }

    let (record, changed) = outcome.map_err(|e| {
        error!("❌ Cannot respond to invitation {}: {}", invitation_id, e);
        e
    })?;

    if changed {
        info!("✅ Invitation {} {}", record.id, record.status.as_str());
        let event = match decision {
            Decision::Accept => DomainEvent::InvitationAccepted {
                collaboration_id: record.id.clone(),
                project_id: record.project_id.clone(),
                inviter_id: record.inviter_id.clone(),
                invitee_id: record.invitee_id.clone(),
            },
            Decision::Decline => DomainEvent::InvitationDeclined {
                collaboration_id: record.id.clone(),
                project_id: record.project_id.clone(),
                inviter_id: record.inviter_id.clone(),
                invitee_id: record.invitee_id.clone(),
            },
        };
        state.publish(event);
        state.persist();
    }

    Ok(record)
}

// Owner-only, immediate, from PENDING or ACCEPTED
pub fn revoke(
    state: &AppState,
    collaboration_id: &str,
    principal_id: &str,
    now: DateTime<Utc>,
) -> Result<Collaboration, ServiceError> {
    info!("🗑️ Revoking collaboration: {}", collaboration_id);

    let existing = state
        .collaborations
        .find(collaboration_id)?
        .ok_or_else(|| ServiceError::not_found("Collaboration", collaboration_id))?;

    permission_service::authorize_delete(state, &existing.project_id, principal_id)?;

    let (revoked, healed) = {
        let mut records = state.collaborations.lock()?;
        let record = records
            .get_mut(collaboration_id)
            .ok_or_else(|| ServiceError::not_found("Collaboration", collaboration_id))?;

        let healed = self_heal(record, now);
        match record.status {
            CollaborationStatus::Pending | CollaborationStatus::Accepted => {
                record.status = CollaborationStatus::Revoked;
                (Ok(record.clone()), healed)
            }
            status => (
                Err(ServiceError::InvalidState(format!(
                    "Collaboration is already {}",
                    status.as_str()
                ))),
                healed,
            ),
        }
    };

    if healed {
        state.persist();
    }
    let revoked = revoked?;

    info!("✅ Collaboration {} revoked", revoked.id);

    state.publish(DomainEvent::CollaborationRevoked {
        collaboration_id: revoked.id.clone(),
        project_id: revoked.project_id.clone(),
        invitee_id: revoked.invitee_id.clone(),
        revoked_by: principal_id.to_string(),
    });
    state.persist();

    Ok(revoked)
}

// PENDING (unexpired) and ACCEPTED records of a project; stored rows untouched
pub fn list_active_for_project(
    state: &AppState,
    project_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Collaboration>, ServiceError> {
    state
        .collaborations
        .select(|record| record.project_id == project_id && record.is_active(now))
}

pub fn list_pending_for_invitee(
    state: &AppState,
    principal_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Collaboration>, ServiceError> {
    state.collaborations.select(|record| {
        record.invitee_id == principal_id
            && record.effective_status(now) == CollaborationStatus::Pending
    })
}

pub fn list_sent_invitations(
    state: &AppState,
    principal_id: &str,
) -> Result<Vec<Collaboration>, ServiceError> {
    state
        .collaborations
        .select(|record| record.inviter_id == principal_id)
}

pub fn collaborated_project_ids(
    state: &AppState,
    principal_id: &str,
) -> Result<Vec<String>, ServiceError> {
    Ok(state
        .collaborations
        .select(|record| record.invitee_id == principal_id && record.grants_access())?
        .into_iter()
        .map(|record| record.project_id)
        .collect())
}

// Visible to both parties and to anyone who can read the project
pub fn get_collaboration(
    state: &AppState,
    collaboration_id: &str,
    principal_id: &str,
) -> Result<Collaboration, ServiceError> {
    let record = state
        .collaborations
        .find(collaboration_id)?
        .ok_or_else(|| ServiceError::not_found("Collaboration", collaboration_id))?;

    if record.inviter_id == principal_id || record.invitee_id == principal_id {
        return Ok(record);
    }
    if permission_service::resolve(state, &record.project_id, principal_id)?.can_read {
        return Ok(record);
    }

    error!("❌ User {} cannot view collaboration {}", principal_id, collaboration_id);
    Err(ServiceError::Forbidden)
}

// Explicit self-heal of every expired PENDING row; nothing schedules this
pub fn sweep_expired(state: &AppState, now: DateTime<Utc>) -> Result<usize, ServiceError> {
    let healed = {
        let mut records = state.collaborations.lock()?;
        records
            .values_mut()
            .map(|record| self_heal(record, now))
            .filter(|changed| *changed)
            .count()
    };

    if healed > 0 {
        info!("✅ Marked {} expired invitations as declined", healed);
        state.persist();
    }
    Ok(healed)
}
