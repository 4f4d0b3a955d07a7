// board-collab-service/src/services/permission_service.rs
use crate::models::{EffectivePermissions, ServiceError};
use crate::services::AppState;
use log::{debug, error};

// Capabilities of `principal_id` on `project_id`, derived fresh on every call.
// Fails with NotFound only when the project itself is gone.
pub fn resolve(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
) -> Result<EffectivePermissions, ServiceError> {
    let (owner_id, _) = state.boards.project_access(project_id)?;

    if owner_id == principal_id {
        debug!("Principal {} owns project {}", principal_id, project_id);
        return Ok(EffectivePermissions::owner());
    }

    let permissions = match state
        .collaborations
        .accepted_role(project_id, principal_id)?
    {
        Some(role) => EffectivePermissions::for_role(role),
        None => EffectivePermissions::none(),
    };

    debug!(
        "Principal {} on project {}: {:?}",
        principal_id, project_id, permissions
    );
    Ok(permissions)
}

// Read gate: collaborators, or anyone when the project is public
pub fn authorize_read(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
) -> Result<EffectivePermissions, ServiceError> {
    let (_, visibility) = state.boards.project_access(project_id)?;
    let permissions = resolve(state, project_id, principal_id)?;

    if !permissions.may_read(visibility) {
        error!("❌ User {} cannot read project {}", principal_id, project_id);
        return Err(ServiceError::Forbidden);
    }
    Ok(permissions)
}

pub fn authorize_write(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
) -> Result<EffectivePermissions, ServiceError> {
    let permissions = resolve(state, project_id, principal_id)?;

    if !permissions.can_write {
        error!("❌ User {} cannot write to project {}", principal_id, project_id);
        return Err(ServiceError::Forbidden);
    }
    Ok(permissions)
}

pub fn authorize_delete(
    state: &AppState,
    project_id: &str,
    principal_id: &str,
) -> Result<EffectivePermissions, ServiceError> {
    let permissions = resolve(state, project_id, principal_id)?;

    if !permissions.can_delete {
        error!("❌ User {} cannot delete in project {}", principal_id, project_id);
        return Err(ServiceError::Forbidden);
    }
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CreateInvitationRequest, Decision, ProjectRequest, Visibility,
    };
    use crate::services::{board_service, collaboration_service};
    use chrono::Utc;

    fn private_project(state: &AppState) -> String {
        board_service::create_project(
            state,
            "owner",
            &ProjectRequest {
                name: "Secret".to_string(),
                description: None,
                visibility: Some(Visibility::Private),
                tags: None,
                technologies: None,
                repository_url: None,
            },
        )
        .unwrap()
        .id
    }

    fn invite(state: &AppState, project_id: &str, invitee: &str, role: &str) -> String {
        collaboration_service::create_invitation(
            state,
            "owner",
            &CreateInvitationRequest {
                project_id: project_id.to_string(),
                invitee_id: invitee.to_string(),
                role: role.to_string(),
            },
            Utc::now(),
        )
        .unwrap()
        .id
    }

    #[test]
    fn owner_holds_every_capability() {
        let state = AppState::in_memory();
        let project_id = private_project(&state);
        assert_eq!(
            resolve(&state, &project_id, "owner").unwrap(),
            EffectivePermissions::owner()
        );
    }

    #[test]
    fn pending_invitation_grants_nothing() {
        let state = AppState::in_memory();
        let project_id = private_project(&state);
        invite(&state, &project_id, "editor", "EDITOR");

        assert_eq!(
            resolve(&state, &project_id, "editor").unwrap(),
            EffectivePermissions::none()
        );
        assert_eq!(
            authorize_read(&state, &project_id, "editor"),
            Err(ServiceError::Forbidden)
        );
    }

    #[test]
    fn accepted_editor_cannot_delete() {
        let state = AppState::in_memory();
        let project_id = private_project(&state);
        let invitation_id = invite(&state, &project_id, "editor", "EDITOR");
        collaboration_service::respond(&state, &invitation_id, "editor", Decision::Accept, Utc::now())
            .unwrap();

        let permissions = resolve(&state, &project_id, "editor").unwrap();
        assert!(permissions.is_collaborator && permissions.can_read && permissions.can_write);
        assert!(!permissions.can_delete);
        assert_eq!(
            authorize_delete(&state, &project_id, "editor"),
            Err(ServiceError::Forbidden)
        );
    }

    #[test]
    fn revocation_takes_effect_on_next_resolve() {
        let state = AppState::in_memory();
        let project_id = private_project(&state);
        let invitation_id = invite(&state, &project_id, "viewer", "VIEWER");
        collaboration_service::respond(&state, &invitation_id, "viewer", Decision::Accept, Utc::now())
            .unwrap();
        assert!(resolve(&state, &project_id, "viewer").unwrap().can_read);

        collaboration_service::revoke(&state, &invitation_id, "owner", Utc::now()).unwrap();

        let permissions = resolve(&state, &project_id, "viewer").unwrap();
        assert!(!permissions.can_read && !permissions.can_write);
    }

    #[test]
    fn missing_project_is_not_found() {
        let state = AppState::in_memory();
        assert!(matches!(
            resolve(&state, "nope", "anyone"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
