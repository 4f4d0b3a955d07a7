use crate::models::{CreateInvitationRequest, RespondInvitationRequest, ServiceError};
use crate::services::{collaboration_service, permission_service, AppState};
use crate::utils::get_user_id_from_request;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;

// Invite a user to collaborate on a project
#[post("/collaborations/invites")]
async fn create_invitation(
    req: HttpRequest,
    state: web::Data<AppState>,
    invite_data: web::Json<CreateInvitationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let invitation =
        collaboration_service::create_invitation(&state, &user_id, &invite_data, Utc::now())?;
    Ok(HttpResponse::Created().json(invitation))
}

// Accept or decline an invitation addressed to the caller
#[post("/collaborations/invites/{invitation_id}/respond")]
async fn respond_to_invitation(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    response_data: web::Json<RespondInvitationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let invitation = collaboration_service::respond(
        &state,
        &path.into_inner(),
        &user_id,
        response_data.decision,
        Utc::now(),
    )?;
    Ok(HttpResponse::Ok().json(invitation))
}

#[get("/collaborations/invites/pending")]
async fn get_pending_invitations(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!("📋 Fetching pending invitations for user: {}", user_id);
    let invitations = collaboration_service::list_pending_for_invitee(&state, &user_id, Utc::now())?;
    info!("✅ Found {} pending invitations for user: {}", invitations.len(), user_id);

    Ok(HttpResponse::Ok().json(invitations))
}

#[get("/collaborations/invites/sent")]
async fn get_sent_invitations(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let invitations = collaboration_service::list_sent_invitations(&state, &user_id)?;
    Ok(HttpResponse::Ok().json(invitations))
}

// Pending and accepted collaborators; needs read access to the project
#[get("/collaborations/projects/{project_id}")]
async fn get_project_collaborators(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    permission_service::authorize_read(&state, &project_id, &user_id)?;
    let collaborators =
        collaboration_service::list_active_for_project(&state, &project_id, Utc::now())?;

    Ok(HttpResponse::Ok().json(collaborators))
}

#[get("/collaborations/{collaboration_id}")]
async fn get_collaboration(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let collaboration =
        collaboration_service::get_collaboration(&state, &path.into_inner(), &user_id)?;
    Ok(HttpResponse::Ok().json(collaboration))
}

// Owner-only revocation of a pending or accepted collaboration
#[delete("/collaborations/{collaboration_id}")]
async fn revoke_collaboration(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let collaboration =
        collaboration_service::revoke(&state, &path.into_inner(), &user_id, Utc::now())?;
    Ok(HttpResponse::Ok().json(collaboration))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_invitation)
        .service(respond_to_invitation)
        .service(get_pending_invitations)
        .service(get_sent_invitations)
        .service(get_project_collaborators)
        .service(get_collaboration)
        .service(revoke_collaboration);
}
