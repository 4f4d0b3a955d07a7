use crate::models::{ColumnRequest, ProjectRequest, ProjectSearchQuery, ServiceError};
use crate::services::{board_service, permission_service, AppState};
use crate::utils::get_user_id_from_request;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// Create a new project owned by the caller
#[post("/projects")]
async fn create_project(
    req: HttpRequest,
    state: web::Data<AppState>,
    project_data: web::Json<ProjectRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project = board_service::create_project(&state, &user_id, &project_data)?;
    Ok(HttpResponse::Created().json(project))
}

// Projects the caller owns or collaborates on
#[get("/projects")]
async fn list_projects(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!("📋 Fetching projects for user: {}", user_id);
    let listing = board_service::list_projects(&state, &user_id)?;
    info!(
        "✅ Found {} owned and {} collaborated projects for user: {}",
        listing.owned.len(),
        listing.collaborated.len(),
        user_id
    );

    Ok(HttpResponse::Ok().json(listing))
}

#[get("/projects/public")]
async fn list_public_projects(state: web::Data<AppState>) -> Result<HttpResponse, ServiceError> {
    let projects = board_service::list_public_projects(&state)?;
    Ok(HttpResponse::Ok().json(projects))
}

// Public projects filtered by text, tags and technologies
#[get("/projects/search")]
async fn search_projects(
    state: web::Data<AppState>,
    query: web::Query<ProjectSearchQuery>,
) -> Result<HttpResponse, ServiceError> {
    let projects = board_service::search_projects(&state, &query)?;
    info!("✅ Search matched {} public projects", projects.len());
    Ok(HttpResponse::Ok().json(projects))
}

// Full board: project header plus ordered columns and tasks
#[get("/projects/{project_id}")]
async fn get_board(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    info!("🔍 Fetching board: {} for user: {}", project_id, user_id);
    let board = board_service::get_board(&state, &project_id, &user_id)?;

    Ok(HttpResponse::Ok().json(board))
}

#[put("/projects/{project_id}")]
async fn update_project(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    project_data: web::Json<ProjectRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project = board_service::update_project(&state, &path.into_inner(), &user_id, &project_data)?;
    Ok(HttpResponse::Ok().json(project))
}

#[delete("/projects/{project_id}")]
async fn delete_project(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let project_id = path.into_inner();

    board_service::delete_project(&state, &project_id, &user_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Project deleted successfully",
        "project_id": project_id
    })))
}

// Capabilities of the caller on a project
#[get("/projects/{project_id}/permissions")]
async fn get_permissions(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let permissions = permission_service::resolve(&state, &path.into_inner(), &user_id)?;
    Ok(HttpResponse::Ok().json(permissions))
}

// Tasks of every column in board order
#[get("/projects/{project_id}/tasks")]
async fn get_project_tasks(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let tasks = board_service::list_tasks_by_project(&state, &path.into_inner(), &user_id)?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[post("/projects/{project_id}/columns")]
async fn create_column(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    column_data: web::Json<ColumnRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let column = board_service::create_column(&state, &path.into_inner(), &user_id, &column_data)?;
    Ok(HttpResponse::Created().json(column))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // literal segments first so they are not captured as an id
    cfg.service(list_public_projects)
        .service(search_projects)
        .service(create_project)
        .service(list_projects)
        .service(get_board)
        .service(update_project)
        .service(delete_project)
        .service(get_permissions)
        .service(get_project_tasks)
        .service(create_column);
}
