use crate::models::{
    ColumnRequest, CommentRequest, MoveColumnRequest, MoveTaskRequest, ServiceError, TaskMoveBody,
    TaskRequest, TaskUpdateRequest,
};
use crate::services::{board_service, comment_service, move_service, AppState};
use crate::utils::get_user_id_from_request;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// Columns

#[put("/columns/{column_id}")]
async fn rename_column(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    column_data: web::Json<ColumnRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let column = board_service::rename_column(&state, &path.into_inner(), &user_id, &column_data)?;
    Ok(HttpResponse::Ok().json(column))
}

#[post("/columns/{column_id}/move")]
async fn move_column(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    move_data: web::Json<MoveColumnRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let board = board_service::move_column(&state, &path.into_inner(), &user_id, &move_data)?;
    Ok(HttpResponse::Ok().json(board))
}

#[delete("/columns/{column_id}")]
async fn delete_column(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let board = board_service::delete_column(&state, &path.into_inner(), &user_id)?;
    Ok(HttpResponse::Ok().json(board))
}

#[get("/columns/{column_id}/tasks")]
async fn get_column_tasks(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let tasks = board_service::list_tasks_by_column(&state, &path.into_inner(), &user_id)?;
    Ok(HttpResponse::Ok().json(tasks))
}

// Tasks

#[post("/tasks")]
async fn create_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    task_data: web::Json<TaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!("📝 Creating task '{}' for user: {}", task_data.title, user_id);
    let task = board_service::create_task(&state, &user_id, &task_data)?;

    Ok(HttpResponse::Created().json(task))
}

#[get("/tasks/{task_id}")]
async fn get_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let task = board_service::get_task(&state, &path.into_inner(), &user_id)?;
    Ok(HttpResponse::Ok().json(task))
}

#[put("/tasks/{task_id}")]
async fn update_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    task_data: web::Json<TaskUpdateRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let task = board_service::update_task(&state, &path.into_inner(), &user_id, &task_data)?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/tasks/{task_id}")]
async fn delete_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let task_id = path.into_inner();

    board_service::delete_task(&state, &task_id, &user_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully",
        "task_id": task_id
    })))
}

// Relocate a task; the response is the canonical board for reconciliation
#[post("/tasks/{task_id}/move")]
async fn move_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    move_data: web::Json<TaskMoveBody>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let request = MoveTaskRequest::new(
        &path.into_inner(),
        &move_data.target_column_id,
        move_data.target_position,
    );

    let board = move_service::move_task(&state, &user_id, &request)?;

    Ok(HttpResponse::Ok().json(board))
}

// Comments

#[post("/tasks/{task_id}/comments")]
async fn add_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    comment_data: web::Json<CommentRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let comment = comment_service::add_comment(&state, &path.into_inner(), &user_id, &comment_data)?;
    Ok(HttpResponse::Created().json(comment))
}

#[get("/tasks/{task_id}/comments")]
async fn get_comments(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let comments = comment_service::list_comments(&state, &path.into_inner(), &user_id)?;
    Ok(HttpResponse::Ok().json(comments))
}

#[delete("/tasks/{task_id}/comments/{comment_id}")]
async fn delete_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (task_id, comment_id) = path.into_inner();

    comment_service::delete_comment(&state, &task_id, &comment_id, &user_id)?;

    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(rename_column)
        .service(move_column)
        .service(delete_column)
        .service(get_column_tasks)
        .service(create_task)
        .service(get_task)
        .service(update_task)
        .service(delete_task)
        .service(move_task)
        .service(add_comment)
        .service(get_comments)
        .service(delete_comment);
}
