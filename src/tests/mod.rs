// board-collab-service/src/tests/mod.rs
use crate::services::{AppState, RecordingNotifier};
use crate::utils::USER_ID_HEADER;
use actix_web::test::TestRequest;
use std::sync::Arc;

// Test app with identity middleware and every route, sharing `$state`
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(crate::utils::Identity)
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(crate::routes::init_routes),
        )
        .await
    };
}


pub(crate) fn recorded_state() -> (AppState, RecordingNotifier) {
    let recorder = RecordingNotifier::new();
    let state = AppState::new(Arc::new(recorder.clone()));
    (state, recorder)
}

pub(crate) fn as_user(request: TestRequest, user_id: &str) -> TestRequest {
    request.insert_header((USER_ID_HEADER, user_id))
}
