pub mod auth;
pub mod health;
pub mod history;
pub mod patients;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the annotation route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                                           list, create, delete
///
/// /auth/login                                      login
/// /auth/change-password                            change password
///
/// /history                                         list (?annotator=), create
/// /history/{id}                                    delete
///
/// /api/patients                                    list patients
/// /api/patients/{patient_id}/classes               classes for a patient
/// /api/patients/{patient_id}/classes/{class}/videos
///                                                  videos for a class
/// /api/videos/{file_id}                            stream (range requests)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/auth", auth::router())
        .nest("/history", history::router())
        .nest("/api", patients::router())
}
