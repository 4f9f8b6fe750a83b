use std::sync::Arc;

use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Extension, Json, Router};
use utoipa::OpenApi;

use crate::api::rest::{dto, error, handlers};
use crate::domain::service::RecordsService;

#[derive(OpenApi)]
#[openapi(
    info(title = "User Records API", description = "Users, salaries and job information"),
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::update_user,
        handlers::add_user,
        handlers::delete_user,
        handlers::list_salaries,
        handlers::get_salary,
        handlers::add_salary,
        handlers::update_salary,
        handlers::delete_salary,
        handlers::list_job_infos,
        handlers::get_job_info,
        handlers::add_job_info,
        handlers::update_job_info,
        handlers::delete_job_info,
    ),
    components(schemas(
        dto::UserDto,
        dto::NewUserDto,
        dto::UserSalaryDto,
        dto::UserJobInfoDto,
        error::Problem,
    )),
    tags(
        (name = "Users", description = "User records"),
        (name = "Salaries", description = "Salary records keyed by user id"),
        (name = "Job info", description = "Job title and department keyed by user id"),
    )
)]
pub struct ApiDoc;

const DOCS_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>User Records API</title>
    <script src="https://unpkg.com/@stoplight/elements@8/web-components.min.js"></script>
    <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@8/styles.min.css">
  </head>
  <body>
    <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
  </body>
</html>
"#;

/// Build the REST router. `/openapi.json` and the `/docs` viewer are mounted
/// when `openapi` is set.
pub fn router(service: Arc<RecordsService>, openapi: bool) -> Router {
    let mut router = Router::new()
        .route(
            "/users",
            get(handlers::list_users)
                .put(handlers::update_user)
                .post(handlers::add_user),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route(
            "/users/salary",
            get(handlers::list_salaries)
                .post(handlers::add_salary)
                .put(handlers::update_salary)
                .delete(handlers::delete_salary),
        )
        .route("/users/{id}/salary", get(handlers::get_salary))
        .route(
            "/users/jobinfo",
            get(handlers::list_job_infos)
                .post(handlers::add_job_info)
                .put(handlers::update_job_info),
        )
        .route(
            "/users/{id}/jobinfo",
            get(handlers::get_job_info).post(handlers::delete_job_info),
        );

    if openapi {
        router = router
            .route("/openapi.json", get(openapi_json))
            .route("/docs", get(serve_docs));
    }

    router.layer(Extension(service))
}

async fn openapi_json() -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], Json(ApiDoc::openapi()))
}

async fn serve_docs() -> Html<&'static str> {
    Html(DOCS_HTML)
}
