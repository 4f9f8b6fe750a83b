use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, OriginalUri, Path, Query};
use axum::http::StatusCode;
use user_records_sdk::models::{NewUser, User, UserJobInfo, UserSalary};

use crate::domain::service::RecordsService;

use super::dto::{NewUserDto, UserDto, UserIdQuery, UserJobInfoDto, UserSalaryDto};
use super::error::{ApiResult, Problem, problem_at};

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = [UserDto]),
        (status = 500, description = "Storage failure", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Vec<UserDto>>> {
    let users = svc.list::<User>().await.map_err(problem_at(&uri))?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserDto),
        (status = 404, description = "No such user", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i32>,
) -> ApiResult<Json<UserDto>> {
    let user = svc.get::<User>(id).await.map_err(problem_at(&uri))?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/users",
    tag = "Users",
    request_body = UserDto,
    responses(
        (status = 200, description = "User updated"),
        (status = 404, description = "No such user", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Update failed", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_user(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Json(req): Json<UserDto>,
) -> ApiResult<StatusCode> {
    svc.update::<User, _>(req.user_id, move |user| {
        user.active = req.active;
        user.first_name = req.first_name;
        user.last_name = req.last_name;
        user.email = req.email;
        user.gender = req.gender;
    })
    .await
    .map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = NewUserDto,
    responses(
        (status = 200, description = "User added"),
        (status = 500, description = "Insert failed", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn add_user(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Json(req): Json<NewUserDto>,
) -> ApiResult<StatusCode> {
    let user: User = NewUser::from(req).into();
    svc.create(user).await.map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "No such user", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    svc.delete::<User>(id).await.map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/users/salary",
    tag = "Salaries",
    responses(
        (status = 200, description = "All salaries", body = [UserSalaryDto]),
        (status = 500, description = "Storage failure", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_salaries(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Vec<UserSalaryDto>>> {
    let salaries = svc.list::<UserSalary>().await.map_err(problem_at(&uri))?;
    Ok(Json(salaries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}/salary",
    tag = "Salaries",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The salary", body = UserSalaryDto),
        (status = 404, description = "No salary for this user", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_salary(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i32>,
) -> ApiResult<Json<UserSalaryDto>> {
    let salary = svc.get::<UserSalary>(id).await.map_err(problem_at(&uri))?;
    Ok(Json(salary.into()))
}

#[utoipa::path(
    post,
    path = "/users/salary",
    tag = "Salaries",
    request_body = UserSalaryDto,
    responses(
        (status = 200, description = "Salary added"),
        (status = 500, description = "Insert failed", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn add_salary(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Json(req): Json<UserSalaryDto>,
) -> ApiResult<StatusCode> {
    svc.create(UserSalary::from(req)).await.map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/users/salary",
    tag = "Salaries",
    request_body = UserSalaryDto,
    responses(
        (status = 200, description = "Salary updated"),
        (status = 404, description = "No salary for this user", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_salary(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Json(req): Json<UserSalaryDto>,
) -> ApiResult<StatusCode> {
    svc.update::<UserSalary, _>(req.user_id, move |s| s.salary = req.salary)
        .await
        .map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/users/salary",
    tag = "Salaries",
    params(UserIdQuery),
    responses(
        (status = 200, description = "Salary deleted"),
        (status = 404, description = "No salary for this user", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn delete_salary(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<UserIdQuery>,
) -> ApiResult<StatusCode> {
    svc.delete::<UserSalary>(query.user_id).await.map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/users/jobinfo",
    tag = "Job info",
    responses(
        (status = 200, description = "All job information rows", body = [UserJobInfoDto]),
        (status = 500, description = "Storage failure", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_job_infos(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Vec<UserJobInfoDto>>> {
    let infos = svc.list::<UserJobInfo>().await.map_err(problem_at(&uri))?;
    Ok(Json(infos.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}/jobinfo",
    tag = "Job info",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The job information", body = UserJobInfoDto),
        (status = 404, description = "No job information for this user", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_job_info(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i32>,
) -> ApiResult<Json<UserJobInfoDto>> {
    let info = svc.get::<UserJobInfo>(id).await.map_err(problem_at(&uri))?;
    Ok(Json(info.into()))
}

#[utoipa::path(
    post,
    path = "/users/jobinfo",
    tag = "Job info",
    request_body = UserJobInfoDto,
    responses(
        (status = 200, description = "Job information added"),
        (status = 500, description = "Insert failed", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn add_job_info(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Json(req): Json<UserJobInfoDto>,
) -> ApiResult<StatusCode> {
    svc.create(UserJobInfo::from(req)).await.map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/users/jobinfo",
    tag = "Job info",
    request_body = UserJobInfoDto,
    responses(
        (status = 200, description = "Job information updated"),
        (status = 404, description = "No job information for this user", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_job_info(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Json(req): Json<UserJobInfoDto>,
) -> ApiResult<StatusCode> {
    svc.update::<UserJobInfo, _>(req.user_id, move |info| {
        info.job_title = req.job_title;
        info.department = req.department;
    })
    .await
    .map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/users/{id}/jobinfo",
    tag = "Job info",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Job information deleted"),
        (status = 404, description = "No job information for this user", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn delete_job_info(
    Extension(svc): Extension<Arc<RecordsService>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    svc.delete::<UserJobInfo>(id).await.map_err(problem_at(&uri))?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::api::rest::routes::router;
    use crate::config::DatabaseConfig;
    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt as _;

    async fn create_test_router() -> Router {
        let svc = RecordsService::connect(&DatabaseConfig::with_dsn("sqlite::memory:"))
            .await
            .expect("in-memory database");
        router(Arc::new(svc), true)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    const ANN: &str = r#"{"firstName":"Ann","lastName":"Lee","email":"ann@example.com","gender":"F","active":true}"#;

    #[tokio::test]
    async fn test_add_then_get_user() {
        let app = create_test_router().await;

        let response = app
            .clone()
            .oneshot(json_request("POST", "/users", ANN))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(empty_request("GET", "/users/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["userId"], 1);
        assert_eq!(json["firstName"], "Ann");
        assert_eq!(json["active"], true);
    }

    #[tokio::test]
    async fn test_get_missing_user_returns_problem() {
        let app = create_test_router().await;

        let response = app
            .oneshot(empty_request("GET", "/users/77"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/problem+json"
        );

        let json = body_json(response).await;
        assert_eq!(json["status"], 404);
        assert_eq!(json["title"], "Not Found");
        assert_eq!(json["instance"], "/users/77");
    }

    #[tokio::test]
    async fn test_problem_instance_excludes_query() {
        let app = create_test_router().await;

        let response = app
            .oneshot(empty_request("DELETE", "/users/salary?userId=99"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["instance"], "/users/salary");
        assert_eq!(json["detail"], "UserSalary with id 99 not found");
    }

    #[tokio::test]
    async fn test_edit_user_updates_fields() {
        let app = create_test_router().await;
        app.clone()
            .oneshot(json_request("POST", "/users", ANN))
            .await
            .unwrap();

        let edit = r#"{"userId":1,"firstName":"Ann","lastName":"Park","email":"ann@example.com","gender":"F","active":false}"#;
        let response = app
            .clone()
            .oneshot(json_request("PUT", "/users", edit))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(app.oneshot(empty_request("GET", "/users")).await.unwrap()).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["lastName"], "Park");
        assert_eq!(json[0]["active"], false);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let app = create_test_router().await;
        app.clone()
            .oneshot(json_request("POST", "/users", ANN))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/users/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(empty_request("GET", "/users/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_salary_lifecycle() {
        let app = create_test_router().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/salary",
                r#"{"userId":1,"salary":50000.0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/users/salary",
                r#"{"userId":1,"salary":55000.0}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(
            app.clone()
                .oneshot(empty_request("GET", "/users/1/salary"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json["salary"], 55000.0);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/users/salary?userId=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(
            app.oneshot(empty_request("GET", "/users/salary"))
                .await
                .unwrap(),
        )
        .await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_job_info_lifecycle() {
        let app = create_test_router().await;

        app.clone()
            .oneshot(json_request(
                "POST",
                "/users/jobinfo",
                r#"{"userId":2,"jobTitle":"Engineer","department":"Platform"}"#,
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/users/jobinfo",
                r#"{"userId":2,"jobTitle":"Staff Engineer","department":"Platform"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(
            app.clone()
                .oneshot(empty_request("GET", "/users/2/jobinfo"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json["jobTitle"], "Staff Engineer");

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/users/2/jobinfo"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("POST", "/users/2/jobinfo"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_insert_returns_500_problem() {
        let app = create_test_router().await;
        let body = r#"{"userId":5,"jobTitle":"Analyst","department":"Finance"}"#;

        app.clone()
            .oneshot(json_request("POST", "/users/jobinfo", body))
            .await
            .unwrap();
        let response = app
            .oneshot(json_request("POST", "/users/jobinfo", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["status"], 500);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = create_test_router().await;

        let response = app
            .oneshot(json_request("POST", "/users", r#"{"firstName":"#))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let app = create_test_router().await;

        let response = app
            .oneshot(empty_request("GET", "/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json["openapi"].as_str().unwrap().starts_with("3.1"));
        assert!(json["paths"]["/users/{id}/jobinfo"].is_object());
        assert!(json["paths"]["/users/salary"]["delete"].is_object());
    }

    #[tokio::test]
    async fn test_docs_page_points_at_openapi_document() {
        let app = create_test_router().await;

        let response = app.oneshot(empty_request("GET", "/docs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"apiDescriptionUrl="/openapi.json""#));
    }

    #[tokio::test]
    async fn test_docs_are_not_mounted_without_openapi() {
        let svc = RecordsService::connect(&DatabaseConfig::with_dsn("sqlite::memory:"))
            .await
            .unwrap();
        let app = router(Arc::new(svc), false);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/docs"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(empty_request("GET", "/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
