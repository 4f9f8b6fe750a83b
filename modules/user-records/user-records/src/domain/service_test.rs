#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

    use super::super::*;
    use crate::config::{DatabaseConfig, RetryConfig};
    use user_records_sdk::models::{User, UserJobInfo, UserSalary};

    async fn create_test_service() -> service::RecordsService {
        let mut config = DatabaseConfig::with_dsn("sqlite::memory:");
        config.retry = RetryConfig::disabled();
        service::RecordsService::connect(&config)
            .await
            .expect("in-memory database")
    }

    fn ann() -> User {
        User {
            user_id: 1,
            first_name: "Ann".to_owned(),
            last_name: "Lee".to_owned(),
            email: "ann@example.com".to_owned(),
            gender: "F".to_owned(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_user() {
        let service = create_test_service().await;

        service.create(ann()).await.unwrap();

        let found: User = service.get(1).await.unwrap();
        assert_eq!(found, ann());
    }

    #[tokio::test]
    async fn test_get_missing_record_is_not_found() {
        let service = create_test_service().await;

        let err = service.get::<UserSalary>(42).await.unwrap_err();

        assert!(matches!(
            err,
            error::DomainError::NotFound {
                kind: "UserSalary",
                id: 42
            }
        ));
    }

    #[tokio::test]
    async fn test_update_changes_only_mutated_field() {
        let service = create_test_service().await;
        service.create(ann()).await.unwrap();

        let updated = service
            .update::<User, _>(1, |u| u.email = "ann.lee@example.com".to_owned())
            .await
            .unwrap();

        assert_eq!(updated.email, "ann.lee@example.com");
        let stored: User = service.get(1).await.unwrap();
        assert_eq!(
            stored,
            User {
                email: "ann.lee@example.com".to_owned(),
                ..ann()
            }
        );
    }

    #[tokio::test]
    async fn test_update_with_equal_values_succeeds_without_write() {
        let service = create_test_service().await;
        service
            .create(UserSalary {
                user_id: 1,
                salary: 50_000.0,
            })
            .await
            .unwrap();

        let result = service
            .update::<UserSalary, _>(1, |s| s.salary = 50_000.0)
            .await
            .unwrap();

        assert_eq!(result.salary, 50_000.0);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let service = create_test_service().await;

        let err = service
            .update::<UserJobInfo, _>(9, |j| j.department = "R&D".to_owned())
            .await
            .unwrap_err();

        assert!(matches!(err, error::DomainError::NotFound { id: 9, .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let service = create_test_service().await;
        service
            .create(UserJobInfo {
                user_id: 3,
                job_title: "Engineer".to_owned(),
                department: "Platform".to_owned(),
            })
            .await
            .unwrap();

        service.delete::<UserJobInfo>(3).await.unwrap();

        assert!(service.list::<UserJobInfo>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_not_found() {
        let service = create_test_service().await;

        let err = service.delete::<User>(5).await.unwrap_err();

        assert!(matches!(err, error::DomainError::NotFound { kind: "User", .. }));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_persistence_error() {
        let service = create_test_service().await;
        service.create(ann()).await.unwrap();

        let err = service.create(ann()).await.unwrap_err();

        assert!(matches!(err, error::DomainError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let service = create_test_service().await;
        for id in [3, 1, 2] {
            service
                .create(UserSalary {
                    user_id: id,
                    salary: f64::from(id) * 1_000.0,
                })
                .await
                .unwrap();
        }

        let ids: Vec<i32> = service
            .list::<UserSalary>()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.user_id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }
}
