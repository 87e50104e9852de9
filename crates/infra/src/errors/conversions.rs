//! Conversions from external infrastructure errors into domain errors.

use projectflow_common::storage::StorageError;
use projectflow_domain::ProjectFlowError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ProjectFlowError);

impl From<InfraError> for ProjectFlowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ProjectFlowError> for InfraError {
    fn from(value: ProjectFlowError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoProjectFlowError {
    fn into_projectflow(self) -> ProjectFlowError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → ProjectFlowError */
/* -------------------------------------------------------------------------- */

impl IntoProjectFlowError for SqlError {
    fn into_projectflow(self) -> ProjectFlowError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        ProjectFlowError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        ProjectFlowError::Database("database is locked".into())
                    }
                    // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => ProjectFlowError::Validation(
                        format!("A record with this value already exists ({})", message),
                    ),
                    // SQLITE_CONSTRAINT_FOREIGNKEY
                    (ErrorCode::ConstraintViolation, 787) => {
                        ProjectFlowError::NotFound("referenced record does not exist".into())
                    }
                    _ => ProjectFlowError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                ProjectFlowError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                ProjectFlowError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                ProjectFlowError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidQuery => ProjectFlowError::Database("invalid SQL query".into()),
            other => ProjectFlowError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_projectflow())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → ProjectFlowError */
/* -------------------------------------------------------------------------- */

impl IntoProjectFlowError for StorageError {
    fn into_projectflow(self) -> ProjectFlowError {
        match self {
            StorageError::Rusqlite(err) => err.into_projectflow(),
            StorageError::InvalidConfig(msg) => ProjectFlowError::Config(msg),
            other => ProjectFlowError::Database(other.to_string()),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_projectflow())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ProjectFlowError */
/* -------------------------------------------------------------------------- */

impl IntoProjectFlowError for HttpError {
    fn into_projectflow(self) -> ProjectFlowError {
        if self.is_timeout() {
            return ProjectFlowError::ExternalService("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ProjectFlowError::ExternalService("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return from_status(status, None);
        }

        ProjectFlowError::ExternalService(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_projectflow())
    }
}

/// Classify a non-success provider response.
pub(crate) fn from_status(status: reqwest::StatusCode, body: Option<&str>) -> ProjectFlowError {
    let code = status.as_u16();
    let mut message =
        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
    if let Some(body) = body.map(str::trim).filter(|b| !b.is_empty()) {
        message.push_str(": ");
        message.push_str(body);
    }

    match code {
        401 | 403 => ProjectFlowError::Authentication(message),
        404 => ProjectFlowError::NotFound(message),
        _ => ProjectFlowError::ExternalService(message),
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / io / jsonwebtoken → ProjectFlowError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(ProjectFlowError::Internal(format!("JSON error: {}", value)))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(ProjectFlowError::Internal(format!("I/O error: {}", value)))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(ProjectFlowError::Database(format!("connection pool error: {}", value)))
    }
}

/// Decoding failures only; encoding errors are mapped where tokens are signed.
impl From<jsonwebtoken::errors::Error> for InfraError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        let message = match value.kind() {
            ErrorKind::ExpiredSignature => "Token is invalid or expired",
            _ => "Token is invalid",
        };
        InfraError(ProjectFlowError::Authentication(message.into()))
    }
}

/// Shorthand used by repositories.
pub(crate) fn map_sql_error(err: SqlError) -> ProjectFlowError {
    ProjectFlowError::from(InfraError::from(err))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use rusqlite::Error as SqlError;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: ProjectFlowError = InfraError::from(err).into();
        match mapped {
            ProjectFlowError::Database(msg) => {
                assert!(msg.contains("busy") || msg.contains("locked"));
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn unique_violation_maps_to_validation() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::ConstraintViolation, extended_code: 2067 },
            Some("UNIQUE constraint failed: users.username".into()),
        );
        let mapped: ProjectFlowError = InfraError::from(err).into();
        assert!(matches!(mapped, ProjectFlowError::Validation(msg) if msg.contains("users.username")));
    }

    #[test]
    fn foreign_key_violation_maps_to_not_found() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::ConstraintViolation, extended_code: 787 },
            None,
        );
        let mapped: ProjectFlowError = InfraError::from(err).into();
        assert!(matches!(mapped, ProjectFlowError::NotFound(_)));
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            from_status(StatusCode::FORBIDDEN, None),
            ProjectFlowError::Authentication(_)
        ));
        assert!(matches!(from_status(StatusCode::NOT_FOUND, None), ProjectFlowError::NotFound(_)));
        assert!(matches!(
            from_status(StatusCode::BAD_GATEWAY, Some("upstream")),
            ProjectFlowError::ExternalService(msg) if msg.ends_with("upstream")
        ));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: ProjectFlowError = InfraError::from(error).into();
        match mapped {
            ProjectFlowError::Authentication(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }
}
