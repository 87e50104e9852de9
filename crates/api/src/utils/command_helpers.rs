//! Handler execution helpers
//!
//! Removes the timing and logging boilerplate from every REST handler.

use std::future::Future;
use std::time::Instant;

use projectflow_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Run a handler body, timing it and logging the outcome.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn kanban(
///     State(ctx): State<Arc<AppContext>>,
///     user: AuthUser,
///     Path(id): Path<ProjectId>,
/// ) -> ApiResult<Json<KanbanBoard>> {
///     execute_command("projects::kanban", async {
///         ctx.projects.kanban(user.id(), id).await
///     })
///     .await
///     .map(Json)
///     .map_err(ApiError::from)
/// }
/// ```
pub async fn execute_command<Fut, T>(command_name: &str, command: Fut) -> DomainResult<T>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();

    let result = command.await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err());

    result
}

#[cfg(test)]
mod tests {
    use projectflow_domain::ProjectFlowError;

    use super::*;

    #[tokio::test]
    async fn passes_the_result_through() {
        let ok = execute_command("test::ok", async { Ok::<_, ProjectFlowError>(7) }).await;
        assert_eq!(ok, Ok(7));

        let err = execute_command("test::err", async {
            Err::<(), _>(ProjectFlowError::NotFound("Task 1 not found".into()))
        })
        .await;
        assert_eq!(err, Err(ProjectFlowError::NotFound("Task 1 not found".into())));
    }
}
