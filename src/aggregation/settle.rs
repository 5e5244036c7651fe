//! Settle-all task group

use std::future::Future;

use futures::{StreamExt, future::join_all, stream};

/// Drive every task to completion and return one outcome per task, in input order.
///
/// A failing task never short-circuits the group. With `limit` set, at most
/// that many tasks run at once.
pub async fn settle_all<I, F, T, E>(tasks: I, limit: Option<usize>) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    match limit {
        None => join_all(tasks).await,
        Some(limit) => {
            stream::iter(tasks)
                .buffered(limit.max(1))
                .collect()
                .await
        }
    }
}
