// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Causal ids of the event currently being handled.
//!
//! Adapters run every invocation inside [`causal_scope`], so whatever a worker
//! emits while handling an event inherits that event's lineage. The scope is a
//! tokio task-local: code that spawns tasks must re-enter it in the child.

use std::future::Future;

use crate::events::CausalId;

tokio::task_local! {
    static CAUSAL_IDS: Vec<CausalId>;
}

/// Run `future` with `causal_ids` in scope.
pub async fn causal_scope<F: Future>(causal_ids: Vec<CausalId>, future: F) -> F::Output {
    CAUSAL_IDS.scope(causal_ids, future).await
}

/// Causal ids in scope for the current task, empty outside any scope.
pub fn current_causal_ids() -> Vec<CausalId> {
    CAUSAL_IDS.try_with(|ids| ids.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CausalKind;

    #[tokio::test]
    async fn empty_outside_a_scope() {
        assert!(current_causal_ids().is_empty());
    }

    #[tokio::test]
    async fn scope_is_visible_across_awaits_and_ends_with_the_future() {
        let origin = CausalId::new(CausalKind::WorkItem);

        let seen = causal_scope(vec![origin], async {
            tokio::task::yield_now().await;
            current_causal_ids()
        })
        .await;

        assert_eq!(seen, vec![origin]);
        assert!(current_causal_ids().is_empty());
    }
}
