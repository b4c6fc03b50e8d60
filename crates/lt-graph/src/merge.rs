//! Merge strategies
//!
//! Provides the [`MergeStrategy`] trait and [`RecursiveLineageMerge`], which
//! folds one perspective tree into another. Structural children merge in
//! target order with lineage matching; `isA` relations merge by set union;
//! scalar fields keep the target's values. A merge that changes nothing
//! stages nothing, which is what makes a workspace diff a faithful
//! divergence test.

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::id::PerspectiveId;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// Merge configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeConfig {
    /// Keep the target's ownership for every perspective the merge creates,
    /// regardless of the source's ownership
    pub force_owner: bool,
}

/// What a merge staged
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Perspectives whose head was updated
    pub updated: Vec<PerspectiveId>,
    /// Forks created for source children with no counterpart in the target
    pub forked: Vec<PerspectiveId>,
}

/// Strategy for merging one perspective into another on a given client
///
/// Implementations stage their mutations through the client and never
/// commit; the caller decides whether to flush or discard the workspace.
#[async_trait]
pub trait MergeStrategy: Send + Sync + std::fmt::Debug {
    /// Merge perspective `from` into perspective `to`
    ///
    /// # Errors
    /// Propagates resolution and permission failures from the client
    async fn merge_perspectives(
        &self,
        client: &GraphClient,
        to: PerspectiveId,
        from: PerspectiveId,
        config: &MergeConfig,
    ) -> Result<MergeOutcome, GraphError>;
}

/// Recursive merge over lineage-matched children
///
/// Children of `from` that share lineage with a child of `to` merge
/// recursively into that child; children with no counterpart are forked
/// under the merge owner and appended after the target's children. Assumes
/// the child graph is acyclic, which holds for document trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveLineageMerge;

impl RecursiveLineageMerge {
    /// Create the strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn merge_inner<'a>(
        &'a self,
        client: &'a GraphClient,
        to: PerspectiveId,
        from: PerspectiveId,
        owner: &'a str,
        outcome: &'a mut MergeOutcome,
    ) -> BoxFuture<'a, Result<(), GraphError>> {
        Box::pin(async move {
            let to_obj = client.get_perspective_data(to).await?;
            let from_obj = client.get_perspective_data(from).await?;
            let interpreter = client.interpreter();

            let to_children = interpreter.children(&to_obj);
            let from_children = interpreter.children(&from_obj);

            let mut to_lineages = Vec::with_capacity(to_children.len());
            for child in &to_children {
                to_lineages.push(client.record(*child).await?.lineage);
            }

            let mut merged_children = to_children.clone();
            for from_child in &from_children {
                let from_lineage = client.record(*from_child).await?.lineage;
                if let Some(pos) = to_lineages.iter().position(|l| *l == from_lineage) {
                    let to_child = to_children[pos];
                    if to_child != *from_child {
                        self.merge_inner(client, to_child, *from_child, owner, outcome)
                            .await?;
                    }
                } else {
                    let fork = client
                        .fork_perspective(*from_child, Some(owner), Some(to))
                        .await?;
                    merged_children.push(fork);
                    outcome.forked.push(fork);
                }
            }

            let to_links = interpreter.links_to(&to_obj);
            let mut merged_links = to_links.clone();
            for link in interpreter.links_to(&from_obj) {
                if !merged_links.contains(&link) {
                    merged_links.push(link);
                }
            }

            let mut merged_obj = to_obj.clone();
            if merged_children != to_children {
                merged_obj = interpreter.replace_children(&merged_obj, &merged_children);
            }
            if merged_links != to_links {
                merged_obj = interpreter.replace_links_to(&merged_obj, &merged_links);
            }

            if merged_obj != to_obj {
                client.update_data(to, merged_obj).await?;
                outcome.updated.push(to);
                tracing::debug!(to = %to.short(), from = %from.short(), "merge staged update");
            }
            Ok(())
        })
    }
}

#[async_trait]
impl MergeStrategy for RecursiveLineageMerge {
    async fn merge_perspectives(
        &self,
        client: &GraphClient,
        to: PerspectiveId,
        from: PerspectiveId,
        config: &MergeConfig,
    ) -> Result<MergeOutcome, GraphError> {
        let owner = if config.force_owner {
            client.record(to).await?.owner
        } else {
            client.user_id().to_string()
        };
        let mut outcome = MergeOutcome::default();
        self.merge_inner(client, to, from, &owner, &mut outcome)
            .await?;
        Ok(outcome)
    }
}
