//! Search over the perspective graph
//!
//! Two query shapes: forward exploration by semantic links with optional
//! subtree scoping, and reverse location lookup (including fork discovery
//! through shared lineage). Result ordering follows the service's own scan
//! order; callers must not rely on it.

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::id::PerspectiveId;
use crate::perspective::ParentAndChild;
use std::collections::HashSet;

/// Options for [`GraphClient::explore`]
#[derive(Debug, Clone, Default)]
pub struct ExploreOptions {
    /// Concept ids the object's semantic links must all include
    pub links_to: Vec<PerspectiveId>,
    /// Restrict to perspectives reachable under any of these ancestors
    /// (the ancestors themselves are in scope)
    pub under: Vec<PerspectiveId>,
}

impl ExploreOptions {
    /// Match perspectives linking to the given concept
    #[inline]
    #[must_use]
    pub fn linked_to(concept: PerspectiveId) -> Self {
        Self {
            links_to: vec![concept],
            under: Vec::new(),
        }
    }

    /// Scope the query under the given ancestors
    #[inline]
    #[must_use]
    pub fn under(mut self, ancestors: Vec<PerspectiveId>) -> Self {
        self.under = ancestors;
        self
    }
}

/// Result of [`GraphClient::explore`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExploreResult {
    /// Matching perspective ids, in scan order
    pub perspective_ids: Vec<PerspectiveId>,
}

impl GraphClient {
    /// Query the graph for perspectives matching the options
    ///
    /// No sorting and no deduplication happen here.
    pub async fn explore(&self, options: &ExploreOptions) -> Result<ExploreResult, GraphError> {
        let state = self.state.read().await;

        let scope: Option<HashSet<PerspectiveId>> = if options.under.is_empty() {
            None
        } else {
            let mut visited: HashSet<PerspectiveId> = HashSet::new();
            let mut frontier: Vec<PerspectiveId> = options.under.clone();
            while let Some(id) = frontier.pop() {
                if !visited.insert(id) {
                    continue;
                }
                if let Some(record) = state.get(&id) {
                    frontier.extend(self.interpreter().children(&record.object));
                }
            }
            Some(visited)
        };

        let mut perspective_ids = Vec::new();
        for id in state.view_ids() {
            if let Some(scope) = &scope {
                if !scope.contains(&id) {
                    continue;
                }
            }
            let Some(record) = state.get(&id) else {
                continue;
            };
            if !options.links_to.is_empty() {
                let links = self.interpreter().links_to(&record.object);
                if !options.links_to.iter().all(|concept| links.contains(concept)) {
                    continue;
                }
            }
            perspective_ids.push(id);
        }

        Ok(ExploreResult { perspective_ids })
    }

    /// Locate the parents holding a perspective — or, with `find_forks`,
    /// the parents holding any *other* perspective of the same lineage
    ///
    /// Returns an empty sequence when nothing is attached anywhere.
    ///
    /// # Errors
    /// `GraphError::PerspectiveNotFound` if the id does not resolve
    pub async fn locate(
        &self,
        id: PerspectiveId,
        find_forks: bool,
    ) -> Result<Vec<ParentAndChild>, GraphError> {
        let state = self.state.read().await;
        let target = state
            .get(&id)
            .ok_or(GraphError::PerspectiveNotFound(id))?;

        let candidates: HashSet<PerspectiveId> = if find_forks {
            state
                .view_ids()
                .into_iter()
                .filter(|candidate| {
                    *candidate != id
                        && state
                            .get(candidate)
                            .is_some_and(|record| record.lineage == target.lineage)
                })
                .collect()
        } else {
            HashSet::from([id])
        };

        let mut locations = Vec::new();
        for parent_id in state.view_ids() {
            let Some(parent) = state.get(&parent_id) else {
                continue;
            };
            for child_id in self.interpreter().children(&parent.object) {
                if candidates.contains(&child_id) {
                    locations.push(ParentAndChild {
                        parent_id,
                        child_id,
                    });
                }
            }
        }

        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node, tagged_node, test_client};

    #[tokio::test]
    async fn explore_by_concept_link() {
        let client = test_client("alice");
        let concept = PerspectiveId::derive(b"concept/blogpost");
        let tagged = client
            .new_perspective(tagged_node(&[], &[concept]))
            .await
            .unwrap();
        let _plain = client.new_perspective(node(&[])).await.unwrap();

        let result = client
            .explore(&ExploreOptions::linked_to(concept))
            .await
            .unwrap();
        assert_eq!(result.perspective_ids, vec![tagged]);
    }

    #[tokio::test]
    async fn explore_scoped_under_ancestor() {
        let client = test_client("alice");
        let concept = PerspectiveId::derive(b"concept/blogpost");

        let inside = client
            .new_perspective(tagged_node(&[], &[concept]))
            .await
            .unwrap();
        let root = client.new_perspective(node(&[inside])).await.unwrap();
        let outside = client
            .new_perspective(tagged_node(&[], &[concept]))
            .await
            .unwrap();

        let scoped = client
            .explore(&ExploreOptions::linked_to(concept).under(vec![root]))
            .await
            .unwrap();
        assert_eq!(scoped.perspective_ids, vec![inside]);

        let unscoped = client
            .explore(&ExploreOptions::linked_to(concept))
            .await
            .unwrap();
        assert!(unscoped.perspective_ids.contains(&outside));
    }

    #[tokio::test]
    async fn locate_finds_fork_locations_not_own() {
        let client = test_client("alice");
        let page = client.new_perspective(node(&[])).await.unwrap();
        let home_section = client.new_perspective(node(&[page])).await.unwrap();

        let fork = client.fork_perspective(page, None, None).await.unwrap();
        let other_section = client.new_perspective(node(&[fork])).await.unwrap();

        let locations = client.locate(page, true).await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].parent_id, other_section);
        assert_eq!(locations[0].child_id, fork);

        // without fork discovery only the page's own parents come back
        let own = client.locate(page, false).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].parent_id, home_section);
    }

    #[tokio::test]
    async fn locate_without_forks_is_empty() {
        let client = test_client("alice");
        let page = client.new_perspective(node(&[])).await.unwrap();
        let _section = client.new_perspective(node(&[page])).await.unwrap();

        let locations = client.locate(page, true).await.unwrap();
        assert!(locations.is_empty());
    }
}
