//! Application manager
//!
//! The orchestration layer between views and the graph service. Sequences
//! remote calls for scaffolding checks, page lifecycle, blog feeds and
//! speculative fork merges. Performs no retries and no error translation;
//! failures surface to the caller as they happened.

use crate::config::{AppConfig, ConceptId};
use crate::elements::AppElements;
use crate::error::AppError;
use lt_graph::{
    ExploreOptions, GraphClient, MergeConfig, MergeStrategy, ParentAndChild, PermissionKind,
    Perspective, PerspectiveId, RecursiveLineageMerge,
};
use lt_patterns::{Recognized, TextNode};
use std::sync::Arc;

/// Orchestrates app flows against the graph service
#[derive(Debug)]
pub struct AppManager {
    graph: Arc<GraphClient>,
    elements: AppElements,
}

impl AppManager {
    /// Manager over the given client
    #[must_use]
    pub fn new(graph: Arc<GraphClient>, config: &AppConfig) -> Self {
        let elements = AppElements::new(Arc::clone(&graph), config);
        Self { graph, elements }
    }

    /// The underlying graph client
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &Arc<GraphClient> {
        &self.graph
    }

    /// The scaffolding elements
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &AppElements {
        &self.elements
    }

    /// Resolve a well-known concept perspective
    ///
    /// # Errors
    /// Propagates graph failures
    pub async fn concept(&self, concept: ConceptId) -> Result<Perspective, AppError> {
        Ok(self.graph.concept_perspective(concept.as_str()).await?)
    }

    /// Idempotently ensure the app skeleton exists and its policy is applied
    ///
    /// Safe to call on every application start: existing scaffolding is a
    /// no-op apart from policy reconciliation, which is itself idempotent.
    ///
    /// # Errors
    /// Propagates graph failures unrecovered
    pub async fn check_structure(&self) -> Result<(), AppError> {
        tracing::info!("checking app structure");
        self.elements.check().await?;
        self.check_blog_permissions().await?;
        Ok(())
    }

    /// Reconcile the blog section's policy and concept tag
    ///
    /// Delegation goes off (its own ACL governs), public read is granted,
    /// and the "bloghome" concept is ensured in the section's `isA` set by
    /// union. Re-running produces the same final state.
    ///
    /// # Errors
    /// - `AppError::NotASection` if the blog element holds the wrong shape
    /// - graph failures, unrecovered
    pub async fn check_blog_permissions(&self) -> Result<(), AppError> {
        let blog = self.elements.get(AppElements::BLOG_SECTION).await?;
        self.graph.toggle_delegate(blog.id, false).await?;
        self.graph
            .set_public_permissions(blog.id, PermissionKind::Read, true)
            .await?;

        let bloghome = self.concept(ConceptId::BlogHome).await?;
        let data = self.graph.get_perspective_data(blog.id).await?;
        let Recognized::Section(section) = Recognized::decode(&data) else {
            return Err(AppError::NotASection(blog.id));
        };
        if !section.meta.is_a.contains(&bloghome.id) {
            let mut links = section.meta.is_a.clone();
            links.push(bloghome.id);
            let tagged = self.graph.interpreter().replace_links_to(&data, &links);
            self.graph.update_data(blog.id, tagged).await?;
            self.graph.flush().await?;
            tracing::debug!(section = %blog.id.short(), "tagged blog section");
        }
        Ok(())
    }

    /// Create a default empty page under a section and commit it
    ///
    /// Appends, never replaces: the section's existing pages are preserved
    /// in insertion order.
    ///
    /// # Errors
    /// - `AppError::NotASection` if the target holds the wrong shape
    /// - graph failures (including not-found), unrecovered
    pub async fn new_page(&self, on_section: PerspectiveId) -> Result<PerspectiveId, AppError> {
        let data = self.graph.get_perspective_data(on_section).await?;
        if !matches!(Recognized::decode(&data), Recognized::Section(_)) {
            return Err(AppError::NotASection(on_section));
        }

        let page = serde_json::to_value(TextNode::empty_title())
            .map_err(lt_graph::GraphError::from)?;
        let id = self.graph.add_new_child(page, on_section).await?;
        self.graph.flush().await?;
        tracing::info!(page = %id.short(), section = %on_section.short(), "created page");
        Ok(id)
    }

    /// Fork a page into another section
    ///
    /// The fork starts from the page's current content with independent
    /// history, and is attached under `on_section`. With `flush` false the
    /// mutation stays buffered for the caller's next flush; final state is
    /// the same either way.
    ///
    /// # Errors
    /// Propagates graph failures unrecovered
    pub async fn fork_page(
        &self,
        page: PerspectiveId,
        on_section: PerspectiveId,
        flush: bool,
    ) -> Result<PerspectiveId, AppError> {
        let fork = self
            .graph
            .fork_perspective(page, None, Some(on_section))
            .await?;
        self.graph.add_existing_child(fork, on_section).await?;
        if flush {
            self.graph.flush().await?;
        }
        tracing::info!(page = %page.short(), fork = %fork.short(), "forked page");
        Ok(fork)
    }

    /// Fork a page into the blog section and tag it as a blog post
    ///
    /// The fork's `isA` set gains the "blogpost" concept by union, which is
    /// what makes it show up in the feed queries. One commit for the whole
    /// step.
    ///
    /// # Errors
    /// Propagates graph failures unrecovered
    pub async fn post_to_blog(&self, page: PerspectiveId) -> Result<PerspectiveId, AppError> {
        let blog = self.elements.get(AppElements::BLOG_SECTION).await?;
        let fork = self.fork_page(page, blog.id, false).await?;

        let blogpost = self.concept(ConceptId::BlogPost).await?;
        let data = self.graph.get_perspective_data(fork).await?;
        let mut links = self.graph.interpreter().links_to(&data);
        if !links.contains(&blogpost.id) {
            links.push(blogpost.id);
            let tagged = self.graph.interpreter().replace_links_to(&data, &links);
            self.graph.update_data(fork, tagged).await?;
        }
        self.graph.flush().await?;
        tracing::info!(page = %page.short(), fork = %fork.short(), "posted to blog");
        Ok(fork)
    }

    /// All perspectives tagged as blog posts
    ///
    /// Ordering is whatever the search index returns; nothing is sorted or
    /// deduplicated here.
    ///
    /// # Errors
    /// Propagates graph failures unrecovered
    pub async fn get_blog_feed(&self) -> Result<Vec<PerspectiveId>, AppError> {
        let blogpost = self.concept(ConceptId::BlogPost).await?;
        let result = self
            .graph
            .explore(&ExploreOptions::linked_to(blogpost.id))
            .await?;
        Ok(result.perspective_ids)
    }

    /// Blog posts reachable under the given ancestors (a "following" feed)
    ///
    /// # Errors
    /// Propagates graph failures unrecovered
    pub async fn get_blog_feed_under(
        &self,
        under: &[PerspectiveId],
    ) -> Result<Vec<PerspectiveId>, AppError> {
        let blogpost = self.concept(ConceptId::BlogPost).await?;
        let result = self
            .graph
            .explore(&ExploreOptions::linked_to(blogpost.id).under(under.to_vec()))
            .await?;
        Ok(result.perspective_ids)
    }

    /// The dashboard's sections, in display order
    ///
    /// # Errors
    /// - `AppError::NotADashboard` if the dashboard element holds the wrong
    ///   shape
    /// - graph failures, unrecovered
    pub async fn get_sections(&self) -> Result<Vec<PerspectiveId>, AppError> {
        let dashboard = self.elements.get(AppElements::DASHBOARD).await?;
        let data = self.graph.get_perspective_data(dashboard.id).await?;
        match Recognized::decode(&data) {
            Recognized::Dashboard(dashboard_data) => Ok(dashboard_data.sections),
            _ => Err(AppError::NotADashboard(dashboard.id)),
        }
    }

    /// Section at a dashboard index
    ///
    /// # Errors
    /// `AppError::SectionOutOfRange` for an index beyond the section list
    pub async fn section_at(&self, index: usize) -> Result<PerspectiveId, AppError> {
        let sections = self.get_sections().await?;
        sections
            .get(index)
            .copied()
            .ok_or(AppError::SectionOutOfRange {
                index,
                count: sections.len(),
            })
    }

    /// Every location where some fork of the page has been attached
    ///
    /// Empty when no forks exist anywhere.
    ///
    /// # Errors
    /// Propagates graph failures unrecovered
    pub async fn get_forked_in(
        &self,
        page: PerspectiveId,
    ) -> Result<Vec<ParentAndChild>, AppError> {
        Ok(self.graph.locate(page, true).await?)
    }

    /// Compute what merging `from` into `to` would do, without committing
    ///
    /// The live state is cloned into an isolated workspace and the
    /// recursive merge runs there with the target's ownership forced. The
    /// returned workspace holds the staged result; inspect it with
    /// [`AppManager::workspace_has_changes`] and discard it.
    ///
    /// # Errors
    /// Propagates graph failures unrecovered
    pub async fn compare_forks(
        &self,
        to: PerspectiveId,
        from: PerspectiveId,
    ) -> Result<GraphClient, AppError> {
        let workspace = self.graph.clone_workspace().await;
        RecursiveLineageMerge::new()
            .merge_perspectives(&workspace, to, from, &MergeConfig { force_owner: true })
            .await?;
        Ok(workspace)
    }

    /// Whether a comparison workspace staged any perspective updates
    pub async fn workspace_has_changes(&self, workspace: &GraphClient) -> bool {
        workspace.diff().await.has_updates()
    }
}
