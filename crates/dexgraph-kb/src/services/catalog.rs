//! Listing and search over creatures

use tracing::{debug, instrument};

use crate::data::{CoreError, Creature, TraceContext};
use crate::services::graph::GraphAccess;
use crate::services::query::{projection, Page, QueryBuilder, SearchQuery};

pub struct CreatureCatalog {
    graph: GraphAccess,
}

impl CreatureCatalog {
    pub fn new(graph: GraphAccess) -> Self {
        Self { graph }
    }

    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn list(&self, trace_ctx: &TraceContext, page: Page) -> Result<Vec<Creature>, CoreError> {
        let rows = self.graph.run_once(trace_ctx, &QueryBuilder::list(page)).await?;
        let creatures = projection::creatures_from_rows(&rows)?;
        debug!(count = creatures.len(), "Listed creatures");
        Ok(creatures)
    }

    #[instrument(skip(self, trace_ctx, query), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn search(
        &self,
        trace_ctx: &TraceContext,
        query: &SearchQuery,
        page: Page,
    ) -> Result<Vec<Creature>, CoreError> {
        let statement = QueryBuilder::search(query, page);
        let rows = self.graph.run_once(trace_ctx, &statement).await?;
        let creatures = projection::creatures_from_rows(&rows)?;
        debug!(count = creatures.len(), "Search matched creatures");
        Ok(creatures)
    }
}
