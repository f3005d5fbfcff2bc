//! Execution engine module
//!
//! Pagination loop and entity stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Turns a `SyncRequest` into a lazy stream of entities
//! - `SyncRequest` - The caller's list, `since` and `since_path`
//! - `annotate_updated` - The `_updated` field extractor
//!
//! The stream is emit-then-advance: the page after page N is requested only
//! once every entity of page N has been pulled by the consumer, so at most
//! one page is held in memory per request.

mod types;
mod updated;

pub use types::{SyncRequest, SyncStats};
pub use updated::{annotate_updated, lookup_entity_path, lookup_path};

use crate::error::{Error, Result};
use crate::odata::{Page, PageNormalizer, PageSource, PageTarget};
use crate::resolver::PathResolver;
use crate::types::{Entity, JsonValue};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A lazily evaluated, ordered stream of entities
pub type EntityStream = BoxStream<'static, Result<Entity>>;

/// Sync engine for streaming list entities
///
/// Cheap to clone; every clone shares the same page source, normalizer and
/// resolver.
#[derive(Clone)]
pub struct SyncEngine {
    /// Fetches authenticated pages
    source: Arc<dyn PageSource>,
    /// Extracts entities and cursors from page bodies
    normalizer: Arc<dyn PageNormalizer>,
    /// Builds first-page URLs
    resolver: Arc<PathResolver>,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        source: Arc<dyn PageSource>,
        normalizer: Arc<dyn PageNormalizer>,
        resolver: PathResolver,
    ) -> Self {
        Self {
            source,
            normalizer,
            resolver: Arc::new(resolver),
        }
    }

    /// Stream every entity of the requested list
    ///
    /// Nothing happens until the stream is polled. Errors end the stream.
    pub fn entities(&self, request: SyncRequest) -> EntityStream {
        let since_path = request.since_path.clone();
        let pager = Pager {
            source: Arc::clone(&self.source),
            normalizer: Arc::clone(&self.normalizer),
            resolver: Arc::clone(&self.resolver),
            step: Step::Start(request),
            stats: SyncStats::new(),
            started: Instant::now(),
        };

        stream::try_unfold(pager, |mut pager| async move {
            let entities = pager.advance().await?;
            Ok::<_, Error>(entities.map(|entities| (entities, pager)))
        })
        .map_ok(|entities| stream::iter(entities.into_iter().map(Ok::<Entity, Error>)))
        .try_flatten()
        .map_ok(move |entity| annotate_updated(entity, since_path.as_deref()))
        .boxed()
    }

    /// Start streaming, failing early if the first page cannot be produced
    ///
    /// Pulls the first entity before returning so that configuration,
    /// network and upstream errors on the first page are reported before any
    /// output is committed. The returned stream still yields that entity.
    pub async fn start(&self, request: SyncRequest) -> Result<EntityStream> {
        let mut entities = self.entities(request);
        match entities.next().await {
            Some(Err(e)) => Err(e),
            Some(Ok(first)) => Ok(stream::once(async move { Ok(first) })
                .chain(entities)
                .boxed()),
            None => Ok(stream::empty().boxed()),
        }
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Where the page loop is
enum Step {
    /// Nothing fetched yet
    Start(SyncRequest),
    /// The next page to fetch
    Fetch(PageTarget),
    /// The last page has been fetched
    Finished,
}

/// Drives the page loop for one request
struct Pager {
    source: Arc<dyn PageSource>,
    normalizer: Arc<dyn PageNormalizer>,
    resolver: Arc<PathResolver>,
    step: Step,
    stats: SyncStats,
    started: Instant,
}

impl Pager {
    /// Fetch the next page and return its entities, or `None` when done
    async fn advance(&mut self) -> Result<Option<Vec<Entity>>> {
        let target = match std::mem::replace(&mut self.step, Step::Finished) {
            Step::Start(request) => {
                self.source.ensure_configured()?;
                let url = self
                    .resolver
                    .resolve(&request.list, request.since.as_deref())?;
                info!(list = %request.list, since = ?request.since, "Starting list sync");
                PageTarget::Url(url)
            }
            Step::Fetch(target) => target,
            Step::Finished => return Ok(None),
        };

        let page = self.fetch_page(&target).await?;
        self.stats.add_page();
        self.stats.add_entities(page.entities.len());

        debug!(
            "Page {}: fetched {} entities",
            self.stats.pages_fetched,
            page.entities.len()
        );

        match page.next {
            Some(cursor) => self.step = Step::Fetch(PageTarget::Cursor(cursor)),
            None => {
                let elapsed_ms = self.started.elapsed().as_millis() as u64;
                info!(
                    pages = self.stats.pages_fetched,
                    entities = self.stats.entities_fetched,
                    elapsed_ms,
                    "Completed list sync"
                );
            }
        }

        Ok(Some(page.entities))
    }

    /// Fetch and normalize one page, failing on any status other than 200
    async fn fetch_page(&self, target: &PageTarget) -> Result<Page> {
        let raw = self.source.fetch(target).await?;

        if !raw.is_ok() {
            warn!(
                status = raw.status,
                target = target.as_str(),
                "Upstream returned an error status"
            );
            return Err(Error::upstream(raw.status, raw.body));
        }

        let body: JsonValue = match serde_json::from_str(&raw.body) {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    target = target.as_str(),
                    "Page body is not valid JSON, treating it as the last page: {e}"
                );
                return Ok(Page::empty());
            }
        };

        Ok(self.normalizer.normalize(body))
    }
}
