//! Reactive filter pipeline behind the post overview.
//!
//! The user's category choice, the featured-only switch and the refresh signal
//! are three cells of one [`FilterState`] snapshot held in a watch channel.
//! Writing any cell wakes a single driver task that always reads the latest
//! value of all three, which gives combine-latest semantics; writes that land
//! before the driver wakes are coalesced into one cycle.
//!
//! Each cycle publishes a loading [`ViewState`], picks one [`FetchStrategy`],
//! fetches posts and categories concurrently and publishes the settled view.
//! The in-flight cycle is raced against the next input change: when the
//! change wins, the cycle future is dropped and its result never reaches
//! subscribers (switch-latest). Dropping the future may or may not abort the
//! request on the wire.
//!
//! Fetch failures never escape a cycle. A failed post fetch yields an empty
//! post list, a failed category fetch an empty category list, and both are
//! logged. Subscribers cannot tell "no posts" from "fetch failed"; that gap is
//! known and kept as is.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::gateway::{GatewayError, PostGateway};
use crate::domain::posts::Post;

/// Current values of the pipeline's input cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Empty means no category filter.
    pub selected_category: String,
    pub show_only_featured: bool,
    /// Bumped by every refresh request; only its change matters.
    pub refresh: u64,
}

/// The one query a cycle runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    Featured,
    Category(String),
    All,
}

impl FetchStrategy {
    /// Featured-only wins over a category selection, which wins over no filter.
    pub fn select(filters: &FilterState) -> Self {
        if filters.show_only_featured {
            FetchStrategy::Featured
        } else if !filters.selected_category.is_empty() {
            FetchStrategy::Category(filters.selected_category.clone())
        } else {
            FetchStrategy::All
        }
    }

    pub async fn fetch(&self, gateway: &dyn PostGateway) -> Result<Vec<Post>, GatewayError> {
        match self {
            FetchStrategy::Featured => gateway.fetch_featured().await,
            FetchStrategy::Category(name) => gateway.fetch_by_category(name).await,
            FetchStrategy::All => gateway.fetch_all().await,
        }
    }

    fn label(&self) -> &str {
        match self {
            FetchStrategy::Featured => "featured",
            FetchStrategy::Category(_) => "category",
            FetchStrategy::All => "all",
        }
    }
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub posts: Vec<Post>,
    pub categories: Vec<String>,
    pub is_loading: bool,
}

impl ViewState {
    pub fn loading() -> Self {
        Self {
            posts: Vec::new(),
            categories: Vec::new(),
            is_loading: true,
        }
    }
}

/// Handle owned by one overview. Dropping it stops the driver task.
pub struct OverviewPipeline {
    inputs: watch::Sender<FilterState>,
    view: watch::Receiver<ViewState>,
    driver: JoinHandle<()>,
}

impl OverviewPipeline {
    /// Start the driver on the current tokio runtime. The first cycle runs
    /// immediately with the default (unfiltered) selection.
    pub fn spawn(gateway: Arc<dyn PostGateway>) -> Self {
        let (inputs, input_rx) = watch::channel(FilterState::default());
        let (view_tx, view) = watch::channel(ViewState::loading());
        let driver = tokio::spawn(drive(gateway, input_rx, view_tx));
        Self {
            inputs,
            view,
            driver,
        }
    }

    pub fn set_category(&self, name: impl Into<String>) {
        let name = name.into();
        self.inputs.send_modify(|state| state.selected_category = name);
    }

    pub fn toggle_featured(&self) {
        self.inputs.send_modify(|state| state.show_only_featured = !state.show_only_featured);
    }

    /// Clears both filters in a single write, so exactly one cycle follows.
    pub fn reset_filters(&self) {
        self.inputs.send_modify(|state| {
            state.selected_category.clear();
            state.show_only_featured = false;
        });
    }

    /// Re-run the current query without touching the filters.
    pub fn request_refresh(&self) {
        self.inputs.send_modify(|state| state.refresh = state.refresh.wrapping_add(1));
    }

    pub fn filters(&self) -> FilterState {
        self.inputs.borrow().clone()
    }

    pub fn watch_filters(&self) -> watch::Receiver<FilterState> {
        self.inputs.subscribe()
    }

    pub fn current(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// A receiver that observes every view state published from now on.
    /// Intermediate states may be skipped by slow readers; the latest is never lost.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }
}

impl Drop for OverviewPipeline {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    gateway: Arc<dyn PostGateway>,
    mut inputs: watch::Receiver<FilterState>,
    view: watch::Sender<ViewState>,
) {
    let mut cycle: u64 = 0;

    loop {
        let filters = inputs.borrow_and_update().clone();
        let strategy = FetchStrategy::select(&filters);
        cycle += 1;

        counter!("blogfront_overview_cycles_total").increment(1);
        debug!(
            target = "blogfront::overview",
            cycle,
            strategy = strategy.label(),
            category = %filters.selected_category,
            featured = filters.show_only_featured,
            "overview cycle started"
        );
        view.send_replace(ViewState::loading());

        tokio::select! {
            biased;
            changed = inputs.changed() => {
                if changed.is_err() {
                    return;
                }
                counter!("blogfront_overview_cycles_superseded_total").increment(1);
                debug!(target = "blogfront::overview", cycle, "overview cycle superseded");
                continue;
            }
            settled = run_cycle(gateway.as_ref(), &strategy, cycle) => {
                debug!(
                    target = "blogfront::overview",
                    cycle,
                    posts = settled.posts.len(),
                    categories = settled.categories.len(),
                    "overview cycle settled"
                );
                view.send_replace(settled);
            }
        }

        if inputs.changed().await.is_err() {
            return;
        }
    }
}

async fn run_cycle(gateway: &dyn PostGateway, strategy: &FetchStrategy, cycle: u64) -> ViewState {
    let (posts, categories) = tokio::join!(strategy.fetch(gateway), gateway.fetch_categories());

    let posts = posts.unwrap_or_else(|err| {
        warn!(
            target = "blogfront::overview",
            cycle,
            strategy = strategy.label(),
            error = %err,
            "post fetch failed; showing an empty list"
        );
        Vec::new()
    });
    let categories = categories.unwrap_or_else(|err| {
        warn!(
            target = "blogfront::overview",
            cycle,
            error = %err,
            "category fetch failed; showing no categories"
        );
        Vec::new()
    });

    ViewState {
        posts,
        categories,
        is_loading: false,
    }
}
