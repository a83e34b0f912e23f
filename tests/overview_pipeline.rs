use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blogfront::application::gateway::{GatewayError, PostGateway};
use blogfront::application::overview::{FilterState, OverviewPipeline, ViewState};
use blogfront::domain::posts::{Post, PostFilter, distinct_categories, filter_posts, seed_posts};
use tokio::sync::{Semaphore, mpsc, watch};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

/// In-process gateway over the seed posts that records every call and can
/// hold one category back until released.
struct ScriptedGateway {
    posts: Vec<Post>,
    calls: mpsc::UnboundedSender<String>,
    held_category: Option<String>,
    gate: Semaphore,
    fail_posts: bool,
    fail_categories: bool,
}

#[derive(Default)]
struct Script {
    held_category: Option<&'static str>,
    fail_posts: bool,
    fail_categories: bool,
}

impl Script {
    fn build(self) -> (Arc<ScriptedGateway>, mpsc::UnboundedReceiver<String>) {
        let (calls, rx) = mpsc::unbounded_channel();
        let gateway = ScriptedGateway {
            posts: seed_posts(),
            calls,
            held_category: self.held_category.map(str::to_string),
            gate: Semaphore::new(0),
            fail_posts: self.fail_posts,
            fail_categories: self.fail_categories,
        };
        (Arc::new(gateway), rx)
    }
}

impl ScriptedGateway {
    fn record(&self, call: String) {
        let _ = self.calls.send(call);
    }

    fn posts(&self, filter: &PostFilter) -> Result<Vec<Post>, GatewayError> {
        if self.fail_posts {
            return Err(GatewayError::Server {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(filter_posts(&self.posts, filter))
    }

    fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl PostGateway for ScriptedGateway {
    async fn fetch_all(&self) -> Result<Vec<Post>, GatewayError> {
        self.record("all".into());
        self.posts(&PostFilter::all())
    }

    async fn fetch_by_category(&self, name: &str) -> Result<Vec<Post>, GatewayError> {
        self.record(format!("category:{name}"));
        if self.held_category.as_deref() == Some(name) {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| GatewayError::network("gate closed"))?;
        }
        self.posts(&PostFilter::category(name))
    }

    async fn fetch_featured(&self) -> Result<Vec<Post>, GatewayError> {
        self.record("featured".into());
        self.posts(&PostFilter::featured_only())
    }

    async fn fetch_by_id(&self, id: u64) -> Result<Post, GatewayError> {
        self.record(format!("post:{id}"));
        self.posts
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, GatewayError> {
        self.record("categories".into());
        if self.fail_categories {
            return Err(GatewayError::network("connection refused"));
        }
        Ok(distinct_categories(&self.posts))
    }
}

/// Wait for the next published state that is no longer loading.
async fn next_settled(rx: &mut watch::Receiver<ViewState>) -> ViewState {
    timeout(WAIT, async {
        loop {
            rx.changed().await.expect("pipeline should be running");
            let state = rx.borrow_and_update().clone();
            if !state.is_loading {
                return state;
            }
        }
    })
    .await
    .expect("view should settle in time")
}

fn drain(calls: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut seen = Vec::new();
    while let Ok(call) = calls.try_recv() {
        seen.push(call);
    }
    seen
}

fn post_calls(calls: &[String]) -> Vec<&str> {
    calls
        .iter()
        .map(String::as_str)
        .filter(|call| *call != "categories")
        .collect()
}

fn ids(state: &ViewState) -> Vec<u64> {
    state.posts.iter().map(|post| post.id).collect()
}

#[tokio::test]
async fn first_cycle_loads_everything() {
    let (gateway, mut calls) = Script::default().build();
    let pipeline = OverviewPipeline::spawn(gateway);
    let mut view = pipeline.subscribe();

    let state = next_settled(&mut view).await;
    assert_eq!(ids(&state), vec![1, 2, 3, 4, 5]);
    assert_eq!(state.categories, vec!["Angular", "CSS", "TypeScript"]);
    assert_eq!(pipeline.filters(), FilterState::default());

    let seen = drain(&mut calls);
    assert_eq!(post_calls(&seen), vec!["all"]);
    assert_eq!(seen.iter().filter(|call| *call == "categories").count(), 1);
}

#[tokio::test]
async fn featured_wins_over_category() {
    let (gateway, mut calls) = Script::default().build();
    let pipeline = OverviewPipeline::spawn(gateway);
    let mut view = pipeline.subscribe();
    next_settled(&mut view).await;
    drain(&mut calls);

    pipeline.set_category("CSS");
    let state = next_settled(&mut view).await;
    assert_eq!(ids(&state), vec![2, 3]);
    assert_eq!(post_calls(&drain(&mut calls)), vec!["category:CSS"]);

    pipeline.toggle_featured();
    let state = next_settled(&mut view).await;
    assert_eq!(ids(&state), vec![1, 3]);
    assert_eq!(post_calls(&drain(&mut calls)), vec!["featured"]);

    pipeline.toggle_featured();
    let state = next_settled(&mut view).await;
    assert_eq!(ids(&state), vec![2, 3]);
    assert_eq!(post_calls(&drain(&mut calls)), vec!["category:CSS"]);
}

#[tokio::test]
async fn reset_returns_to_the_initial_view_in_one_cycle() {
    let (gateway, mut calls) = Script::default().build();
    let pipeline = OverviewPipeline::spawn(gateway);
    let mut view = pipeline.subscribe();
    let initial = next_settled(&mut view).await;

    pipeline.set_category("Angular");
    next_settled(&mut view).await;
    pipeline.toggle_featured();
    next_settled(&mut view).await;
    drain(&mut calls);

    pipeline.reset_filters();
    let reset = next_settled(&mut view).await;

    assert_eq!(reset, initial);
    assert_eq!(pipeline.filters().selected_category, "");
    assert!(!pipeline.filters().show_only_featured);
    assert_eq!(post_calls(&drain(&mut calls)), vec!["all"]);
}

#[tokio::test]
async fn refresh_refetches_with_the_same_filters() {
    let (gateway, mut calls) = Script::default().build();
    let pipeline = OverviewPipeline::spawn(gateway);
    let mut view = pipeline.subscribe();

    pipeline.set_category("TypeScript");
    let before = next_settled(&mut view).await;
    drain(&mut calls);

    pipeline.request_refresh();
    let after = next_settled(&mut view).await;

    assert_eq!(after, before);
    assert_eq!(post_calls(&drain(&mut calls)), vec!["category:TypeScript"]);
    assert_eq!(pipeline.filters().selected_category, "TypeScript");
}

#[tokio::test]
async fn latest_selection_wins_over_a_slower_one() {
    let (gateway, mut calls) = Script {
        held_category: Some("Angular"),
        ..Default::default()
    }
    .build();
    let pipeline = OverviewPipeline::spawn(Arc::clone(&gateway) as Arc<dyn PostGateway>);
    let mut view = pipeline.subscribe();
    next_settled(&mut view).await;
    drain(&mut calls);

    pipeline.set_category("Angular");
    timeout(WAIT, async {
        while let Some(call) = calls.recv().await {
            if call == "category:Angular" {
                break;
            }
        }
    })
    .await
    .expect("held request should start");
    assert!(pipeline.current().is_loading);
    assert!(pipeline.current().posts.is_empty());

    pipeline.set_category("CSS");
    let state = next_settled(&mut view).await;
    assert_eq!(ids(&state), vec![2, 3]);

    gateway.release();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!view.has_changed().expect("pipeline should be running"));
    assert_eq!(ids(&pipeline.current()), vec![2, 3]);
}

#[tokio::test]
async fn post_failures_end_the_cycle_with_an_empty_list() {
    let (gateway, _calls) = Script {
        fail_posts: true,
        ..Default::default()
    }
    .build();
    let pipeline = OverviewPipeline::spawn(gateway);
    let mut view = pipeline.subscribe();

    let state = next_settled(&mut view).await;
    assert!(!state.is_loading);
    assert!(state.posts.is_empty());
    assert_eq!(state.categories, vec!["Angular", "CSS", "TypeScript"]);

    pipeline.toggle_featured();
    let state = next_settled(&mut view).await;
    assert!(state.posts.is_empty());
}

#[tokio::test]
async fn category_failures_keep_the_posts() {
    let (gateway, _calls) = Script {
        fail_categories: true,
        ..Default::default()
    }
    .build();
    let pipeline = OverviewPipeline::spawn(gateway);
    let mut view = pipeline.subscribe();

    let state = next_settled(&mut view).await;
    assert_eq!(state.posts.len(), 5);
    assert!(state.categories.is_empty());
}

#[tokio::test]
async fn dropping_the_pipeline_stops_the_driver() {
    let (gateway, _calls) = Script::default().build();
    let pipeline = OverviewPipeline::spawn(gateway);
    let mut view = pipeline.subscribe();
    next_settled(&mut view).await;

    drop(pipeline);
    let closed = timeout(WAIT, async {
        loop {
            if view.changed().await.is_err() {
                break;
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "view channel should close");
}
