use std::{future::IntoFuture, process, sync::Arc};

use blogfront::{
    application::{
        error::AppError,
        gateway::{GatewayError, PostGateway},
        overview::{FilterState, OverviewPipeline, ViewState},
        posts::PostService,
    },
    config,
    domain::posts::seed_posts,
    infra::{
        client::HttpPostGateway,
        error::InfraError,
        http::{ApiState, build_api_router},
        memory::InMemoryPostStore,
        preferences::{PreferenceStore, Preferences},
        telemetry,
    },
    presentation::{
        commands::{BrowseCommand, HELP},
        overview::{Theme, render_overview, render_post},
    },
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Browse(_) => run_browse(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let store = InMemoryPostStore::new(seed_posts());
    let posts = PostService::new(Arc::new(store));
    let router = build_api_router(ApiState::new(posts));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "blogfront::serve",
        addr = %settings.server.addr,
        "post API listening"
    );

    let (stop_tx, mut stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let mut server_stop = stop_rx.clone();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = server_stop.wait_for(|stop| *stop).await;
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server => result.map_err(InfraError::from)?,
        _ = async {
            let _ = stop_rx.wait_for(|stop| *stop).await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                target = "blogfront::serve",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!(target = "blogfront::serve", "post API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "blogfront::serve", error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target = "blogfront::serve", error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(target = "blogfront::serve", "shutdown requested");
}

async fn run_browse(settings: config::Settings) -> Result<(), AppError> {
    let client = &settings.client;
    let preferences = PreferenceStore::new(client.preferences_file.clone());
    let initial = preferences.load().await.unwrap_or_else(|err| {
        warn!(target = "blogfront::browse", error = %err, "using default preferences");
        Preferences::default()
    });

    let gateway: Arc<dyn PostGateway> = Arc::new(HttpPostGateway::new(
        client.api_base_url.as_str(),
        client.request_timeout,
    )?);
    let pipeline = OverviewPipeline::spawn(Arc::clone(&gateway));
    let (theme_tx, theme_rx) = watch::channel(Theme::from(initial));

    info!(
        target = "blogfront::browse",
        api = %client.api_base_url,
        "browsing posts"
    );
    println!("{HELP}");

    let renderer = tokio::spawn(render_loop(
        pipeline.subscribe(),
        pipeline.watch_filters(),
        theme_rx,
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(InfraError::from)? {
        let command = match BrowseCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            BrowseCommand::Category(name) => pipeline.set_category(name),
            BrowseCommand::ToggleFeatured => pipeline.toggle_featured(),
            BrowseCommand::Reset => pipeline.reset_filters(),
            BrowseCommand::Refresh => pipeline.request_refresh(),
            BrowseCommand::Post(id) => match gateway.fetch_by_id(id).await {
                Ok(post) => println!("{}", render_post(&post, *theme_tx.borrow())),
                Err(GatewayError::NotFound) => println!("post {id} not found"),
                Err(err) => println!("could not load post {id}: {err}"),
            },
            BrowseCommand::ToggleTheme => match preferences.toggle_dark_mode().await {
                Ok(updated) => {
                    theme_tx.send_replace(Theme::from(updated));
                }
                Err(err) => {
                    warn!(target = "blogfront::browse", error = %err, "could not save preferences");
                }
            },
            BrowseCommand::Help => println!("{HELP}"),
            BrowseCommand::Quit => break,
        }
    }

    renderer.abort();
    drop(pipeline);
    Ok(())
}

/// Print a fresh frame whenever the view or the theme changes.
async fn render_loop(
    mut view: watch::Receiver<ViewState>,
    filters: watch::Receiver<FilterState>,
    mut theme: watch::Receiver<Theme>,
) {
    loop {
        let frame = {
            let state = view.borrow_and_update().clone();
            let current_filters = filters.borrow().clone();
            let current_theme = *theme.borrow_and_update();
            render_overview(&state, &current_filters, current_theme)
        };
        println!("{frame}");

        tokio::select! {
            changed = view.changed() => if changed.is_err() { return },
            changed = theme.changed() => if changed.is_err() { return },
        }
    }
}
