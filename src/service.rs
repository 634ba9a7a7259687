use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{http, Router};
use axum_prometheus::PrometheusMetricLayerBuilder;
use futures::{Future, FutureExt};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse};
use tracing::{error, info};

use crate::{
    configuration::Cli,
    model::State,
    routes::{customers, monitoring},
    store::FileStore,
};

/// Open the customer store, build the api and monitoring routers and serve
/// them until a shutdown signal arrives or one of the servers stops.
pub async fn run_service(cli: Cli) -> anyhow::Result<()> {
    let store = FileStore::open(&cli.data_file)
        .await
        .with_context(|| format!("Unable to open customer store {}.", cli.data_file.display()))?;
    let state = State {
        store: Arc::new(store),
    };

    let (prometheus_layer, metric_handle) = PrometheusMetricLayerBuilder::new()
        .with_prefix("grocery-store-api")
        .with_default_metrics()
        .build_pair();

    let api_router = customers::customers_router(state)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(cli.log_headers))
                .on_response(DefaultOnResponse::new().include_headers(cli.log_headers)),
        )
        .layer(tower_http::timeout::TimeoutLayer::new(Duration::from_millis(
            cli.request_timeout,
        )))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(100_000)) // at most 100kB of data.
        .layer(tower_http::cors::CorsLayer::permissive().allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
        ]))
        .layer(prometheus_layer);

    let monitoring_router = monitoring::monitoring_router(metric_handle)
        .layer(tower_http::timeout::TimeoutLayer::new(Duration::from_millis(1000)))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(0));

    start_services(
        cli.listen_address,
        api_router,
        cli.monitoring_listen,
        monitoring_router,
    )
    .await
}

/// Like `tokio::spawn` but the provided future is modified so that
/// once it terminates it sends a message on the provided channel.
fn spawn_cancel<T>(
    died_sender: tokio::sync::broadcast::Sender<()>,
    future: T,
) -> tokio::task::JoinHandle<T::Output>
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    tokio::spawn(async move {
        let res = future.await;
        // A receiver lives until the end of `start_services`, so this only
        // fails once nobody is listening any more.
        let _ = died_sender.send(());
        res
    })
}

async fn start_services(
    listen_address: SocketAddr,
    api_router: Router,
    monitoring_address: SocketAddr,
    monitoring_router: Router,
) -> anyhow::Result<()> {
    // If a server stops it will send a message on this channel, which will then
    // cause the other one to shut down as well.
    let (died_sender, died_receiver) = tokio::sync::broadcast::channel(10);
    // Subscribe before anything is spawned so that no message is missed.
    let monitoring_receiver = died_sender.subscribe();
    let server_receiver = died_sender.subscribe();

    {
        let died_sender = died_sender.clone();
        // Start handling of shutdown signals now, before starting the servers.
        let shutdown_signal = set_shutdown()?;
        tokio::spawn(async move {
            shutdown_signal.await;
            info!("Received signal to shutdown");
            if died_sender.send(()).is_err() {
                error!("Unable to notify shutdown.");
            }
        });
    }

    let monitoring_server = axum::Server::try_bind(&monitoring_address)
        .with_context(|| format!("Unable to bind monitoring server to {monitoring_address}."))?
        .serve(monitoring_router.into_make_service())
        .with_graceful_shutdown(shutdown_trigger(monitoring_receiver));
    info!("Monitoring server is running at {monitoring_address}.");
    let monitoring_handle = spawn_cancel(died_sender.clone(), async move {
        if let Err(e) = monitoring_server.await {
            error!("Monitoring server error: {e}");
        }
    });

    let api_server = axum::Server::try_bind(&listen_address)
        .with_context(|| format!("Unable to bind api server to {listen_address}."))?
        .http1_header_read_timeout(Duration::from_secs(5))
        .serve(api_router.into_make_service())
        .with_graceful_shutdown(shutdown_trigger(server_receiver));
    info!("Customer api is running at {listen_address}.");
    let server_handle = spawn_cancel(died_sender.clone(), async move {
        if let Err(e) = api_server.await {
            error!("Api server error: {e}");
        }
    });

    // Wait until something triggers shutdown. Either a signal handler or one of
    // the servers terminating.
    shutdown_trigger(died_receiver).await;
    info!("Received shutdown trigger.");

    // Open connections can keep the server from stopping, so in-flight requests
    // get 5s after which the server is dropped.
    if tokio::time::timeout(Duration::from_secs(5), server_handle)
        .await
        .is_err()
    {
        error!("Unable to stop the server gracefully in required time. Terminating forcefully.");
    }
    monitoring_handle.abort();

    info!("Service is shut down");

    Ok(())
}

async fn shutdown_trigger(mut receiver: tokio::sync::broadcast::Receiver<()>) {
    if receiver.recv().await.is_err() {
        error!("Shutdown channel unexpectedly closed.");
    }
}

/// Install handlers for SIGTERM and SIGINT (ctrl-break and ctrl-c on windows)
/// and return a future that resolves on the first of them.
fn set_shutdown() -> anyhow::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix as unix_signal;

        let mut sigterm = unix_signal::signal(unix_signal::SignalKind::terminate())?;
        let mut sigint = unix_signal::signal(unix_signal::SignalKind::interrupt())?;

        Ok(async move {
            futures::future::select(
                Box::pin(sigterm.recv()),
                Box::pin(sigint.recv()),
            )
            .map(|_| ())
            .await
        })
    }
    #[cfg(windows)]
    {
        use tokio::signal::windows as windows_signal;

        let mut ctrl_break = windows_signal::ctrl_break()?;
        let mut ctrl_c = windows_signal::ctrl_c()?;

        Ok(async move {
            futures::future::select(
                Box::pin(ctrl_break.recv()),
                Box::pin(ctrl_c.recv()),
            )
            .map(|_| ())
            .await
        })
    }
}
