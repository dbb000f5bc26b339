use crate::{
    config::Config,
    inference_service::InferenceService,
    labels::LabelTable,
    model_service::ModelService,
    ort_service::OrtModelService,
    routes::api_routes,
    telemetry::Metrics,
};
use anyhow::Context;
use axum::{extract::DefaultBodyLimit, Router};
use axum_otel_metrics::HttpMetricsLayerBuilder;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};

pub struct SharedState<M: ModelService> {
    pub inference_service: InferenceService<M>,
    pub metrics: Arc<Metrics>,
}

impl<M: ModelService> Clone for SharedState<M> {
    fn clone(&self) -> Self {
        Self {
            inference_service: self.inference_service.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

pub fn build_router<M: ModelService>(state: SharedState<M>, max_body_bytes: usize) -> Router {
    let metrics_layer = HttpMetricsLayerBuilder::new().build();

    Router::new()
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
        .layer(metrics_layer)
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<M: ModelService>(state: SharedState<M>, config: &Config) -> anyhow::Result<Self> {
        let addr = config.server.get_address();
        let router = build_router(state, config.upload.max_body_bytes);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!("Inference service listening on {}", self.listener.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async {
                shutdown_signal().await;
                tracing::info!("Shutdown signal received, starting graceful shutdown");
            })
            .await
            .context("failed to run http server")
    }
}

/// Loads the model and labels, then serves. The listener is only bound once
/// both are loaded and agree on the number of classes.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let labels = LabelTable::from_config(&config.labels)
        .with_context(|| format!("failed to load labels from {:?}", config.labels.labels_file))?;
    tracing::info!("Loaded {} labels", labels.len());

    let model_config = config.model.clone();
    let inference_service = tokio::task::spawn_blocking(move || {
        let ort_model_service = OrtModelService::new(&model_config)?;
        anyhow::Ok(InferenceService::new(ort_model_service, labels)?)
    })
    .await
    .context("model loading task panicked")?
    .context("failed to instantiate ort model service")?;

    let state = SharedState {
        inference_service,
        metrics: Arc::new(Metrics::new()?),
    };

    HttpServer::new(state, &config).await?.run().await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
