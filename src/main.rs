use calloway::av::cmd::ShellRunner;
use calloway::config::{bootstrap_dirs, AppConfig};
use calloway::http::{router, AppState};
use calloway::pipeline::UploadPipeline;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() {
    let config = Arc::new(AppConfig::from_env());

    tracing_subscriber::fmt::init();

    if let Err(e) = bootstrap_dirs(&config).await {
        eprintln!("Failed to create asset directories: {:?}", e);
        std::process::exit(1);
    }

    let runner = Arc::new(ShellRunner);
    let pipeline = Arc::new(UploadPipeline::new(config.clone(), runner));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(AppState {
        pipeline,
        config: config.clone(),
    })
    .layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    println!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
