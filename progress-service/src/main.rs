mod config;
mod error;
mod handlers;
mod lambda;
// Request/response DTOs
mod models;
mod responses;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use lambda_http::{run, service_fn, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Local runs pick up DATABASE_URL from a .env file
    dotenvy::dotenv().ok();

    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,lesson_progress_service=debug".into());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_ansi(false) // Disable ANSI colors in Lambda environment
        .with_target(true)
        .init();

    if let Ok(function_name) = std::env::var("AWS_LAMBDA_FUNCTION_NAME") {
        tracing::info!(
            "Starting AWS Lambda function: {} (version: {})",
            function_name,
            std::env::var("AWS_LAMBDA_FUNCTION_VERSION").unwrap_or_else(|_| "unknown".into())
        );
    } else {
        tracing::info!("Starting service in non-Lambda environment");
    }

    // Built once per cold start; each invocation gets a cheap clone
    let app = routes::create_router();

    run(service_fn(move |event| {
        let app = app.clone();
        async move { lambda::function_handler(app, event).await }
    }))
    .await?;

    tracing::info!("Lambda function completed");
    Ok(())
}
