//! AWS Lambda entrypoint
//!
//! Deployed as the `bootstrap` executable of a `provided.al2023` function and registered as the
//! CloudFormation macro.
use lambda_runtime::{service_fn, Error, LambdaEvent};
use mackerel_macro::config::MacroConfig;
use mackerel_macro::handler::{handle, MacroRequest, MacroResponse};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("MACKEREL_MACRO_LOG"))
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let config = MacroConfig::from_env().inspect_err(|error| {
        tracing::error!(%error, "invalid configuration, refusing to start");
    })?;
    tracing::info!(service_token = config.service_token(), "configuration loaded");

    let config = &config;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<MacroRequest>| async move {
        function_handler(config, event).await
    }))
    .await
}

async fn function_handler(
    config: &MacroConfig,
    event: LambdaEvent<MacroRequest>,
) -> Result<MacroResponse, Error> {
    let _span = tracing::info_span!("invocation", aws_request_id = %event.context.request_id).entered();
    Ok(handle(event.payload, config))
}
