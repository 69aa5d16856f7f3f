use crate::config::Config;
use chrono::{SecondsFormat, Utc};
use lambda_runtime::{Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::core::{EventGenerator, EventPublisher, ParameterStore};

pub(crate) struct HandlerDeps<G: EventGenerator, P: EventPublisher, S: ParameterStore> {
    pub config: Config,
    pub event_generator: G,
    pub event_publisher: P,
    pub parameter_store: S,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GenerationSummary {
    pub message: String,
    pub bucket: String,
    pub timestamp: String,
}

// Any failure aborts the remaining writes; nothing already written is rolled back.
#[tracing::instrument(skip(deps, event), fields(request_id = %event.context.request_id))]
pub(crate) async fn function_handler<G: EventGenerator, P: EventPublisher, S: ParameterStore>(
    deps: &HandlerDeps<G, P, S>,
    event: LambdaEvent<Value>,
) -> Result<InvocationResult, Error> {
    let bucket_name = resolve_bucket_name(&deps.config, &deps.parameter_store).await?;
    tracing::info!(
        "Generating {} events into bucket {}",
        deps.config.events_per_execution,
        bucket_name
    );

    // A negative count writes nothing, like an empty range.
    let mut events_generated = 0;
    for _ in 0..deps.config.events_per_execution.max(0) {
        let event = deps.event_generator.generate_event();
        deps.event_publisher
            .publish_event(&bucket_name, &event)
            .await?;
        events_generated += 1;
    }

    let summary = GenerationSummary {
        message: format!("Successfully generated {} events", events_generated),
        bucket: bucket_name,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    };
    tracing::info!("{}", summary.message);

    Ok(InvocationResult {
        status_code: 200,
        body: serde_json::to_string(&summary)?,
    })
}

async fn resolve_bucket_name<S: ParameterStore>(
    config: &Config,
    parameter_store: &S,
) -> Result<String, Error> {
    match config.s3_bucket_name.as_deref() {
        Some(bucket_name) if !bucket_name.is_empty() => Ok(bucket_name.to_string()),
        _ => {
            tracing::info!(
                "S3_BUCKET_NAME not set, reading bucket from parameter {}",
                config.ssm_parameter
            );
            parameter_store.get_parameter(&config.ssm_parameter).await
        }
    }
}
