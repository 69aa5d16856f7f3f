use crate::config::Config;
use crate::event_handler::HandlerDeps;
use event_handler::function_handler;
use lambda_runtime::{run, service_fn, tracing, Error};
use shared::adapters::{S3EventPublisher, SsmParameterStore};
use shared::core::RandomEventGenerator;

mod config;
mod event_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let config = Config::load()?;

    let deps = HandlerDeps {
        config,
        event_generator: RandomEventGenerator::new()?,
        event_publisher: S3EventPublisher::new(aws_sdk_s3::Client::new(&aws_config)),
        parameter_store: SsmParameterStore::new(aws_sdk_ssm::Client::new(&aws_config)),
    };

    run(service_fn(|event| function_handler(&deps, event))).await
}
