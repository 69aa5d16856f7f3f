use crate::core::{ClickstreamEvent, Error, EventPublisher, ParameterStore};
use async_trait::async_trait;
use aws_sdk_s3::{operation::put_object::PutObjectError, primitives::ByteStream};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("cannot serialize event {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write {key} to bucket {bucket}: {source}")]
    PutObject {
        bucket: String,
        key: String,
        #[source]
        source: PutObjectError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ParameterStoreError {
    #[error("cannot read parameter {name}: {source}")]
    GetParameter {
        name: String,
        #[source]
        source: GetParameterError,
    },
    #[error("parameter {0} has no value")]
    MissingValue(String),
}

#[derive(Debug)]
pub struct S3EventPublisher {
    s3_client: aws_sdk_s3::Client,
}

impl S3EventPublisher {
    pub fn new(s3_client: aws_sdk_s3::Client) -> Self {
        Self { s3_client }
    }
}

#[async_trait]
impl EventPublisher for S3EventPublisher {
    #[tracing::instrument(skip(self, event), fields(key = tracing::field::Empty))]
    async fn publish_event(
        &self,
        bucket_name: &str,
        event: &ClickstreamEvent,
    ) -> Result<String, Error> {
        let key = event.object_key();
        tracing::Span::current().record("key", key.as_str());

        let body = serde_json::to_vec(event).map_err(|source| PublishError::Serialization {
            key: key.clone(),
            source,
        })?;

        let result = self
            .s3_client
            .put_object()
            .bucket(bucket_name)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Event uploaded to S3: {}", key);
                Ok(key)
            }
            Err(e) => {
                let err = PublishError::PutObject {
                    bucket: bucket_name.to_string(),
                    key,
                    source: e.into_service_error(),
                };
                tracing::error!("Error uploading event: {}", err);
                Err(Box::new(err))
            }
        }
    }
}

#[derive(Debug)]
pub struct SsmParameterStore {
    ssm_client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(ssm_client: aws_sdk_ssm::Client) -> Self {
        Self { ssm_client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    #[tracing::instrument(skip(self))]
    async fn get_parameter(&self, name: &str) -> Result<String, Error> {
        let output = self
            .ssm_client
            .get_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| ParameterStoreError::GetParameter {
                name: name.to_string(),
                source: e.into_service_error(),
            })?;

        output
            .parameter
            .and_then(|parameter| parameter.value)
            .ok_or_else(|| ParameterStoreError::MissingValue(name.to_string()).into())
    }
}
