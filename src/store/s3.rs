use super::{ObjectEntry, ObjectStore, PutOptions, StoreError, StoreResult};
use crate::config::AppConfig;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client as S3Client,
    config::{Builder, Credentials, Region},
    error::{DisplayErrorContext, SdkError},
    primitives::ByteStream,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::error::Error;
use tracing::{debug, info};

/// An `ObjectStore` over any S3-compatible API (AWS, Cloudflare R2, MinIO).
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    endpoint: Option<String>,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>, endpoint: Option<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            endpoint,
        }
    }

    /// Build a client from the app config.
    ///
    /// Static keys are used when both halves are configured; otherwise the
    /// SDK's default credential chain applies.
    pub async fn from_config(cfg: &AppConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()));
        if let (Some(key_id), Some(secret)) = (&cfg.access_key_id, &cfg.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "bucket-notes",
            ));
        }
        let base_config = loader.load().await;

        let endpoint = cfg.resolved_endpoint();
        let mut builder = Builder::from(&base_config).force_path_style(cfg.force_path_style);
        if let Some(url) = &endpoint {
            builder = builder.endpoint_url(url);
        }
        info!(
            bucket = %cfg.bucket,
            endpoint = ?endpoint,
            "configured S3 client"
        );

        Self::new(S3Client::from_conf(builder.build()), cfg.bucket.clone(), endpoint)
    }
}

fn request_error<E, R>(op: &'static str, err: SdkError<E, R>) -> StoreError
where
    E: Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::Request {
        op,
        message: DisplayErrorContext(&err).to_string(),
    }
}

fn to_chrono(ts: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self) -> StoreResult<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|err| request_error("ListObjectsV2", err))?;

            for obj in resp.contents() {
                let Some(key) = obj.key() else { continue };
                entries.push(ObjectEntry {
                    key: key.to_string(),
                    size: obj.size().unwrap_or(0),
                    last_modified: obj.last_modified().and_then(to_chrono),
                });
            }

            match (resp.is_truncated(), resp.next_continuation_token()) {
                (Some(true), Some(token)) => continuation = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(bucket = %self.bucket, count = entries.len(), "listed objects");
        Ok(entries)
    }

    async fn get_object(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(SdkError::ServiceError(service_err)) if service_err.err().is_no_such_key() => {
                return Ok(None);
            }
            Err(err) => return Err(request_error("GetObject", err)),
        };

        let data = resp.body.collect().await.map_err(|err| StoreError::Request {
            op: "GetObject",
            message: format!("reading body: {}", err),
        })?;
        Ok(Some(data.into_bytes()))
    }

    async fn put_object(&self, key: &str, body: Bytes, opts: PutOptions) -> StoreResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .set_content_type(opts.content_type)
            .set_cache_control(opts.cache_control)
            .send()
            .await
            .map_err(|err| request_error("PutObject", err))?;
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("s3:{}@{}", self.bucket, endpoint),
            None => format!("s3:{}", self.bucket),
        }
    }
}
