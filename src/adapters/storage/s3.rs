use crate::adapters::storage::StoredDocument;
use crate::core::{Incubator, IncubatorId, IncubatorStore, Precondition, Version, Versioned};
use crate::utils::error::{IncubatorError, Result};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

/// One `<prefix>/<id>.json` object per incubator. The object ETag is the
/// version and conditional writes go through `If-Match` / `If-None-Match`.
#[derive(Debug, Clone)]
pub struct S3IncubatorStore {
    client: S3Client,
    bucket: String,
    prefix: String,
}

impl S3IncubatorStore {
    pub fn new(client: S3Client, bucket: String, prefix: String) -> Self {
        Self {
            client,
            bucket,
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    fn object_key(&self, id: &IncubatorId) -> String {
        if self.prefix.is_empty() {
            format!("{}.json", id.as_str())
        } else {
            format!("{}/{}.json", self.prefix, id.as_str())
        }
    }
}

impl IncubatorStore for S3IncubatorStore {
    async fn load(&self, id: &IncubatorId) -> Result<Option<Versioned<Incubator>>> {
        let key = self.object_key(id);
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                return match err.into_service_error() {
                    GetObjectError::NoSuchKey(_) => Ok(None),
                    err => Err(IncubatorError::StorageError {
                        message: format!("Failed to read s3://{}/{}: {}", self.bucket, key, err),
                    }),
                };
            }
        };

        let etag = resp
            .e_tag()
            .map(str::to_owned)
            .ok_or_else(|| IncubatorError::StorageError {
                message: format!("s3://{}/{} has no ETag", self.bucket, key),
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| IncubatorError::StorageError {
                message: format!("Failed to collect S3 data: {}", e),
            })?
            .into_bytes();

        let document: StoredDocument =
            serde_json::from_slice(&data).map_err(|e| IncubatorError::StorageError {
                message: format!(
                    "Corrupted incubator document s3://{}/{}: {}",
                    self.bucket, key, e
                ),
            })?;

        Ok(Some(Versioned {
            value: document.incubator,
            version: Version::new(etag),
        }))
    }

    async fn save(
        &self,
        id: &IncubatorId,
        incubator: &Incubator,
        precondition: Precondition,
    ) -> Result<Version> {
        let key = self.object_key(id);
        // ETag 才是 CAS 的依據，revision 只記錄 port run 次數
        let document = StoredDocument::new(incubator.runs(), incubator.clone());
        let data = serde_json::to_vec_pretty(&document)?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/json")
            .body(ByteStream::from(data));

        request = match &precondition {
            Precondition::Any => request,
            Precondition::Absent => request.if_none_match("*"),
            Precondition::Matches(version) => request.if_match(version.as_str()),
        };

        let output = request.send().await.map_err(|err| {
            match err.code() {
                Some("PreconditionFailed") | Some("ConditionalRequestConflict") => {
                    IncubatorError::StoreConflict { id: id.to_string() }
                }
                // If-Match 對不存在的物件回 NoSuchKey
                Some("NoSuchKey") if matches!(precondition, Precondition::Matches(_)) => {
                    IncubatorError::StoreConflict { id: id.to_string() }
                }
                _ => IncubatorError::StorageError {
                    message: format!("Failed to write s3://{}/{}: {}", self.bucket, key, err),
                },
            }
        })?;

        let etag = output
            .e_tag()
            .ok_or_else(|| IncubatorError::StorageError {
                message: format!("S3 did not return an ETag for s3://{}/{}", self.bucket, key),
            })?;

        tracing::debug!("Wrote incubator document s3://{}/{} ({})", self.bucket, key, etag);
        Ok(Version::new(etag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    fn store(prefix: &str) -> S3IncubatorStore {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("ap-southeast-2"))
            .build();
        S3IncubatorStore::new(
            S3Client::from_conf(config),
            "incubators".to_string(),
            prefix.to_string(),
        )
    }

    #[test]
    fn test_object_key_layout() {
        let id = IncubatorId::new("barn").unwrap();
        assert_eq!(store("state/").object_key(&id), "state/barn.json");
        assert_eq!(store("").object_key(&id), "barn.json");
    }
}
