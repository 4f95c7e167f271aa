use redis::AsyncCommands;
use uuid::Uuid;

use crate::models::job::{JobState, StoredJob};

const RESULT_KEY_PREFIX: &str = "ocr_pipeline:results:";

/// Guarded Started write. Refuses to overwrite a terminal record so a stale
/// redelivery can never regress a job out of success/failure.
const MARK_STARTED_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if current then
  local state = cjson.decode(current)['state']
  if state == 'success' or state == 'failure' then
    return 0
  end
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
return 1
"#;

/// Expiring key-value store holding job state and output, the single source
/// of truth for status queries. Every write refreshes the TTL.
pub struct ResultStore {
    client: redis::Client,
    ttl_secs: u64,
    mark_started: redis::Script,
}

impl ResultStore {
    pub fn new(redis_url: &str, ttl_secs: u64) -> Result<Self, ResultStoreError> {
        let client = redis::Client::open(redis_url).map_err(ResultStoreError::Redis)?;
        Ok(Self {
            client,
            ttl_secs,
            mark_started: redis::Script::new(MARK_STARTED_SCRIPT),
        })
    }

    fn key(job_id: Uuid) -> String {
        format!("{RESULT_KEY_PREFIX}{job_id}")
    }

    /// Create the Pending record at submission time. `NX` keeps whatever a
    /// faster worker may already have written for this job.
    pub async fn init_pending(&self, job_id: Uuid) -> Result<(), ResultStoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(ResultStoreError::Redis)?;
        let record = StoredJob {
            state: JobState::Pending,
            result: None,
        };
        let payload = serde_json::to_string(&record).map_err(ResultStoreError::Serialize)?;
        let _: Option<String> = redis::cmd("SET")
            .arg(Self::key(job_id))
            .arg(payload)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(ResultStoreError::Redis)?;
        Ok(())
    }

    /// Advance a claimed job to Started. Returns `false` when the record was
    /// already terminal and the write was skipped.
    pub async fn mark_started(&self, job_id: Uuid) -> Result<bool, ResultStoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(ResultStoreError::Redis)?;
        let record = StoredJob {
            state: JobState::Started,
            result: None,
        };
        let payload = serde_json::to_string(&record).map_err(ResultStoreError::Serialize)?;
        let updated: i64 = self
            .mark_started
            .key(Self::key(job_id))
            .arg(payload)
            .arg(self.ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(ResultStoreError::Redis)?;
        Ok(updated == 1)
    }

    /// Write a terminal record. Unconditional: the last completed write for a
    /// job is authoritative under at-least-once redelivery.
    pub async fn finish(
        &self,
        job_id: Uuid,
        state: JobState,
        result: serde_json::Value,
    ) -> Result<(), ResultStoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(ResultStoreError::Redis)?;
        let record = StoredJob {
            state,
            result: Some(result),
        };
        let payload = serde_json::to_string(&record).map_err(ResultStoreError::Serialize)?;
        conn.set_ex::<_, _, ()>(Self::key(job_id), payload, self.ttl_secs)
            .await
            .map_err(ResultStoreError::Redis)?;
        Ok(())
    }

    /// Read a job record. `None` means never submitted or expired, which the
    /// status API reports as not-found rather than Pending.
    pub async fn fetch(&self, job_id: Uuid) -> Result<Option<StoredJob>, ResultStoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(ResultStoreError::Redis)?;
        let payload: Option<String> = conn
            .get(Self::key(job_id))
            .await
            .map_err(ResultStoreError::Redis)?;

        match payload {
            Some(raw) => {
                let record: StoredJob =
                    serde_json::from_str(&raw).map_err(ResultStoreError::Serialize)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResultStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
