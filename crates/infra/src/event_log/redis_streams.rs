//! Redis Streams-backed partition appender.
//!
//! Each partition of a topic is its own stream:
//!
//! - **Stream key**: `{topic}:{partition}` (e.g. `library-events:2`)
//! - **Entry id**: `0-{offset + 1}`, so stream order and offset order agree
//! - **Fields**: `payload`, `headers` (JSON object) and `key` when the record is keyed
//!
//! The next offset is read from the stream's own last generated id inside the
//! same Lua script that runs XADD. The stream is the only state, so offsets are
//! dense, never handed out twice even with several producers, and a failed
//! append consumes nothing. One key per script keeps it cluster-safe.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{RedisError, Script};
use tracing::info;

use library_events_events::{ProducerRecord, PublishError};

use super::partitioned::LogAppender;

const APPEND_SCRIPT: &str = r#"
local offset = 0
if redis.call('EXISTS', KEYS[1]) == 1 then
  local info = redis.call('XINFO', 'STREAM', KEYS[1])
  for i = 1, #info, 2 do
    if info[i] == 'last-generated-id' then
      offset = tonumber(string.match(info[i + 1], '%-(%d+)$'))
    end
  end
end
local fields = {'payload', ARGV[4], 'headers', ARGV[3]}
if ARGV[1] == '1' then
  table.insert(fields, 'key')
  table.insert(fields, ARGV[2])
end
redis.call('XADD', KEYS[1], '0-' .. (offset + 1), unpack(fields))
return offset
"#;

#[derive(Debug, thiserror::Error)]
pub enum RedisStreamsError {
    #[error("Redis connection error: {0}")]
    Connection(String),
}

pub struct RedisStreamsAppender {
    conn: ConnectionManager,
    script: Script,
}

impl RedisStreamsAppender {
    /// Connect to Redis (e.g. "redis://localhost:6379").
    ///
    /// The connection manager reconnects on its own after the initial connect.
    pub async fn connect(redis_url: impl AsRef<str>) -> Result<Self, RedisStreamsError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RedisStreamsError::Connection(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| RedisStreamsError::Connection(e.to_string()))?;

        info!("connected to redis");

        Ok(Self {
            conn,
            script: Script::new(APPEND_SCRIPT),
        })
    }
}

pub fn stream_key(topic: &str, partition: u32) -> String {
    format!("{topic}:{partition}")
}

#[async_trait]
impl LogAppender for RedisStreamsAppender {
    async fn append(&self, record: &ProducerRecord, partition: u32) -> Result<u64, PublishError> {
        let headers = serde_json::to_string(record.headers())
            .map_err(|e| PublishError::Serialization(e.to_string()))?;

        let mut conn = self.conn.clone();
        let offset: u64 = self
            .script
            .key(stream_key(record.topic(), partition))
            .arg(if record.key().is_some() { "1" } else { "0" })
            .arg(record.key().unwrap_or_default())
            .arg(headers)
            .arg(record.payload())
            .invoke_async(&mut conn)
            .await
            .map_err(classify)?;

        Ok(offset)
    }
}

fn classify(err: RedisError) -> PublishError {
    if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
        PublishError::Unreachable(err.to_string())
    } else {
        PublishError::Rejected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_scoped_by_topic_and_partition() {
        assert_eq!(stream_key("library-events", 2), "library-events:2");
    }

    #[test]
    fn append_script_keeps_no_state_beside_the_stream() {
        assert!(APPEND_SCRIPT.contains("KEYS[1]"));
        assert!(!APPEND_SCRIPT.contains("KEYS[2]"));
        assert!(!APPEND_SCRIPT.contains("INCR"));
        assert!(APPEND_SCRIPT.contains("last-generated-id"));
    }

    /// Runs against a live server when `REDIS_URL` is set; otherwise a no-op.
    #[tokio::test]
    async fn offsets_follow_the_stream_even_after_trimming() {
        let Ok(url) = std::env::var("REDIS_URL") else {
            return;
        };
        let appender = RedisStreamsAppender::connect(&url).await.unwrap();
        let topic = format!("library-events-test-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap());
        let record = ProducerRecord::new(topic.clone(), Some("123".to_string()), b"{}".to_vec());

        assert_eq!(appender.append(&record, 0).await.unwrap(), 0);
        assert_eq!(appender.append(&record, 0).await.unwrap(), 1);

        let mut conn = appender.conn.clone();
        let key = stream_key(&topic, 0);
        let _: () = redis::cmd("XTRIM")
            .arg(&key)
            .arg("MAXLEN")
            .arg(0)
            .query_async(&mut conn)
            .await
            .unwrap();

        assert_eq!(appender.append(&record, 0).await.unwrap(), 2);

        let _: () = redis::cmd("DEL").arg(&key).query_async(&mut conn).await.unwrap();
    }

    #[test]
    fn server_errors_are_rejections() {
        let err = RedisError::from((redis::ErrorKind::ResponseError, "ERR", "bad".to_string()));
        assert!(matches!(classify(err), PublishError::Rejected(_)));
    }

    #[test]
    fn io_errors_mean_unreachable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(classify(RedisError::from(io)), PublishError::Unreachable(_)));
    }
}
