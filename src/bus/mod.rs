use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub mod message;
pub mod outbound;
pub mod session_store;
pub mod subscription;

pub use message::{
    parse_pull_request_list, PoppitCommand, PullRequest, PullRequestAuthor, SlackLinerMessage,
};
pub use outbound::{CommandEmitter, NotificationEmitter, RedisEmitter};
pub use session_store::{
    session_key, DialogSession, MemorySessionStore, RedisSessionStore, SessionStore,
    SESSION_KEY_PREFIX, SESSION_TTL,
};
pub use subscription::{pump_channel, SUBSCRIPTION_POLL_INTERVAL};

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("redis connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: redis::RedisError,
    },
    #[error("redis command `{command}` failed: {source}")]
    Command {
        command: &'static str,
        #[source]
        source: redis::RedisError,
    },
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("bus connection lock poisoned")]
    Poisoned,
}

fn redis_url(addr: &str, password: Option<&str>) -> String {
    let auth = password
        .filter(|v| !v.is_empty())
        .map(|v| format!(":{}@", urlencoding::encode(v)))
        .unwrap_or_default();
    format!("redis://{auth}{}/0", addr.trim())
}

/// Handle on the Redis deployment. Cheap to clone; opens connections on demand.
#[derive(Debug, Clone)]
pub struct RedisBus {
    client: redis::Client,
    addr: String,
}

impl RedisBus {
    pub fn open(addr: &str, password: Option<&str>) -> Result<Self, BusError> {
        let client =
            redis::Client::open(redis_url(addr, password)).map_err(|source| BusError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            addr: addr.to_string(),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub(crate) fn raw_connection(&self) -> Result<redis::Connection, BusError> {
        self.client
            .get_connection()
            .map_err(|source| BusError::Connect {
                addr: self.addr.clone(),
                source,
            })
    }

    /// Opens a command connection for key/value and list operations.
    pub fn connect(&self) -> Result<BusConnection, BusError> {
        Ok(BusConnection {
            conn: Mutex::new(self.raw_connection()?),
        })
    }

    pub fn ping(&self) -> Result<(), BusError> {
        self.connect()?.ping()
    }
}

pub struct BusConnection {
    conn: Mutex<redis::Connection>,
}

impl BusConnection {
    fn lock(&self) -> Result<MutexGuard<'_, redis::Connection>, BusError> {
        self.conn.lock().map_err(|_| BusError::Poisoned)
    }

    fn run<T: redis::FromRedisValue>(
        &self,
        command: &'static str,
        cmd: &redis::Cmd,
    ) -> Result<T, BusError> {
        let mut conn = self.lock()?;
        cmd.query(&mut *conn)
            .map_err(|source| BusError::Command { command, source })
    }

    pub fn ping(&self) -> Result<(), BusError> {
        self.run::<String>("PING", &redis::cmd("PING")).map(|_| ())
    }

    pub fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), BusError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("EX").arg(ttl.as_secs().max(1));
        self.run::<()>("SET", &cmd)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, BusError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.run("GET", &cmd)
    }

    /// Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) -> Result<(), BusError> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        self.run::<i64>("DEL", &cmd).map(|_| ())
    }

    pub fn push(&self, list: &str, value: &str) -> Result<(), BusError> {
        let mut cmd = redis::cmd("RPUSH");
        cmd.arg(list).arg(value);
        self.run::<i64>("RPUSH", &cmd).map(|_| ())
    }
}
