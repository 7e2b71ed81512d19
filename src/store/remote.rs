//! Backend adapter subprocess client.
//!
//! Talks JSON over stdin/stdout to an external store adapter binary
//! (e.g. `propcal-store-rest`), so any backend that speaks the protocol
//! can serve as the entity store. Adapters manage their own credentials;
//! the engine only passes collection-level queries through.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as ProcessCommand;
use tokio::time::timeout;
use tracing::debug;

use propcal_core::protocol::{Command, Request, Response};
use propcal_core::{CalendarError, CalendarResult};

use super::{Collection, EntityStore, SortSpec};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct RemoteStore {
    adapter: String,
    call_timeout: Duration,
}

impl RemoteStore {
    pub fn new(adapter_name: &str) -> Self {
        RemoteStore {
            adapter: adapter_name.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(adapter_name: &str, call_timeout: Duration) -> Self {
        RemoteStore {
            adapter: adapter_name.to_string(),
            call_timeout,
        }
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    fn binary_path(&self) -> CalendarResult<std::path::PathBuf> {
        let binary_name = format!("propcal-store-{}", self.adapter);
        which::which(&binary_name)
            .map_err(|_| CalendarError::StoreAdapterNotInstalled(binary_name))
    }

    async fn call<R: DeserializeOwned>(
        &self,
        command: Command,
        params: Value,
    ) -> CalendarResult<R> {
        timeout(self.call_timeout, self.call_inner(command, params))
            .await
            .map_err(|_| CalendarError::StoreTimeout(self.call_timeout.as_secs()))?
    }

    async fn call_inner<R: DeserializeOwned>(
        &self,
        command: Command,
        params: Value,
    ) -> CalendarResult<R> {
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| CalendarError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(adapter = %self.adapter, ?command, "store adapter call");

        let mut child = ProcessCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| {
                CalendarError::Store(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        // Write request to stdin (unwrap safe: we piped stdin above)
        let mut stdin = child.stdin.take().unwrap();
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(CalendarError::Store(format!(
                "Adapter exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.is_empty() {
            return Err(CalendarError::Store("Adapter returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| CalendarError::Store(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(CalendarError::Store(error)),
        }
    }
}

#[async_trait]
impl EntityStore for RemoteStore {
    async fn list(
        &self,
        collection: Collection,
        filter: &Map<String, Value>,
        sort: Option<&SortSpec>,
        limit: Option<usize>,
    ) -> CalendarResult<Vec<Value>> {
        let params = json!({
            "collection": collection.name(),
            "filter": filter,
            "sort": sort,
            "limit": limit,
        });
        self.call(Command::List, params).await
    }

    async fn create(&self, collection: Collection, record: Value) -> CalendarResult<Value> {
        let params = json!({
            "collection": collection.name(),
            "record": record,
        });
        self.call(Command::Create, params).await
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> CalendarResult<Value> {
        let params = json!({
            "collection": collection.name(),
            "id": id,
            "patch": patch,
        });
        self.call(Command::Update, params).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> CalendarResult<()> {
        let params = json!({
            "collection": collection.name(),
            "id": id,
        });
        self.call(Command::Delete, params).await
    }
}
