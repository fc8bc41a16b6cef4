//! Async task management for non-blocking API operations.
//!
//! This module executes label service calls in background tasks while the UI
//! stays responsive. It uses tokio channels to communicate results back to
//! the main event loop.
//!
//! # Architecture
//!
//! 1. The main loop decides an operation is needed (connect, fetch catalog,
//!    create a label)
//! 2. Instead of awaiting inline, it spawns a background task via
//!    `TaskSpawner`
//! 3. The main loop continues rendering and handling events
//! 4. When the task completes, it sends an `ApiMessage` through the channel
//! 5. The main loop polls the channel with `try_recv()` and handles results

use std::collections::BTreeMap;

use tokio::sync::mpsc;

use crate::api::types::Label;
use crate::api::{ApiError, LabelsClient};

/// Messages sent from background tasks to the main event loop.
///
/// Each variant represents the result of an async operation. The main loop
/// matches on these to update application state appropriately.
#[derive(Debug)]
pub enum ApiMessage {
    /// Initial client connection result.
    ClientConnected(Result<LabelsClient, ApiError>),

    /// The full label catalog was fetched.
    CatalogFetched(Result<Vec<Label>, ApiError>),

    /// A label creation request finished.
    ///
    /// `name` is the requested label name, kept so a failure can be reported
    /// even though the created record never arrived.
    LabelCreated {
        name: String,
        result: Result<Label, ApiError>,
    },
}

/// Spawns background tasks for async operations.
///
/// Holds a channel sender and provides methods to spawn the label service
/// operations. Each method clones the necessary data and spawns a tokio task
/// that sends its result through the channel.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Spawn a task to connect to the label service.
    pub fn spawn_connect(&self, base_url: String, org_id: Option<String>) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = LabelsClient::connect(&base_url, org_id).await;
            let _ = tx.send(ApiMessage::ClientConnected(result));
        });
    }

    /// Spawn a task to fetch the label catalog.
    pub fn spawn_fetch_catalog(&self, client: &LabelsClient) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.get_labels().await;
            let _ = tx.send(ApiMessage::CatalogFetched(result));
        });
    }

    /// Spawn a task to create a new label.
    pub fn spawn_create_label(
        &self,
        client: &LabelsClient,
        name: String,
        properties: BTreeMap<String, String>,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.create_label(&name, properties).await;
            let _ = tx.send(ApiMessage::LabelCreated { name, result });
        });
    }
}

/// Create a new task channel and spawner.
///
/// Returns a tuple of (receiver, spawner). The receiver should be polled in
/// the main event loop, and the spawner should be used to spawn tasks.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawned_create_result_arrives_on_channel() {
        // No client needed to verify channel plumbing: send directly.
        let (mut rx, spawner) = create_task_channel();
        let tx_clone = spawner.clone();
        drop(tx_clone);

        spawner
            .tx
            .send(ApiMessage::LabelCreated {
                name: "infra".to_string(),
                result: Ok(Label::new("1", "infra")),
            })
            .unwrap();

        match rx.try_recv().unwrap() {
            ApiMessage::LabelCreated { name, result } => {
                assert_eq!(name, "infra");
                assert_eq!(result.unwrap().name, "infra");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
