//! Shared test helpers: a scripted in-memory `RemoteClient`.
//!
//! Replies are consumed in FIFO order at the moment a call is issued, so the
//! n-th call issued gets the n-th scripted reply no matter when it resolves.
//! A gated reply holds its call open until the test releases it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::remote::{AssetFile, RemoteClient, RemoteError, UploadResult, UploadTarget};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List {
        path: String,
    },
    GetById {
        path: String,
        id: String,
    },
    Create {
        path: String,
        body: Value,
    },
    UpdatePartial {
        path: String,
        id: String,
        body: Value,
    },
    Delete {
        path: String,
        id: String,
    },
    Upload {
        target: UploadTarget,
        file_name: String,
    },
}

struct Scripted {
    reply: Result<Value, RemoteError>,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
pub struct ScriptedRemote {
    calls: Mutex<Vec<Call>>,
    replies: Mutex<VecDeque<Scripted>>,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, value: Value) -> &Self {
        self.push(Ok(value), None);
        self
    }

    pub fn fail(&self, error: RemoteError) -> &Self {
        self.push(Err(error), None);
        self
    }

    /// Script a reply that resolves only once the returned sender fires.
    pub fn reply_gated(&self, value: Value) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Ok(value), Some(rx));
        tx
    }

    pub fn fail_gated(&self, error: RemoteError) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Err(error), Some(rx));
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    /// Yield until at least `n` calls have been issued.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, reply: Result<Value, RemoteError>, gate: Option<oneshot::Receiver<()>>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Scripted { reply, gate });
    }

    async fn respond(&self, call: Call) -> Result<Value, RemoteError> {
        let scripted = {
            self.calls.lock().unwrap().push(call.clone());
            self.replies.lock().unwrap().pop_front()
        };
        let Some(scripted) = scripted else {
            return Err(RemoteError::Transport(format!("no scripted reply for {call:?}")));
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.reply
    }
}

pub fn server_error(status: u16, message: Option<&str>) -> RemoteError {
    RemoteError::Server {
        status,
        message: message.map(str::to_string),
    }
}

pub fn image() -> AssetFile {
    AssetFile::new("cover.png", "image/png", &b"\x89PNG"[..])
}

#[async_trait]
impl RemoteClient for ScriptedRemote {
    async fn list(&self, path: &str) -> Result<Vec<Value>, RemoteError> {
        let value = self
            .respond(Call::List {
                path: path.to_string(),
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn get_by_id(&self, path: &str, id: &str) -> Result<Value, RemoteError> {
        self.respond(Call::GetById {
            path: path.to_string(),
            id: id.to_string(),
        })
        .await
    }

    async fn create(&self, path: &str, body: Value) -> Result<Value, RemoteError> {
        self.respond(Call::Create {
            path: path.to_string(),
            body,
        })
        .await
    }

    async fn update_partial(
        &self,
        path: &str,
        id: &str,
        body: Value,
    ) -> Result<Value, RemoteError> {
        self.respond(Call::UpdatePartial {
            path: path.to_string(),
            id: id.to_string(),
            body,
        })
        .await
    }

    async fn delete(&self, path: &str, id: &str) -> Result<(), RemoteError> {
        self.respond(Call::Delete {
            path: path.to_string(),
            id: id.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        target: &UploadTarget,
        file: AssetFile,
    ) -> Result<UploadResult, RemoteError> {
        let value = self
            .respond(Call::Upload {
                target: target.clone(),
                file_name: file.file_name,
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
