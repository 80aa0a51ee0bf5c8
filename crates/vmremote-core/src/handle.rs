//! Async handle to a remote running on its own thread
//!
//! The [`Remote`] is moved onto a dedicated worker thread that executes
//! commands one at a time, so native calls stay serialized no matter how
//! many tasks hold a [`RemoteHandle`]. Setters await the settle window on
//! the caller's task instead of blocking the worker.

use crate::config::SettleStrategy;
use crate::devices::DeviceDirectory;
use crate::error::{RemoteError, Result};
use crate::path::ParameterAddress;
use crate::poller::Subscription;
use crate::remote::Remote;
use crate::state::{ConnectionState, EngineKind, EngineVersion, LevelType};
use crate::value::{assignment, ParameterValue, Value};
use tokio::sync::{mpsc, oneshot};

type BoxedListener = Box<dyn Fn() + Send + Sync>;

/// Commands sent to the worker thread
enum RemoteCommand {
    Connect {
        reply: oneshot::Sender<Result<()>>,
    },
    Disconnect {
        reply: oneshot::Sender<Result<()>>,
    },
    RefreshDevices {
        reply: oneshot::Sender<Result<DeviceDirectory>>,
    },
    IsDirty {
        reply: oneshot::Sender<Result<bool>>,
    },
    Get {
        address: ParameterAddress,
        reply: oneshot::Sender<Result<Value>>,
    },
    Issue {
        script: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Level {
        level_type: LevelType,
        channel: usize,
        reply: oneshot::Sender<Result<f32>>,
    },
    OnChange {
        listener: BoxedListener,
        reply: oneshot::Sender<Subscription>,
    },
    Status {
        reply: oneshot::Sender<RemoteStatus>,
    },
}

/// Remote status snapshot (safe to send between threads)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatus {
    pub state: ConnectionState,
    pub kind: Option<EngineKind>,
    pub version: Option<EngineVersion>,
    pub listeners: usize,
}

/// Handle to communicate with the remote worker
#[derive(Clone)]
pub struct RemoteHandle {
    tx: mpsc::Sender<RemoteCommand>,
    settle: SettleStrategy,
}

impl RemoteHandle {
    /// Move `remote` onto a worker thread and return a handle
    ///
    /// The worker exits, dropping (and logging out) the remote, once every
    /// handle is gone.
    pub fn spawn(remote: Remote) -> Self {
        let (tx, mut rx) = mpsc::channel::<RemoteCommand>(32);
        let settle = remote.settle_strategy();

        std::thread::Builder::new()
            .name("vmremote-worker".to_string())
            .spawn(move || {
                while let Some(cmd) = rx.blocking_recv() {
                    match cmd {
                        RemoteCommand::Connect { reply } => {
                            let _ = reply.send(remote.connect());
                        }
                        RemoteCommand::Disconnect { reply } => {
                            let _ = reply.send(remote.disconnect());
                        }
                        RemoteCommand::RefreshDevices { reply } => {
                            let _ = reply.send(remote.refresh_devices());
                        }
                        RemoteCommand::IsDirty { reply } => {
                            let _ = reply.send(remote.is_parameters_dirty());
                        }
                        RemoteCommand::Get { address, reply } => {
                            let _ = reply.send(remote.get(&address));
                        }
                        RemoteCommand::Issue { script, reply } => {
                            let _ = reply.send(remote.issue_script(&script));
                        }
                        RemoteCommand::Level {
                            level_type,
                            channel,
                            reply,
                        } => {
                            let _ = reply.send(remote.level(level_type, channel));
                        }
                        RemoteCommand::OnChange { listener, reply } => {
                            let _ = reply.send(remote.on_change(listener));
                        }
                        RemoteCommand::Status { reply } => {
                            let _ = reply.send(RemoteStatus {
                                state: remote.state(),
                                kind: remote.engine_kind(),
                                version: remote.version(),
                                listeners: remote.listener_count(),
                            });
                        }
                    }
                }
                tracing::debug!("Remote worker exiting");
            })
            .map_err(|e| tracing::error!(error = %e, "Failed to spawn remote worker"))
            .ok();

        Self { tx, settle }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RemoteCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| RemoteError::HandleClosed)?;
        rx.await.map_err(|_| RemoteError::HandleClosed)
    }

    pub async fn connect(&self) -> Result<()> {
        self.request(|reply| RemoteCommand::Connect { reply }).await?
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.request(|reply| RemoteCommand::Disconnect { reply })
            .await?
    }

    pub async fn refresh_devices(&self) -> Result<DeviceDirectory> {
        self.request(|reply| RemoteCommand::RefreshDevices { reply })
            .await?
    }

    pub async fn is_parameters_dirty(&self) -> Result<bool> {
        self.request(|reply| RemoteCommand::IsDirty { reply }).await?
    }

    pub async fn get(&self, address: ParameterAddress) -> Result<Value> {
        self.request(|reply| RemoteCommand::Get { address, reply })
            .await?
    }

    /// Write one parameter and await the settle window
    pub async fn set(
        &self,
        address: ParameterAddress,
        value: impl Into<ParameterValue>,
    ) -> Result<()> {
        let script = assignment(&address.path(), &value.into());
        self.set_raw(script).await
    }

    /// Issue a raw script and await the settle window
    pub async fn set_raw(&self, script: impl Into<String>) -> Result<()> {
        let script = script.into();
        self.request(|reply| RemoteCommand::Issue { script, reply })
            .await??;
        let delay = self.settle.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    pub async fn level(&self, level_type: LevelType, channel: usize) -> Result<f32> {
        self.request(|reply| RemoteCommand::Level {
            level_type,
            channel,
            reply,
        })
        .await?
    }

    /// Register a change listener on the worker's remote
    pub async fn on_change<F>(&self, listener: F) -> Result<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let listener: BoxedListener = Box::new(listener);
        self.request(|reply| RemoteCommand::OnChange { listener, reply })
            .await
    }

    /// Change notifications as a channel, one message per dirty tick
    pub async fn changes(&self) -> Result<(Subscription, mpsc::UnboundedReceiver<()>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self
            .on_change(move || {
                let _ = tx.send(());
            })
            .await?;
        Ok((subscription, rx))
    }

    pub async fn status(&self) -> Result<RemoteStatus> {
        self.request(|reply| RemoteCommand::Status { reply }).await
    }
}
