use std::collections::HashSet;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crawlboard_core::RecordId;
use engine_logging::{engine_debug, engine_info};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::bulk::{bulk_delete, bulk_reanalyze, DEFAULT_BULK_DELETE_DELAY};
use crate::client::{ApiSettings, CrawlApi, ReqwestApi};
use crate::gateway::{run_mutation, Mutation};
use crate::poller::{run_poller, watch_record, DEFAULT_POLL_INTERVAL};
use crate::sink::{ChannelEventSink, EventSink};
use crate::{ApiError, EngineEvent};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub api: ApiSettings,
    pub poll_interval: Duration,
    pub bulk_delete_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            bulk_delete_delay: DEFAULT_BULK_DELETE_DELAY,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("invalid backend settings: {0}")]
    Api(#[from] ApiError),
}

enum EngineCommand {
    Mutate(Mutation),
    BulkDelete(Vec<RecordId>),
    BulkReanalyze(Vec<RecordId>),
    Watch(RecordId),
    LoadDetails(RecordId),
}

/// Receiving side of the engine's event stream.
pub struct EngineEvents {
    rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Owns the background runtime: the main poller, watch pollers and every
/// in-flight call. Dropping the handle stops all of them.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    cancel: CancellationToken,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    /// Start against the real backend. The main poller begins immediately.
    pub fn start(settings: EngineSettings) -> Result<(Self, EngineEvents), EngineError> {
        let api: Arc<dyn CrawlApi> = Arc::new(ReqwestApi::new(settings.api.clone())?);
        Self::start_with_api(settings, api)
    }

    pub fn start_with_api(
        settings: EngineSettings,
        api: Arc<dyn CrawlApi>,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
        let cancel = CancellationToken::new();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let worker = Worker {
            api,
            sink,
            settings,
            cancel: cancel.clone(),
            watching: Arc::new(Mutex::new(HashSet::new())),
        };
        let handle = thread::spawn(move || {
            worker.spawn_poller(&runtime);
            while let Ok(command) = cmd_rx.recv() {
                worker.dispatch(&runtime, command);
            }
            worker.cancel.cancel();
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
            engine_info!("Engine stopped");
        });

        Ok((
            Self {
                cmd_tx: Some(cmd_tx),
                cancel,
                worker: Some(handle),
            },
            EngineEvents { rx: event_rx },
        ))
    }

    pub fn mutate(&self, mutation: Mutation) {
        self.send(EngineCommand::Mutate(mutation));
    }

    pub fn bulk_delete(&self, ids: Vec<RecordId>) {
        self.send(EngineCommand::BulkDelete(ids));
    }

    pub fn bulk_reanalyze(&self, ids: Vec<RecordId>) {
        self.send(EngineCommand::BulkReanalyze(ids));
    }

    pub fn watch(&self, id: RecordId) {
        self.send(EngineCommand::Watch(id));
    }

    pub fn load_details(&self, id: RecordId) {
        self.send(EngineCommand::LoadDetails(id));
    }

    /// Cancel every poller and wait for the runtime to wind down.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn send(&self, command: EngineCommand) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(command);
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    api: Arc<dyn CrawlApi>,
    sink: Arc<dyn EventSink>,
    settings: EngineSettings,
    cancel: CancellationToken,
    watching: Arc<Mutex<HashSet<RecordId>>>,
}

impl Worker {
    fn spawn_poller(&self, runtime: &tokio::runtime::Runtime) {
        let api = self.api.clone();
        let sink = self.sink.clone();
        let cancel = self.cancel.clone();
        let period = self.settings.poll_interval;
        runtime.spawn(async move {
            run_poller(api.as_ref(), period, sink.as_ref(), &cancel).await;
        });
    }

    fn dispatch(&self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        let api = self.api.clone();
        let sink = self.sink.clone();
        match command {
            EngineCommand::Mutate(mutation) => {
                runtime.spawn(async move {
                    run_mutation(api.as_ref(), mutation, sink.as_ref()).await;
                });
            }
            EngineCommand::BulkDelete(ids) => {
                let delay = self.settings.bulk_delete_delay;
                runtime.spawn(async move {
                    bulk_delete(api.as_ref(), ids, delay, sink.as_ref()).await;
                });
            }
            EngineCommand::BulkReanalyze(ids) => {
                let _guard = runtime.enter();
                drop(bulk_reanalyze(api, ids, sink));
            }
            EngineCommand::Watch(id) => {
                let cancel = self.cancel.child_token();
                let watching = self.watching.clone();
                let period = self.settings.poll_interval;
                runtime.spawn(async move {
                    if !watching.lock().await.insert(id.clone()) {
                        engine_debug!("Already watching id={}", id);
                        return;
                    }
                    watch_record(api.as_ref(), &id, period, sink.as_ref(), &cancel).await;
                    watching.lock().await.remove(&id);
                });
            }
            EngineCommand::LoadDetails(id) => {
                runtime.spawn(async move {
                    let event = match api.get_record(&id).await {
                        Ok(record) => EngineEvent::DetailsLoaded(record),
                        Err(error) => EngineEvent::DetailsFailed { id, error },
                    };
                    sink.emit(event);
                });
            }
        }
    }
}
