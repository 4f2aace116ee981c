#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crawlboard_core::{Record, RecordId, Status};
use crawlboard_engine::{ApiError, CrawlApi, EngineEvent, EventSink, FailureKind};
use tokio::time::Instant;

#[derive(Default)]
pub struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub op: &'static str,
    pub id: Option<RecordId>,
    pub started: Instant,
    pub finished: Instant,
}

/// In-memory backend with scripted list responses and call timing.
pub struct FakeApi {
    records: Mutex<Vec<Record>>,
    list_script: Mutex<VecDeque<Result<Vec<Record>, ApiError>>>,
    failing: Mutex<HashSet<RecordId>>,
    calls: Mutex<Vec<Call>>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn new(records: Vec<Record>) -> Self {
        Self::with_latency(records, Duration::ZERO)
    }

    pub fn with_latency(records: Vec<Record>, latency: Duration) -> Self {
        Self {
            records: Mutex::new(records),
            list_script: Mutex::new(VecDeque::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            latency,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Queue a response for the next `list_records` call.
    pub fn script_list(&self, response: Result<Vec<Record>, ApiError>) {
        self.list_script.lock().unwrap().push_back(response);
    }

    pub fn fail_for(&self, id: &str) {
        self.failing.lock().unwrap().insert(RecordId::from(id));
    }

    pub fn set_records(&self, records: Vec<Record>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, op: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, op: &'static str, id: Option<&RecordId>) -> Result<(), ApiError> {
        let started = Instant::now();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(Call {
            op,
            id: id.cloned(),
            started,
            finished: Instant::now(),
        });
        match id {
            Some(id) if self.failing.lock().unwrap().contains(id) => Err(ApiError::new(
                FailureKind::HttpStatus(500),
                format!("{op} failed for {id}"),
            )),
            _ => Ok(()),
        }
    }

    fn find(&self, id: &RecordId) -> Result<Record, ApiError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| ApiError::new(FailureKind::HttpStatus(404), "not found"))
    }

    fn set_status(&self, id: &RecordId, status: Status) -> Result<Record, ApiError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ApiError::new(FailureKind::HttpStatus(404), "not found"))?;
        record.status = status;
        Ok(record.clone())
    }
}

#[async_trait::async_trait]
impl CrawlApi for FakeApi {
    async fn list_records(&self) -> Result<Vec<Record>, ApiError> {
        self.enter("list", None).await?;
        let scripted = self.list_script.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None => Ok(self.records.lock().unwrap().clone()),
        }
    }

    async fn get_record(&self, id: &RecordId) -> Result<Record, ApiError> {
        self.enter("get", Some(id)).await?;
        self.find(id)
    }

    async fn create_record(&self, url: &str) -> Result<Record, ApiError> {
        self.enter("create", None).await?;
        let mut records = self.records.lock().unwrap();
        let record = Record::queued(format!("id-{}", records.len() + 1), url);
        records.push(record.clone());
        Ok(record)
    }

    async fn reanalyze_record(&self, id: &RecordId) -> Result<Record, ApiError> {
        self.enter("reanalyze", Some(id)).await?;
        self.set_status(id, Status::Queued)
    }

    async fn stop_record(&self, id: &RecordId) -> Result<Record, ApiError> {
        self.enter("stop", Some(id)).await?;
        self.set_status(id, Status::Stopped)
    }

    async fn delete_record(&self, id: &RecordId) -> Result<(), ApiError> {
        self.enter("delete", Some(id)).await?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            return Err(ApiError::new(FailureKind::HttpStatus(404), "not found"));
        }
        Ok(())
    }
}

pub fn record(id: &str, status: Status) -> Record {
    let mut record = Record::queued(id, format!("https://{id}.example"));
    record.status = status;
    record
}
