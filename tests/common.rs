//! Shared helpers for integration tests (sessions, sample data, and a
//! recording engine that captures every loader/saver call).

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use polars::prelude::df;
use sparkless_io::{Dataset, Engine, EngineError, IoSession, ObjectStoreConfig, Options, WriteMode};

/// Create an IoSession with a descriptive app name for tests.
pub fn session() -> IoSession {
    IoSession::builder()
        .app_name("sparkless_io_tests")
        .get_or_create()
}

/// Convenience helper for a small (id, age, name, active) test dataset.
pub fn small_people() -> Dataset {
    let pl = df![
        "id" => &[1i64, 2i64, 3i64],
        "age" => &[25i64, 30i64, 35i64],
        "name" => &["Alice", "Bob", "Carol"],
        "active" => &[true, false, true],
    ]
    .unwrap();
    Dataset::from_polars(pl)
}

pub fn options(pairs: &[(&str, &str)]) -> Options {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Dataset handle produced by [`RecordingEngine`]: just an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeDataset(pub u32);

/// One engine call, with everything the dispatcher passed in.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LoadJson {
        path: String,
        options: Options,
        store: Option<ObjectStoreConfig>,
    },
    LoadJdbc {
        options: Options,
    },
    SaveJson {
        dataset: FakeDataset,
        path: String,
        options: Options,
        mode: WriteMode,
        store: Option<ObjectStoreConfig>,
    },
    SaveJdbc {
        dataset: FakeDataset,
        options: Options,
        mode: WriteMode,
    },
}

/// Engine double that records calls and hands out numbered datasets.
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU32,
    fail_with: Mutex<Option<EngineError>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent call fails with `err` (after being recorded).
    pub fn failing(err: EngineError) -> Self {
        let engine = Self::default();
        *engine.fail_with.lock().unwrap() = Some(err);
        engine
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_dataset(&self) -> FakeDataset {
        FakeDataset(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl Engine for RecordingEngine {
    type Dataset = FakeDataset;

    fn load_json(
        &self,
        path: &str,
        options: &Options,
        store: Option<&ObjectStoreConfig>,
    ) -> Result<FakeDataset, EngineError> {
        self.record(Call::LoadJson {
            path: path.to_string(),
            options: options.clone(),
            store: store.cloned(),
        })?;
        Ok(self.next_dataset())
    }

    fn load_jdbc(&self, options: &Options) -> Result<FakeDataset, EngineError> {
        self.record(Call::LoadJdbc {
            options: options.clone(),
        })?;
        Ok(self.next_dataset())
    }

    fn save_json(
        &self,
        dataset: &FakeDataset,
        path: &str,
        options: &Options,
        mode: WriteMode,
        store: Option<&ObjectStoreConfig>,
    ) -> Result<(), EngineError> {
        self.record(Call::SaveJson {
            dataset: *dataset,
            path: path.to_string(),
            options: options.clone(),
            mode,
            store: store.cloned(),
        })
    }

    fn save_jdbc(
        &self,
        dataset: &FakeDataset,
        options: &Options,
        mode: WriteMode,
    ) -> Result<(), EngineError> {
        self.record(Call::SaveJdbc {
            dataset: *dataset,
            options: options.clone(),
            mode,
        })
    }
}
