use anyhow::Result;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    input::PositionSink,
    metrics::{Accumulator, ActivityRecord},
    storage::CsvStore,
};

/// Shared between the input thread and the flush loop. Every access to the
/// accumulator goes through the one mutex, so a flush never observes a
/// position without its matching distance.
pub struct ActivityLogger {
    accumulator: Mutex<Accumulator>,
    store: CsvStore,
}

impl ActivityLogger {
    pub fn initialize(store: CsvStore) -> Result<Arc<Self>> {
        store.ensure_initialized()?;

        Ok(Arc::new(Self {
            accumulator: Mutex::new(Accumulator::default()),
            store,
        }))
    }

    pub fn on_position_changed(&self, x: i32, y: i32) {
        self.accumulator.lock().record_move(x, y);
    }

    pub fn position_sink(self: &Arc<Self>) -> PositionSink {
        let logger = Arc::clone(self);
        Arc::new(move |x, y| logger.on_position_changed(x, y))
    }

    pub fn flush(&self) -> Result<ActivityRecord> {
        self.flush_at(Local::now())
    }

    /// The lock is held across the append and the reset only happens once the
    /// row is on disk. A failed append leaves the interval intact.
    pub fn flush_at(&self, now: DateTime<Local>) -> Result<ActivityRecord> {
        let mut accumulator = self.accumulator.lock();
        let record = accumulator.record(now);
        self.store.append(&record)?;
        accumulator.reset(now);
        drop(accumulator);

        log::debug!(
            "Logged position ({}, {}), distance {:.2}, idle {:.2}s",
            record.x_position,
            record.y_position,
            record.distance_moved,
            record.idle_time
        );
        Ok(record)
    }

    pub fn store(&self) -> &CsvStore {
        &self.store
    }
}
