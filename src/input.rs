use anyhow::Result;
use device_query::{DeviceQuery, DeviceState};
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Receives every cursor position change as `(x, y)`.
pub type PositionSink = Arc<dyn Fn(i32, i32) + Send + Sync>;

/// Reads the current cursor position. Lives on the polling thread only.
pub type Sampler = Box<dyn FnMut() -> (i32, i32)>;

/// Opens the pointer device on the polling thread. `None` or a panic means the
/// device is unavailable.
pub type DeviceOpener = Arc<dyn Fn() -> Option<Sampler> + Send + Sync>;

pub trait InputSource {
    fn start(&mut self, sink: PositionSink) -> Result<()>;
    fn stop(&mut self);
}

#[derive(Debug)]
pub enum InputError {
    Unavailable,
    AlreadyStarted,
    ThreadSpawn(String),
}

impl Error for InputError {}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputError::Unavailable => write!(f, "Unable to open the pointer device"),
            InputError::AlreadyStarted => write!(f, "Input source already started"),
            InputError::ThreadSpawn(msg) => write!(f, "Failed to spawn input thread: {}", msg),
        }
    }
}

/// Samples the cursor on a background thread and reports only actual moves.
pub struct DevicePoller {
    open: DeviceOpener,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DevicePoller {
    pub fn new() -> Self {
        Self::with_opener(Arc::new(open_device_query), POLL_INTERVAL)
    }

    pub fn with_opener(open: DeviceOpener, poll_interval: Duration) -> Self {
        Self {
            open,
            poll_interval,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl Default for DevicePoller {
    fn default() -> Self {
        Self::new()
    }
}

// DeviceState::new panics without a usable display; the start handshake
// turns that into InputError::Unavailable.
fn open_device_query() -> Option<Sampler> {
    let device_state = DeviceState::new();
    Some(Box::new(move || device_state.get_mouse().coords))
}

impl InputSource for DevicePoller {
    fn start(&mut self, sink: PositionSink) -> Result<()> {
        if self.handle.is_some() {
            return Err(InputError::AlreadyStarted.into());
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let open = Arc::clone(&self.open);
        let poll_interval = self.poll_interval;
        let (ready_tx, ready_rx) = mpsc::sync_channel::<bool>(1);

        let handle = thread::Builder::new()
            .name("input-poller".to_string())
            .spawn(move || {
                let mut sample = match open() {
                    Some(sampler) => {
                        let _ = ready_tx.send(true);
                        sampler
                    }
                    None => {
                        let _ = ready_tx.send(false);
                        return;
                    }
                };

                let mut last = sample();
                sink(last.0, last.1);

                while running.load(Ordering::SeqCst) {
                    thread::sleep(poll_interval);
                    let current = sample();
                    if current != last {
                        sink(current.0, current.1);
                        last = current;
                    }
                }
            })
            .map_err(|e| InputError::ThreadSpawn(e.to_string()))?;

        // a panicking opener drops the sender, which reads as a failed open
        let opened = ready_rx.recv().unwrap_or(false);
        if !opened {
            self.running.store(false, Ordering::SeqCst);
            let _ = handle.join();
            return Err(InputError::Unavailable.into());
        }

        log::info!("Pointer input source started");
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Input thread panicked before shutdown");
            }
            log::info!("Pointer input source stopped");
        }
    }
}

impl Drop for DevicePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
