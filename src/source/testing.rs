//! In-memory source for pipeline and app tests
//!
//! Every stream handed out gets its sender recorded in `ScriptedControl`, so a
//! test can push lines into (or close) any stream, including stale ones.

use super::{stream_channel, HandleId, LogSource, LogStream, SourceError};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, Notify};

#[derive(Default)]
struct ScriptedState {
    senders: Vec<mpsc::Sender<String>>,
    handle: Option<HandleId>,
    fail_start: bool,
    fail_attach: bool,
    /// Attach never completes (exercises the reattach timeout)
    hang_attach: bool,
    /// Attach waits for this before completing
    attach_gate: Option<Arc<Notify>>,
    stopped: bool,
}

/// Test-side remote control for a `ScriptedSource`
#[derive(Clone, Default)]
pub struct ScriptedControl {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedControl {
    fn lock(&self) -> MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap()
    }

    /// Sender of the n-th stream handed out (0 = the one from `start`)
    pub fn sender(&self, index: usize) -> mpsc::Sender<String> {
        self.lock().senders[index].clone()
    }

    pub fn stream_count(&self) -> usize {
        self.lock().senders.len()
    }

    /// Close the n-th stream as if the producer exited
    pub fn close(&self, index: usize) {
        let mut state = self.lock();
        let (tx, _rx) = mpsc::channel(1);
        // Replacing the only sender drops it, which ends the stream
        state.senders[index] = tx;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.lock().fail_start = fail;
    }

    pub fn set_fail_attach(&self, fail: bool) {
        self.lock().fail_attach = fail;
    }

    pub fn set_hang_attach(&self, hang: bool) {
        self.lock().hang_attach = hang;
    }

    /// Hold every attach until the returned gate is notified
    pub fn hold_attach(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().attach_gate = Some(Arc::clone(&gate));
        gate
    }

    pub fn set_handle(&self, handle: Option<&str>) {
        self.lock().handle = handle.map(HandleId::new);
    }

    pub fn stopped(&self) -> bool {
        self.lock().stopped
    }
}

pub struct ScriptedSource {
    control: ScriptedControl,
}

impl ScriptedSource {
    pub fn new() -> (Self, ScriptedControl) {
        let control = ScriptedControl::default();
        control.set_handle(Some("scripted-1"));
        (
            Self {
                control: control.clone(),
            },
            control,
        )
    }

    fn open_stream(&self) -> LogStream {
        let (tx, rx) = stream_channel();
        self.control.lock().senders.push(tx);
        rx
    }
}

impl LogSource for ScriptedSource {
    fn label(&self) -> &str {
        "scripted"
    }

    async fn start(&mut self) -> Result<LogStream, SourceError> {
        if self.control.lock().fail_start {
            return Err(SourceError::Spawn {
                command: "scripted".into(),
                message: "start refused".into(),
            });
        }
        Ok(self.open_stream())
    }

    async fn stop(&mut self) {
        self.control.lock().stopped = true;
    }

    async fn current_handle_id(&mut self) -> Option<HandleId> {
        self.control.lock().handle.clone()
    }

    async fn attach_to(&mut self, _handle: &HandleId) -> Result<LogStream, SourceError> {
        let (fail, hang, gate) = {
            let state = self.control.lock();
            (state.fail_attach, state.hang_attach, state.attach_gate.clone())
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if hang {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(SourceError::CommandFailed {
                command: "scripted attach".into(),
                message: "attach refused".into(),
            });
        }
        Ok(self.open_stream())
    }
}
