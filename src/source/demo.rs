// Demo source: synthetic Azurite request logs, no Docker needed
//
// Each stream is fed by its own generator task. All generators share one stop
// signal so `stop()` silences every stream handed out so far. A generator also
// exits on its own once the receiving end is dropped.
//
// Run with: AZSTORE_DEMO=1 azstore

use super::{stream_channel, HandleId, LogSource, LogStream, SourceError};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;

const STARTUP_LINES: &[&str] = &[
    "Azurite Blob service is starting at http://0.0.0.0:10000",
    "Azurite Blob service is successfully listening at http://0.0.0.0:10000",
    "Azurite Queue service is starting at http://0.0.0.0:10001",
    "Azurite Queue service is successfully listening at http://0.0.0.0:10001",
    "Azurite Table service is starting at http://0.0.0.0:10002",
    "Azurite Table service is successfully listening at http://0.0.0.0:10002",
];

/// (method, path, status) triples cycled by the generator
const REQUESTS: &[(&str, &str, u16)] = &[
    ("GET", "/devstoreaccount1?comp=list", 200),
    ("GET", "/devstoreaccount1/images?restype=container&comp=list", 200),
    ("PUT", "/devstoreaccount1/images/cat.png", 201),
    ("GET", "/devstoreaccount1/images/dog.jpg", 200),
    ("HEAD", "/devstoreaccount1/videos/intro.mp4", 200),
    ("GET", "/devstoreaccount1/backups?restype=container", 404),
    ("POST", "/devstoreaccount1/email-jobs/messages", 201),
    ("GET", "/devstoreaccount1/task-queue/messages?numofmessages=32", 200),
    ("DELETE", "/devstoreaccount1/task-queue/messages/7c1e", 204),
    ("GET", "/devstoreaccount1/users()", 200),
    ("POST", "/devstoreaccount1/transactions", 201),
    ("GET", "/devstoreaccount1/Tables", 200),
];

/// One synthetic request log line in Azurite's access-log format
pub fn demo_line(seq: u64, at: DateTime<Utc>) -> String {
    let (method, path, status) = REQUESTS[(seq as usize) % REQUESTS.len()];
    format!(
        "127.0.0.1 - - [{}] \"{} {} HTTP/1.1\" {} -",
        at.format("%d/%b/%Y:%H:%M:%S %z"),
        method,
        path,
        status
    )
}

pub struct DemoSource {
    interval: Duration,
    handle: Option<HandleId>,
    stop_tx: Option<watch::Sender<bool>>,
    starts: u64,
}

impl DemoSource {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(10)),
            handle: None,
            stop_tx: None,
            starts: 0,
        }
    }

    fn spawn_generator(&self, greeting: Vec<String>, stop_rx: watch::Receiver<bool>) -> LogStream {
        let (tx, rx) = stream_channel();
        tokio::spawn(generate(tx, stop_rx, greeting, self.interval));
        rx
    }
}

impl LogSource for DemoSource {
    fn label(&self) -> &str {
        "demo"
    }

    async fn start(&mut self) -> Result<LogStream, SourceError> {
        self.stop().await;

        self.starts += 1;
        let handle = HandleId::new(format!("demo-{:04}", self.starts));
        let (stop_tx, stop_rx) = watch::channel(false);

        let mut greeting = vec![format!("Starting demo log source {}", handle)];
        greeting.extend(STARTUP_LINES.iter().map(|s| s.to_string()));

        let stream = self.spawn_generator(greeting, stop_rx);
        tracing::info!(handle = %handle, "Demo log source started");

        self.handle = Some(handle);
        self.stop_tx = Some(stop_tx);
        Ok(stream)
    }

    async fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            tracing::info!("Demo log source stopped");
        }
        self.handle = None;
    }

    async fn current_handle_id(&mut self) -> Option<HandleId> {
        self.handle.clone()
    }

    async fn attach_to(&mut self, handle: &HandleId) -> Result<LogStream, SourceError> {
        let stop_rx = match (&self.handle, &self.stop_tx) {
            (Some(current), Some(stop_tx)) if current == handle => stop_tx.subscribe(),
            _ => return Err(SourceError::NoHandle),
        };

        let greeting = vec![format!("Attached to demo log source {}", handle)];
        Ok(self.spawn_generator(greeting, stop_rx))
    }
}

async fn generate(
    tx: mpsc::Sender<String>,
    mut stop_rx: watch::Receiver<bool>,
    greeting: Vec<String>,
    interval: Duration,
) {
    for line in greeting {
        if tx.send(line).await.is_err() {
            return;
        }
    }

    let mut seq: u64 = 0;
    loop {
        tokio::select! {
            _ = stop_rx.changed() => {
                tracing::debug!("Demo generator received stop signal");
                return;
            }
            _ = tx.closed() => return,
            _ = sleep(interval) => {
                if tx.send(demo_line(seq, Utc::now())).await.is_err() {
                    return;
                }
                seq += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn demo_line_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            demo_line(0, at),
            "127.0.0.1 - - [05/Mar/2024:14:07:09 +0000] \"GET /devstoreaccount1?comp=list HTTP/1.1\" 200 -"
        );
        // Cycles through the request table
        assert_eq!(demo_line(REQUESTS.len() as u64, at), demo_line(0, at));
    }

    #[tokio::test]
    async fn start_streams_greeting_then_requests() {
        let mut source = DemoSource::new(Duration::from_millis(10));
        let mut stream = source.start().await.unwrap();

        let first = stream.recv().await.unwrap();
        assert!(first.starts_with("Starting demo log source demo-0001"));
        for expected in STARTUP_LINES {
            assert_eq!(stream.recv().await.as_deref(), Some(*expected));
        }
        let request = stream.recv().await.unwrap();
        assert!(request.starts_with("127.0.0.1 - - ["));
    }

    #[tokio::test]
    async fn attach_requires_current_handle() {
        let mut source = DemoSource::new(Duration::from_millis(10));
        let stale = HandleId::new("demo-9999");
        assert_eq!(
            source.attach_to(&stale).await.err(),
            Some(SourceError::NoHandle)
        );

        let _stream = source.start().await.unwrap();
        let handle = source.current_handle_id().await.unwrap();
        let mut attached = source.attach_to(&handle).await.unwrap();
        assert_eq!(
            attached.recv().await,
            Some(format!("Attached to demo log source {}", handle))
        );
    }

    #[tokio::test]
    async fn stop_closes_streams() {
        let mut source = DemoSource::new(Duration::from_millis(10));
        let mut stream = source.start().await.unwrap();
        source.stop().await;
        assert!(source.current_handle_id().await.is_none());

        // Drain whatever was buffered; the stream must then end
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while stream.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok());
    }
}
