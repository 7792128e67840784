// Docker-backed Azurite source
//
// Shells out to the docker CLI:
//   docker ps -aq --filter name=^<name>$     lookup (also used for reattach)
//   docker inspect -f {{.State.Running}}     is the existing container up?
//   docker start <id> / docker run -d ...    bring it up
//   docker logs -f <id>                      follow, stdout and stderr merged
//   docker stop <id>                         on shutdown (never removes)
//
// Bringing the container up can take a while (image pull), so `start()` only
// does the lookup inline and streams progress lines from a background task.

use super::{stream_channel, HandleId, LogSource, LogStream, SourceError};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

/// Everything needed to find, create and follow the emulator container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerOptions {
    /// Docker CLI binary
    pub binary: String,
    pub container_name: String,
    pub image: String,
    /// Published as `-p <port>:<port>`
    pub ports: Vec<u16>,
    /// Passed as `-v`, empty to skip
    pub volume: String,
    /// Pause after creating or starting the container before following logs
    pub startup_grace: Duration,
}

impl Default for DockerOptions {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            container_name: "azurite-emulator".to_string(),
            image: "mcr.microsoft.com/azure-storage/azurite".to_string(),
            ports: vec![10000, 10001, 10002],
            volume: "azurite_data:/data".to_string(),
            startup_grace: Duration::from_secs(2),
        }
    }
}

impl DockerOptions {
    /// Arguments for `docker run` when no container exists yet
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.container_name.clone(),
        ];
        for port in &self.ports {
            args.push("-p".to_string());
            args.push(format!("{port}:{port}"));
        }
        if !self.volume.is_empty() {
            args.push("-v".to_string());
            args.push(self.volume.clone());
        }
        args.push(self.image.clone());
        args
    }

    fn name_filter(&self) -> String {
        format!("name=^{}$", self.container_name)
    }
}

/// Container ID of the emulator we brought up, shared with the launch task
type ContainerSlot = Arc<Mutex<Option<HandleId>>>;

pub struct DockerSource {
    options: DockerOptions,
    container: ContainerSlot,
}

impl DockerSource {
    pub fn new(options: DockerOptions) -> Self {
        Self {
            options,
            container: Arc::new(Mutex::new(None)),
        }
    }

    async fn lookup(&self) -> Result<Option<HandleId>, SourceError> {
        let filter = self.options.name_filter();
        let out = docker(&self.options.binary, &["ps", "-aq", "--filter", &filter]).await?;
        Ok(first_id(&out))
    }
}

impl LogSource for DockerSource {
    fn label(&self) -> &str {
        &self.options.container_name
    }

    async fn start(&mut self) -> Result<LogStream, SourceError> {
        // Inline lookup so a missing docker binary surfaces as a start failure
        let existing = self.lookup().await?;

        let (tx, rx) = stream_channel();
        tokio::spawn(launch(
            self.options.clone(),
            existing,
            Arc::clone(&self.container),
            tx,
        ));
        Ok(rx)
    }

    async fn stop(&mut self) {
        let id = take_slot(&self.container);
        let Some(id) = id else {
            return;
        };

        match docker(&self.options.binary, &["stop", id.as_str()]).await {
            Ok(_) => tracing::info!(container = %id.short(), "Stopped Azurite container"),
            Err(e) => tracing::warn!(container = %id.short(), error = %e, "docker stop failed"),
        }
    }

    async fn current_handle_id(&mut self) -> Option<HandleId> {
        match self.lookup().await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Container lookup failed");
                None
            }
        }
    }

    async fn attach_to(&mut self, handle: &HandleId) -> Result<LogStream, SourceError> {
        let (tx, rx) = stream_channel();
        follow_logs(&self.options.binary, handle, &tx)?;
        set_slot(&self.container, handle.clone());
        Ok(rx)
    }
}

/// Bring the container up and then follow its logs, reporting progress as lines
async fn launch(
    options: DockerOptions,
    existing: Option<HandleId>,
    slot: ContainerSlot,
    tx: mpsc::Sender<String>,
) {
    if tx.send("Starting Azurite...".to_string()).await.is_err() {
        return;
    }

    let id = match existing {
        Some(id) => match ensure_running(&options, &id).await {
            Ok(started) => {
                if started {
                    let _ = tx
                        .send(format!("Started existing Azurite container: {}", id))
                        .await;
                }
                let _ = tx
                    .send(format!("Using existing Azurite container: {}", id))
                    .await;
                id
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to start existing container");
                let _ = tx.send(format!("Error starting Azurite: {}", e)).await;
                return;
            }
        },
        None => {
            let args = options.run_args();
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            match docker(&options.binary, &args).await {
                Ok(out) => {
                    let Some(id) = first_id(&out) else {
                        let _ = tx
                            .send("Error starting Azurite: docker run printed no container ID".to_string())
                            .await;
                        return;
                    };
                    tracing::info!(container = %id.short(), "Created Azurite container");
                    let _ = tx.send(format!("Azurite container started: {}", id)).await;
                    tokio::time::sleep(options.startup_grace).await;
                    id
                }
                Err(e) => {
                    tracing::error!(error = %e, "docker run failed");
                    let _ = tx.send(format!("Error starting Azurite: {}", e)).await;
                    return;
                }
            }
        }
    };

    set_slot(&slot, id.clone());

    if let Err(e) = follow_logs(&options.binary, &id, &tx) {
        tracing::error!(error = %e, "Failed to follow container logs");
        let _ = tx.send(format!("Error starting log stream: {}", e)).await;
    }
}

/// Start the container if it is stopped. Returns whether it had to be started.
async fn ensure_running(options: &DockerOptions, id: &HandleId) -> Result<bool, SourceError> {
    let running = docker(
        &options.binary,
        &["inspect", "-f", "{{.State.Running}}", id.as_str()],
    )
    .await?;

    if running == "true" {
        return Ok(false);
    }

    docker(&options.binary, &["start", id.as_str()]).await?;
    tracing::info!(container = %id.short(), "Started existing Azurite container");
    tokio::time::sleep(options.startup_grace).await;
    Ok(true)
}

/// Spawn `docker logs -f` and forward its merged output into `tx`
///
/// The child is killed once the receiving side of `tx` goes away.
fn follow_logs(binary: &str, id: &HandleId, tx: &mpsc::Sender<String>) -> Result<(), SourceError> {
    let mut child = Command::new(binary)
        .args(["logs", "-f", id.as_str()])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SourceError::Spawn {
            command: binary.to_string(),
            message: e.to_string(),
        })?;

    let missing_pipe = || SourceError::CommandFailed {
        command: format!("{binary} logs -f"),
        message: "output pipe unavailable".to_string(),
    };
    let stdout = child.stdout.take().ok_or_else(missing_pipe)?;
    let stderr = child.stderr.take().ok_or_else(missing_pipe)?;

    tracing::debug!(container = %id.short(), "Following container logs");
    tokio::spawn(forward(child, stdout, stderr, tx.clone()));
    Ok(())
}

async fn forward(
    mut child: Child,
    stdout: tokio::process::ChildStdout,
    stderr: tokio::process::ChildStderr,
    tx: mpsc::Sender<String>,
) {
    if tx.send("Attaching to Azurite logs...".to_string()).await.is_err() {
        return;
    }

    let lines = LinesStream::new(BufReader::new(stdout).lines())
        .merge(LinesStream::new(BufReader::new(stderr).lines()));
    tokio::pin!(lines);

    let mut reader_gone = false;
    loop {
        tokio::select! {
            _ = tx.closed() => {
                reader_gone = true;
                break;
            }
            next = lines.next() => match next {
                Some(Ok(line)) => {
                    if tx.send(line).await.is_err() {
                        reader_gone = true;
                        break;
                    }
                }
                Some(Err(e)) => {
                    let _ = tx.send(format!("Error reading logs: {}", e)).await;
                    break;
                }
                None => break,
            }
        }
    }

    if reader_gone {
        tracing::debug!("Log reader dropped, stopping docker logs");
        let _ = child.kill().await;
    } else {
        let _ = child.wait().await;
    }
}

/// Run a docker command to completion, returning trimmed stdout
async fn docker(binary: &str, args: &[&str]) -> Result<String, SourceError> {
    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| SourceError::Spawn {
            command: binary.to_string(),
            message: e.to_string(),
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(SourceError::CommandFailed {
            command: format!("{} {}", binary, args.join(" ")),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// First non-empty line of command output as a container ID
fn first_id(output: &str) -> Option<HandleId> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(HandleId::new)
}

fn set_slot(slot: &ContainerSlot, id: HandleId) {
    let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(id);
}

fn take_slot(slot: &ContainerSlot) -> Option<HandleId> {
    let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.take()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_binary() -> DockerOptions {
        DockerOptions {
            binary: "/nonexistent/azstore-test-docker".to_string(),
            ..DockerOptions::default()
        }
    }

    #[test]
    fn run_args_publish_ports_and_volume() {
        let args = DockerOptions::default().run_args();
        assert_eq!(
            args,
            vec![
                "run",
                "-d",
                "--name",
                "azurite-emulator",
                "-p",
                "10000:10000",
                "-p",
                "10001:10001",
                "-p",
                "10002:10002",
                "-v",
                "azurite_data:/data",
                "mcr.microsoft.com/azure-storage/azurite",
            ]
        );
    }

    #[test]
    fn run_args_skip_empty_volume() {
        let options = DockerOptions {
            volume: String::new(),
            ports: vec![10000],
            ..DockerOptions::default()
        };
        assert!(!options.run_args().contains(&"-v".to_string()));
    }

    #[test]
    fn first_id_takes_first_line() {
        assert_eq!(first_id("abc123\ndef456\n"), Some(HandleId::new("abc123")));
        assert_eq!(first_id("  \n"), None);
    }

    #[tokio::test]
    async fn start_without_docker_is_a_spawn_error() {
        let mut source = DockerSource::new(missing_binary());
        match source.start().await {
            Err(SourceError::Spawn { command, .. }) => {
                assert_eq!(command, "/nonexistent/azstore-test-docker")
            }
            other => panic!("expected spawn error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn lookup_failure_means_no_handle() {
        let mut source = DockerSource::new(missing_binary());
        assert!(source.current_handle_id().await.is_none());
        // Nothing was started, so stop is a no-op
        source.stop().await;
    }

    #[tokio::test]
    async fn attach_without_docker_fails() {
        let mut source = DockerSource::new(missing_binary());
        let result = source.attach_to(&HandleId::new("abc")).await;
        assert!(matches!(result, Err(SourceError::Spawn { .. })));
    }
}
