use std::io::{self, Read};
use std::process::{Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn drain<R: Read + Send + 'static>(source: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = vec![];
        if let Some(mut source) = source {
            let _ = source.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

/// Runs `cmd` to completion, capturing its output, or kills it once
/// `timeout` has elapsed.
///
/// Returns `None` if the command could not be started or timed out. The
/// deadline also covers collecting the output, so a child which leaves a
/// background process holding its pipes times out as well. A non-zero exit
/// is still returned as `Some`, callers inspect the status.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Option<Output> {
    match try_run(cmd, timeout) {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!(command = ?cmd, error = %err, "failed to run command");
            None
        }
    }
}

fn try_run(cmd: &mut Command, timeout: Duration) -> io::Result<Option<Output>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    // Both pipes are drained while we wait, otherwise a child writing more
    // than the pipe buffer would never exit.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!(command = ?cmd, ?timeout, "command timed out");
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    };

    let collect = |rx: Receiver<Vec<u8>>| {
        rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .ok()
    };
    match (collect(stdout), collect(stderr)) {
        (Some(stdout), Some(stderr)) => Ok(Some(Output {
            status,
            stdout,
            stderr,
        })),
        _ => {
            tracing::debug!(command = ?cmd, ?timeout, "command output still open at deadline");
            Ok(None)
        }
    }
}
