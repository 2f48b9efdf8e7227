//! Pipe-backed fallback session.
//!
//! Used where no pseudo-terminal can be allocated. The child sees pipes
//! instead of a terminal, so it may buffer its output and cannot be resized.
//! One reader task owns output forwarding and detection; the responder and
//! its handle on the child's stdin sit behind a single lock. Forwarded user
//! input goes through a second handle on the same pipe and never takes that
//! lock.

use std::io::{self, Write};
use std::os::fd::AsFd;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, poll};
use nix::unistd::{self, read};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::pipe::{Receiver, Sender};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::config::SessionConfig;
use super::responder::AutoResponder;
use super::{
    InteractiveSession, SESSION_ENV_VAR, SessionMode, SessionState, exit_code_from_status,
    is_readable, poll_timeout, set_cloexec,
};
use crate::error::SessionError;

const READ_CHUNK: usize = 4096;

/// State touched by the reader task.
struct PipeShared {
    responder: AutoResponder,
    stdin: Option<Sender>,
}

impl PipeShared {
    /// Answer a pending prompt, if one is due.
    async fn respond(&mut self, now: Instant, output: &mut (dyn Write + Send)) {
        let Some(reply) = self.responder.evaluate(now) else {
            return;
        };
        match deliver(self.stdin.as_mut(), &reply.payload()).await {
            Ok(()) => {
                debug!("answered /{}/ with {:?}", reply.pattern, reply.response);
                if self.responder.is_verbose() {
                    if let Err(err) = output
                        .write_all(reply.notice().as_bytes())
                        .and_then(|()| output.flush())
                    {
                        debug!("failed to print notice: {}", err);
                    }
                }
            }
            Err(err) => {
                if self.responder.is_verbose() {
                    warn!("failed to send auto-response: {}", err);
                }
            }
        }
        self.responder.commit(now);
    }
}

async fn deliver(stdin: Option<&mut Sender>, payload: &[u8]) -> io::Result<()> {
    let stdin = stdin.ok_or_else(|| io::Error::from(io::ErrorKind::BrokenPipe))?;
    stdin.write_all(payload).await?;
    stdin.flush().await
}

/// Session whose child talks to plain pipes.
pub struct PipeSession {
    command: String,
    child: Child,
    reader: Option<Receiver>,
    output: Option<Box<dyn Write + Send>>,
    shared: Arc<Mutex<PipeShared>>,
    input: Option<Sender>,
    forwarder: Option<InputForwarder>,
    poll_interval: Duration,
    drain_timeout: Duration,
    state: SessionState,
}

impl PipeSession {
    /// Start `argv` with stdout and stderr on one shared pipe.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn(
        argv: &[String],
        config: &SessionConfig,
        responder: AutoResponder,
        output: Box<dyn Write + Send>,
    ) -> Result<Self, SessionError> {
        let (program, args) = argv.split_first().ok_or(SessionError::EmptyCommand)?;
        let command = argv.join(" ");

        let (read_end, write_end) = unistd::pipe()?;
        let (stdin_read, stdin_write) = unistd::pipe()?;
        for fd in [&read_end, &write_end, &stdin_read, &stdin_write] {
            set_cloexec(fd)?;
        }

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env(SESSION_ENV_VAR, "1")
            .stdin(Stdio::from(stdin_read))
            .stdout(Stdio::from(write_end.try_clone()?))
            .stderr(Stdio::from(write_end))
            .kill_on_drop(true);
        let spawned = cmd.spawn();
        // drop the parent's copies of the child's ends
        drop(cmd);
        let child = spawned.map_err(|source| SessionError::SpawnFailed {
            command: command.clone(),
            source,
        })?;

        let input = if config.attach_stdin {
            Some(Sender::from_owned_fd(stdin_write.try_clone()?)?)
        } else {
            None
        };
        let stdin = Sender::from_owned_fd(stdin_write)?;
        let reader = Receiver::from_owned_fd(read_end)?;

        debug!("spawned '{}' (pid {:?}) on pipes", command, child.id());

        let mut session = Self {
            command,
            child,
            reader: Some(reader),
            output: Some(output),
            shared: Arc::new(Mutex::new(PipeShared {
                responder,
                stdin: Some(stdin),
            })),
            input,
            forwarder: None,
            poll_interval: config.poll_interval,
            drain_timeout: config.drain_timeout,
            state: SessionState::Idle,
        };
        session.transition(SessionState::Spawning);
        Ok(session)
    }

    /// Child process id, while it is running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn stream(&mut self) -> Result<ExitStatus, SessionError> {
        let (Some(reader), Some(output)) = (self.reader.take(), self.output.take()) else {
            return Err(io::Error::other("session already started").into());
        };
        let mut relay = tokio::spawn(relay_output(
            reader,
            output,
            Arc::clone(&self.shared),
            self.poll_interval,
        ));
        let poll_interval = self.poll_interval;
        self.forwarder = self
            .input
            .take()
            .map(|input| InputForwarder::start(input, poll_interval));

        let mut relay_done = false;
        let status = tokio::select! {
            status = self.child.wait() => status?,
            finished = &mut relay => {
                relay_done = true;
                joined(finished)?;
                self.child.wait().await?
            }
        };

        self.stop_forwarding().await;

        self.transition(SessionState::Draining);
        if !relay_done {
            match tokio::time::timeout(self.drain_timeout, &mut relay).await {
                Ok(finished) => joined(finished)?,
                Err(_) => {
                    debug!("output of '{}' still open after drain timeout", self.command);
                    relay.abort();
                }
            }
        }
        Ok(status)
    }

    async fn stop_forwarding(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.stop().await;
        }
    }

    async fn teardown(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        self.stop_forwarding().await;
        if let Ok(None) = self.child.try_wait() {
            debug!("killing '{}' after a session failure", self.command);
            let _ = self.child.kill().await;
        }
        self.shared.lock().await.stdin.take();
        self.transition(SessionState::Terminated);
    }

    fn transition(&mut self, next: SessionState) {
        debug!("session '{}': {:?} -> {:?}", self.command, self.state, next);
        self.state = next;
    }
}

impl InteractiveSession for PipeSession {
    fn mode(&self) -> SessionMode {
        SessionMode::Pipe
    }

    async fn run(mut self) -> Result<i32, SessionError> {
        self.transition(SessionState::Streaming);
        let outcome = self.stream().await;
        self.teardown().await;
        outcome.map(exit_code_from_status)
    }
}

fn joined(
    finished: Result<Result<(), SessionError>, tokio::task::JoinError>,
) -> Result<(), SessionError> {
    finished.map_err(|err| SessionError::Io(io::Error::other(err)))?
}

/// Copy child output to `output`, feeding the responder on the way.
///
/// Wakes at least every `poll_interval` so a reply held back by the cooldown
/// still goes out when the child is silent.
async fn relay_output(
    mut reader: Receiver,
    mut output: Box<dyn Write + Send>,
    shared: Arc<Mutex<PipeShared>>,
    poll_interval: Duration,
) -> Result<(), SessionError> {
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let read = tokio::time::timeout(poll_interval, reader.read(&mut buf)).await;
        let mut state = shared.lock().await;
        match read {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                output.write_all(&buf[..n])?;
                output.flush()?;
                state.responder.feed(&buf[..n]);
            }
            Ok(Err(err)) if err.kind() == io::ErrorKind::Interrupted => continue,
            Ok(Err(err)) => return Err(err.into()),
            Err(_elapsed) => {}
        }
        state.respond(Instant::now(), output.as_mut()).await;
    }
    output.flush()?;
    trace!("child output closed");
    Ok(())
}

/// Copies the invoking process's stdin into the child until stopped.
///
/// The stdin side polls with a bounded timeout, so it notices `stop` and lets
/// go of stdin before the session returns.
struct InputForwarder {
    stop: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl InputForwarder {
    fn start(mut input: Sender, poll_interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

        let reader = tokio::task::spawn_blocking({
            let stop = Arc::clone(&stop);
            move || read_stdin(&stop, poll_interval, &tx)
        });

        let writer = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                if let Err(err) = input.write_all(&chunk).await {
                    debug!("child stdin closed: {}", err);
                    break;
                }
            }
            debug!("no longer forwarding input");
        });

        Self {
            stop,
            reader,
            writer,
        }
    }

    /// Stop forwarding and wait until stdin is no longer read.
    async fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        self.writer.abort();
        if let Err(err) = self.reader.await {
            debug!("stdin reader failed: {}", err);
        }
    }
}

fn read_stdin(stop: &AtomicBool, poll_interval: Duration, tx: &UnboundedSender<Vec<u8>>) {
    let stdin = io::stdin();
    let timeout = poll_timeout(poll_interval);
    let mut buf = [0u8; READ_CHUNK];

    while !stop.load(Ordering::Relaxed) {
        let mut fds = [PollFd::new(stdin.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, timeout) {
            Ok(0) | Err(Errno::EINTR) => continue,
            Ok(_) => {}
            Err(err) => {
                debug!("polling stdin failed: {}", err);
                break;
            }
        }
        if stop.load(Ordering::Relaxed) {
            break;
        }
        if !is_readable(&fds[0]) {
            break;
        }
        match read(&stdin, &mut buf) {
            Ok(0) => {
                debug!("stdin closed; no longer forwarding input");
                break;
            }
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(Errno::EAGAIN | Errno::EINTR) => {}
            Err(err) => {
                debug!("reading stdin failed: {}", err);
                break;
            }
        }
    }
}
