//! Pty-backed session.
//!
//! The child gets the slave side of a fresh pseudo-terminal as its
//! controlling terminal. The parent runs one synchronous `poll` loop over the
//! master and the real standard input on a blocking thread.

use std::io::{self, IsTerminal, Write};
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use nix::errno::Errno;
use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::pty::{OpenptyResult, Winsize, openpty};
use nix::sys::signal::{Signal, kill};
use nix::unistd::{Pid, read, write};

use super::config::SessionConfig;
use super::responder::AutoResponder;
use super::terminal::{self, RawModeGuard, ResizeWatcher};
use super::{
    InteractiveSession, SESSION_ENV_VAR, SessionMode, SessionState, exit_code_from_status,
    is_readable, poll_timeout, set_cloexec,
};
use crate::error::SessionError;

const READ_CHUNK: usize = 4096;
const DRAIN_SLICE: Duration = Duration::from_millis(100);
const WRITE_WAIT: u16 = 100;

/// Allocate a pty pair sized like the invoking terminal.
pub(crate) fn allocate() -> Result<OpenptyResult, SessionError> {
    let size = terminal::terminal_size();
    let pty = openpty(&size, None).map_err(SessionError::PtyUnavailable)?;
    set_cloexec(&pty.master)?;
    trace!("allocated pty {}x{}", size.ws_col, size.ws_row);
    Ok(pty)
}

/// Session whose child runs on a pseudo-terminal.
pub struct PtySession {
    command: String,
    child: Child,
    master: OwnedFd,
    responder: AutoResponder,
    output: Box<dyn Write + Send>,
    attach_stdin: bool,
    poll_interval: Duration,
    drain_timeout: Duration,
    raw_mode: Option<RawModeGuard>,
    resize: Option<ResizeWatcher>,
    state: SessionState,
    exit_status: Option<ExitStatus>,
}

impl PtySession {
    /// Start `argv` on the slave side of `pty`.
    pub(crate) fn spawn(
        pty: OpenptyResult,
        argv: &[String],
        config: &SessionConfig,
        responder: AutoResponder,
        output: Box<dyn Write + Send>,
    ) -> Result<Self, SessionError> {
        let (program, args) = argv.split_first().ok_or(SessionError::EmptyCommand)?;
        let command = argv.join(" ");
        let OpenptyResult { master, slave } = pty;

        let interactive = config.attach_stdin && io::stdin().is_terminal();
        let raw_mode = if interactive {
            Some(RawModeGuard::enter()?)
        } else {
            None
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env(SESSION_ENV_VAR, "1")
            .stdin(Stdio::from(slave.try_clone()?))
            .stdout(Stdio::from(slave.try_clone()?))
            .stderr(Stdio::from(slave));
        // SAFETY: runs between fork and exec; setsid and ioctl are
        // async-signal-safe. fd 0 is the slave at this point.
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(io::Error::last_os_error());
                }
                if libc::ioctl(libc::STDIN_FILENO, libc::TIOCSCTTY as libc::c_ulong, 0) == -1 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }
        let spawned = cmd.spawn();
        // drop the parent's copies of the slave
        drop(cmd);
        let child = spawned.map_err(|source| SessionError::SpawnFailed {
            command: command.clone(),
            source,
        })?;

        let mut session = Self {
            command,
            child,
            master,
            responder,
            output,
            attach_stdin: config.attach_stdin,
            poll_interval: config.poll_interval,
            drain_timeout: config.drain_timeout,
            raw_mode,
            resize: None,
            state: SessionState::Idle,
            exit_status: None,
        };
        // from here on, a failure drops the session and teardown reaps the child
        session.transition(SessionState::Spawning);
        set_nonblocking(&session.master)?;
        if interactive {
            session.resize = Some(ResizeWatcher::install()?);
        }

        debug!("spawned '{}' (pid {}) on a pty", session.command, session.child.id());
        Ok(session)
    }

    /// Child process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Run the session to completion on the current thread.
    pub fn run_blocking(mut self) -> Result<i32, SessionError> {
        self.transition(SessionState::Streaming);
        let outcome = self.stream().and_then(|()| {
            self.transition(SessionState::Draining);
            self.drain()
        });
        self.teardown();
        outcome.map(exit_code_from_status)
    }

    fn stream(&mut self) -> Result<(), SessionError> {
        let stdin = io::stdin();
        let mut stdin_open = self.attach_stdin;
        let mut buf = [0u8; READ_CHUNK];
        let timeout = poll_timeout(self.poll_interval);

        loop {
            if self.resize.as_ref().is_some_and(ResizeWatcher::take_pending) {
                self.apply_resize();
            }

            let (child_ready, user_ready) = {
                let mut fds = vec![PollFd::new(self.master.as_fd(), PollFlags::POLLIN)];
                if stdin_open {
                    fds.push(PollFd::new(stdin.as_fd(), PollFlags::POLLIN));
                }
                match poll(&mut fds, timeout) {
                    Ok(_) => {}
                    Err(Errno::EINTR) => continue,
                    Err(err) => return Err(err.into()),
                }
                (is_readable(&fds[0]), fds.get(1).is_some_and(is_readable))
            };

            if user_ready {
                match read(&stdin, &mut buf) {
                    Ok(0) => {
                        debug!("stdin closed; no longer forwarding input");
                        stdin_open = false;
                    }
                    Ok(n) => match write_all(&self.master, &buf[..n]) {
                        Ok(()) => {}
                        Err(err) if is_stream_end(err) => return Ok(()),
                        Err(err) => return Err(err.into()),
                    },
                    Err(Errno::EAGAIN | Errno::EINTR) => {}
                    Err(err) => return Err(err.into()),
                }
            }

            if child_ready {
                match read(&self.master, &mut buf) {
                    Ok(0) => return Ok(()),
                    Ok(n) => {
                        self.output.write_all(&buf[..n])?;
                        self.output.flush()?;
                        self.responder.feed(&buf[..n]);
                    }
                    Err(Errno::EAGAIN | Errno::EINTR) => {}
                    Err(err) if is_stream_end(err) => {
                        debug!("pty closed by '{}'", self.command);
                        return Ok(());
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            self.respond(Instant::now());

            if let Some(status) = self.child.try_wait()? {
                self.exit_status = Some(status);
                return Ok(());
            }
        }
    }

    fn respond(&mut self, now: Instant) {
        let Some(reply) = self.responder.evaluate(now) else {
            return;
        };
        match write_all(&self.master, &reply.payload()) {
            Ok(()) => {
                debug!("answered /{}/ with {:?}", reply.pattern, reply.response);
                if self.responder.is_verbose() {
                    let notice = reply.notice();
                    if let Err(err) = self
                        .output
                        .write_all(notice.as_bytes())
                        .and_then(|()| self.output.flush())
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

    fn apply_resize(&mut self) {
        if let Some(size) = terminal::window_size(io::stdin()) {
            self.resize_to(&size);
        }
    }

    fn resize_to(&mut self, size: &Winsize) {
        debug!("resizing pty to {}x{}", size.ws_col, size.ws_row);
        if let Err(err) = terminal::set_window_size(&self.master, size) {
            warn!("failed to resize pty: {}", err);
        }
        let pid = Pid::from_raw(self.child.id() as i32);
        if let Err(err) = kill(pid, Signal::SIGWINCH) {
            debug!("failed to forward SIGWINCH: {}", err);
        }
    }

    /// Flush what the child left in the master, then reap it.
    fn drain(&mut self) -> Result<ExitStatus, SessionError> {
        let deadline = Instant::now() + self.drain_timeout;
        let mut buf = [0u8; READ_CHUNK];
        let mut drained = 0;

        while Instant::now() < deadline {
            let mut fds = [PollFd::new(self.master.as_fd(), PollFlags::POLLIN)];
            match poll(&mut fds, poll_timeout(DRAIN_SLICE)) {
                Ok(0) => break,
                Ok(_) => {}
                Err(Errno::EINTR) => continue,
                Err(_) => break,
            }
            if !is_readable(&fds[0]) {
                break;
            }
            match read(&self.master, &mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if let Err(err) = self.output.write_all(&buf[..n]) {
                        warn!("dropping output of '{}' while draining: {}", self.command, err);
                        break;
                    }
                    drained += n;
                }
                Err(Errno::EAGAIN | Errno::EINTR) => {}
                Err(_) => break,
            }
        }
        if let Err(err) = self.output.flush() {
            debug!("failed to flush output: {}", err);
        }
        trace!("drained {} bytes after '{}' finished", drained, self.command);

        let status = match self.exit_status {
            Some(status) => status,
            None => self.child.wait()?,
        };
        self.exit_status = Some(status);
        Ok(status)
    }

    /// Release everything the session holds. Runs once.
    fn teardown(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        if let Some(mut guard) = self.raw_mode.take() {
            guard.restore();
        }
        if let Some(mut watcher) = self.resize.take() {
            watcher.restore();
        }
        if self.exit_status.is_none() {
            match self.child.try_wait() {
                Ok(Some(status)) => self.exit_status = Some(status),
                _ => {
                    debug!("killing '{}' after a session failure", self.command);
                    let _ = self.child.kill();
                    self.exit_status = self.child.wait().ok();
                }
            }
        }
        let _ = self.output.flush();
        self.transition(SessionState::Terminated);
    }

    fn transition(&mut self, next: SessionState) {
        debug!("session '{}': {:?} -> {:?}", self.command, self.state, next);
        self.state = next;
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl InteractiveSession for PtySession {
    fn mode(&self) -> SessionMode {
        SessionMode::Pty
    }

    async fn run(self) -> Result<i32, SessionError> {
        tokio::task::spawn_blocking(move || self.run_blocking())
            .await
            .map_err(|err| SessionError::Io(io::Error::other(err)))?
    }
}

/// `EIO` is what Linux reports on the master once the slave side is gone.
fn is_stream_end(err: Errno) -> bool {
    err == Errno::EIO
}

fn set_nonblocking<Fd: AsFd>(fd: &Fd) -> Result<(), SessionError> {
    let flags = OFlag::from_bits_truncate(fcntl(fd.as_fd(), FcntlArg::F_GETFL)?);
    fcntl(fd.as_fd(), FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

/// Write all of `data`, waiting for the fd to drain when it would block.
fn write_all<Fd: AsFd>(fd: &Fd, data: &[u8]) -> Result<(), Errno> {
    let mut written = 0;
    while written < data.len() {
        match write(fd, &data[written..]) {
            Ok(n) => written += n,
            Err(Errno::EINTR) => {}
            Err(Errno::EAGAIN) => {
                let mut fds = [PollFd::new(fd.as_fd(), PollFlags::POLLOUT)];
                match poll(&mut fds, PollTimeout::from(WRITE_WAIT)) {
                    Ok(0) => return Err(Errno::EAGAIN),
                    Ok(_) | Err(Errno::EINTR) => {}
                    Err(err) => return Err(err),
                }
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
