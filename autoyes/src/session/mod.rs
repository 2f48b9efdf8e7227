//! Session proxy: runs a child, relays its I/O and answers its prompts.
//!
//! A session is either pty-backed (full terminal fidelity, resize support) or
//! pipe-backed (degraded fallback). The mode is chosen once, when the session
//! is spawned, and both implement [`InteractiveSession`].
//!
//! # Example
//!
//! ```rust,no_run
//! use autoyes::session::SessionBuilder;
//!
//! # async fn example() -> Result<(), autoyes::Error> {
//! let code = SessionBuilder::new(["apt-get", "install", "jq"])
//!     .category("generic")
//!     .verbose(true)
//!     .spawn()?
//!     .run()
//!     .await?;
//! println!("exit code {code}");
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod pipe;
mod pty;
pub mod responder;
pub mod terminal;

pub use builder::SessionBuilder;
pub use config::{DEFAULT_COOLDOWN, DEFAULT_RESPONSE, SessionConfig};
pub use pipe::PipeSession;
pub use pty::PtySession;
pub use responder::{AutoResponder, Reply};

use std::fmt;
use std::io::Write;
use std::os::fd::AsFd;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::time::Duration;

use log::warn;
use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::poll::{PollFd, PollFlags, PollTimeout};

use crate::error::{Result, SessionError};

/// Environment variable set on every proxied child.
pub const SESSION_ENV_VAR: &str = "AUTOYES_ACTIVE";

/// Exit code used when the child's status cannot be interpreted.
pub const FALLBACK_EXIT_CODE: i32 = 1;

/// How the child is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Pseudo-terminal.
    Pty,

    /// Plain pipes, without resize or terminal semantics.
    Pipe,
}

impl SessionMode {
    /// Whether this mode is the degraded fallback.
    pub fn is_degraded(self) -> bool {
        matches!(self, SessionMode::Pipe)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Pty => f.write_str("pty"),
            SessionMode::Pipe => f.write_str("pipe"),
        }
    }
}

/// Session lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Spawning,
    Streaming,
    Draining,
    Terminated,
}

/// A running child session that can be driven to completion.
pub trait InteractiveSession {
    /// Which backend this session uses.
    fn mode(&self) -> SessionMode;

    /// Relay I/O until the child exits and return its exit code.
    fn run(self) -> impl Future<Output = std::result::Result<i32, SessionError>> + Send;
}

enum Backend {
    Pty(PtySession),
    Pipe(PipeSession),
}

/// A spawned session, with its backend already chosen.
pub struct SessionProxy {
    backend: Backend,
}

impl SessionProxy {
    /// Spawn `argv` according to `config`.
    ///
    /// A forced mode is honoured as is. Without one, a pty is tried first and
    /// pipes are used if no pty can be allocated.
    pub(crate) fn spawn(
        argv: &[String],
        config: &SessionConfig,
        responder: AutoResponder,
        output: Box<dyn Write + Send>,
    ) -> Result<Self> {
        if argv.is_empty() {
            return Err(SessionError::EmptyCommand.into());
        }
        let backend = match config.mode {
            Some(SessionMode::Pipe) => {
                Backend::Pipe(PipeSession::spawn(argv, config, responder, output)?)
            }
            Some(SessionMode::Pty) => {
                let pty = pty::allocate()?;
                Backend::Pty(PtySession::spawn(pty, argv, config, responder, output)?)
            }
            None => match pty::allocate() {
                Ok(pty) => Backend::Pty(PtySession::spawn(pty, argv, config, responder, output)?),
                Err(err) => {
                    warn!("{}; falling back to pipes", err);
                    Backend::Pipe(PipeSession::spawn(argv, config, responder, output)?)
                }
            },
        };
        Ok(Self { backend })
    }

    /// Which backend is active.
    pub fn mode(&self) -> SessionMode {
        match &self.backend {
            Backend::Pty(session) => session.mode(),
            Backend::Pipe(session) => session.mode(),
        }
    }

    /// Child process id, while it is running.
    pub fn id(&self) -> Option<u32> {
        match &self.backend {
            Backend::Pty(session) => Some(session.id()),
            Backend::Pipe(session) => session.id(),
        }
    }

    /// Relay I/O until the child exits and return its exit code.
    pub async fn run(self) -> Result<i32> {
        let code = match self.backend {
            Backend::Pty(session) => session.run().await?,
            Backend::Pipe(session) => session.run().await?,
        };
        Ok(code)
    }
}

/// Run `argv` under the proxy and return its exit code.
pub async fn run_command<I, S>(argv: I, config: SessionConfig) -> Result<i32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SessionBuilder::new(argv).config(config).spawn()?.run().await
}

/// Run the user's shell under the proxy and return its exit code.
pub async fn run_shell(config: SessionConfig) -> Result<i32> {
    SessionBuilder::shell().config(config).spawn()?.run().await
}

/// The user's login shell, from `$SHELL`, else `/bin/sh`.
pub fn user_shell() -> String {
    std::env::var("SHELL")
        .ok()
        .filter(|shell| !shell.is_empty())
        .unwrap_or_else(|| "/bin/sh".to_string())
}

/// Exit code for a finished child: its code, `128 + signal`, or the fallback.
pub fn exit_code_from_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        code
    } else if let Some(signal) = status.signal() {
        128 + signal
    } else {
        FALLBACK_EXIT_CODE
    }
}

fn set_cloexec<Fd: AsFd>(fd: &Fd) -> std::result::Result<(), SessionError> {
    fcntl(fd.as_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    Ok(())
}

fn is_readable(fd: &PollFd<'_>) -> bool {
    fd.revents().is_some_and(|revents| {
        revents.intersects(PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR)
    })
}

fn poll_timeout(duration: Duration) -> PollTimeout {
    PollTimeout::from(u16::try_from(duration.as_millis()).unwrap_or(u16::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Output sink the test can inspect after the session ends.
    #[derive(Clone, Default)]
    pub(super) struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        pub(super) fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const PROMPT_SCRIPT: &str =
        r#"printf 'Overwrite file? (y/n) '; read ans; echo "got:$ans"; exit 0"#;

    fn builder(script: &str, mode: SessionMode, output: &Captured) -> SessionBuilder {
        SessionBuilder::new(["/bin/sh", "-c", script])
            .mode(mode)
            .attach_stdin(false)
            .output(output.clone())
            .drain_timeout(Duration::from_millis(500))
    }

    #[test]
    fn test_exit_code_from_status() {
        assert_eq!(exit_code_from_status(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code_from_status(ExitStatus::from_raw(3 << 8)), 3);
        assert_eq!(exit_code_from_status(ExitStatus::from_raw(libc::SIGTERM)), 143);
    }

    #[test]
    fn test_mode_degraded() {
        assert!(!SessionMode::Pty.is_degraded());
        assert!(SessionMode::Pipe.is_degraded());
        assert_eq!(SessionMode::Pipe.to_string(), "pipe");
    }

    #[tokio::test]
    async fn test_pty_answers_prompt() {
        let output = Captured::default();
        let session = builder(PROMPT_SCRIPT, SessionMode::Pty, &output).spawn().unwrap();
        assert_eq!(session.mode(), SessionMode::Pty);

        let code = session.run().await.unwrap();
        assert_eq!(code, 0);
        assert!(output.text().contains("got:y"), "{:?}", output.text());
    }

    #[tokio::test]
    async fn test_pipe_answers_prompt() {
        let output = Captured::default();
        let session = builder(PROMPT_SCRIPT, SessionMode::Pipe, &output).spawn().unwrap();
        assert!(session.mode().is_degraded());

        let code = session.run().await.unwrap();
        assert_eq!(code, 0);
        assert!(output.text().contains("got:y"), "{:?}", output.text());
    }

    #[tokio::test]
    async fn test_canned_response_sent() {
        let output = Captured::default();
        let script = r#"printf 'Replace all? [yes/no] '; read ans; echo "got:$ans""#;
        let code = builder(script, SessionMode::Pty, &output)
            .spawn()
            .unwrap()
            .run()
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert!(output.text().contains("got:yes"), "{:?}", output.text());
    }

    #[tokio::test]
    async fn test_exit_code_passthrough() {
        for mode in [SessionMode::Pty, SessionMode::Pipe] {
            let output = Captured::default();
            let code = builder("echo done; exit 7", mode, &output)
                .spawn()
                .unwrap()
                .run()
                .await
                .unwrap();
            assert_eq!(code, 7, "{mode}");
            assert!(output.text().contains("done"));
        }
    }

    #[tokio::test]
    async fn test_signal_death_reports_128_plus_signal() {
        for mode in [SessionMode::Pty, SessionMode::Pipe] {
            let output = Captured::default();
            let code = builder("kill -TERM $$", mode, &output)
                .spawn()
                .unwrap()
                .run()
                .await
                .unwrap();
            assert_eq!(code, 128 + libc::SIGTERM, "{mode}");
        }
    }

    #[tokio::test]
    async fn test_verbose_notice() {
        let output = Captured::default();
        builder(PROMPT_SCRIPT, SessionMode::Pty, &output)
            .verbose(true)
            .spawn()
            .unwrap()
            .run()
            .await
            .unwrap();
        assert!(output.text().contains("[autoyes] responded 'y'"), "{:?}", output.text());
    }

    #[tokio::test]
    async fn test_child_sees_session_marker() {
        for mode in [SessionMode::Pty, SessionMode::Pipe] {
            let output = Captured::default();
            let code = builder(r#"echo "marker=$AUTOYES_ACTIVE""#, mode, &output)
                .spawn()
                .unwrap()
                .run()
                .await
                .unwrap();
            assert_eq!(code, 0);
            assert!(output.text().contains("marker=1"), "{mode}: {:?}", output.text());
        }
    }

    #[tokio::test]
    async fn test_pty_child_sees_terminal() {
        let output = Captured::default();
        builder("test -t 0 && echo tty-yes || echo tty-no", SessionMode::Pty, &output)
            .spawn()
            .unwrap()
            .run()
            .await
            .unwrap();
        assert!(output.text().contains("tty-yes"), "{:?}", output.text());
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let output = Captured::default();
        for mode in [SessionMode::Pty, SessionMode::Pipe] {
            let err = SessionBuilder::new(["/nonexistent/autoyes-test-binary"])
                .mode(mode)
                .attach_stdin(false)
                .output(output.clone())
                .spawn()
                .err()
                .unwrap();
            assert!(
                matches!(err, crate::Error::Session(SessionError::SpawnFailed { .. })),
                "{err}"
            );
        }
    }

    #[tokio::test]
    async fn test_empty_command() {
        let err = SessionBuilder::new(Vec::<String>::new()).spawn().err().unwrap();
        assert!(matches!(err, crate::Error::Session(SessionError::EmptyCommand)));
    }

    #[test]
    fn test_user_shell_not_empty() {
        assert!(!user_shell().is_empty());
    }
}
