//! Real-terminal state: raw mode, window size and the resize signal.
//!
//! The SIGWINCH handler only raises a flag. The session loop picks it up on
//! its next iteration and does the actual resize work there.

use std::io::{self, Stdin};
use std::os::fd::{AsFd, AsRawFd};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use nix::pty::Winsize;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::termios::{self, SetArg, Termios};

/// Size used when no terminal can be queried.
pub const DEFAULT_SIZE: Winsize = Winsize {
    ws_row: 24,
    ws_col: 80,
    ws_xpixel: 0,
    ws_ypixel: 0,
};

static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn on_resize(_signal: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Release);
}

nix::ioctl_read_bad!(tiocgwinsz, libc::TIOCGWINSZ, Winsize);
nix::ioctl_write_ptr_bad!(tiocswinsz, libc::TIOCSWINSZ, Winsize);

/// Query the window size of the terminal behind `fd`.
///
/// Returns `None` if `fd` is not a terminal or reports a zero size.
pub fn window_size<Fd: AsFd>(fd: Fd) -> Option<Winsize> {
    let mut size = DEFAULT_SIZE;
    // SAFETY: TIOCGWINSZ writes one winsize into `size`.
    let result = unsafe { tiocgwinsz(fd.as_fd().as_raw_fd(), &mut size) };
    match result {
        Ok(_) if size.ws_row > 0 && size.ws_col > 0 => Some(size),
        _ => None,
    }
}

/// Apply `size` to the terminal behind `fd`.
pub fn set_window_size<Fd: AsFd>(fd: Fd, size: &Winsize) -> nix::Result<()> {
    // SAFETY: TIOCSWINSZ reads one winsize from `size`.
    unsafe { tiocswinsz(fd.as_fd().as_raw_fd(), size) }.map(|_| ())
}

/// Size of the invoking terminal, from stdin or stdout, else [`DEFAULT_SIZE`].
pub fn terminal_size() -> Winsize {
    window_size(io::stdin())
        .or_else(|| window_size(io::stdout()))
        .unwrap_or(DEFAULT_SIZE)
}

/// Holds standard input in raw mode until restored or dropped.
pub struct RawModeGuard {
    stdin: Stdin,
    original: Option<Termios>,
}

impl RawModeGuard {
    /// Save the current attributes of standard input and switch it to raw mode.
    pub fn enter() -> nix::Result<Self> {
        let stdin = io::stdin();
        let original = termios::tcgetattr(&stdin)?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(&stdin, SetArg::TCSANOW, &raw)?;
        debug!("terminal switched to raw mode");
        Ok(Self {
            stdin,
            original: Some(original),
        })
    }

    /// Put the saved attributes back. Only the first call has an effect.
    pub fn restore(&mut self) {
        if let Some(original) = self.original.take() {
            match termios::tcsetattr(&self.stdin, SetArg::TCSAFLUSH, &original) {
                Ok(()) => debug!("terminal attributes restored"),
                Err(err) => warn!("failed to restore terminal attributes: {}", err),
            }
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Installed SIGWINCH handler, remembering the one it replaced.
pub struct ResizeWatcher {
    previous: Option<SigAction>,
}

impl ResizeWatcher {
    /// Install the flag-raising handler.
    pub fn install() -> nix::Result<Self> {
        RESIZE_PENDING.store(false, Ordering::Release);
        let action = SigAction::new(
            SigHandler::Handler(on_resize),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler only stores to an atomic.
        let previous = unsafe { signal::sigaction(Signal::SIGWINCH, &action)? };
        Ok(Self {
            previous: Some(previous),
        })
    }

    /// Consume a pending resize notification.
    pub fn take_pending(&self) -> bool {
        RESIZE_PENDING.swap(false, Ordering::AcqRel)
    }

    /// Reinstate the previous handler. Only the first call has an effect.
    pub fn restore(&mut self) {
        if let Some(previous) = self.previous.take() {
            // SAFETY: `previous` was returned by sigaction for this signal.
            if let Err(err) = unsafe { signal::sigaction(Signal::SIGWINCH, &previous) } {
                warn!("failed to restore SIGWINCH handler: {}", err);
            }
        }
    }
}

impl Drop for ResizeWatcher {
    fn drop(&mut self) {
        self.restore();
    }
}
