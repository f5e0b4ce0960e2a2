//! Graceful-shutdown hook
//!
//! Blocks until a registered termination signal arrives, then runs the
//! caller-supplied cleanup callbacks strictly in order on the calling
//! thread. Teardown ordering between dependent resources is expressed
//! purely by the order of the callback list: stop accepting new work
//! first, close the resources in-flight work depends on after, flush
//! logging sinks last.
//!
//! ```no_run
//! use service_kit::shutdown::ShutdownHook;
//!
//! let hook = ShutdownHook::new().unwrap();
//! hook.close(vec![
//!     Box::new(|| { /* drain the http listener with its own deadline */ }),
//!     Box::new(|| { /* close db pools and cache */ }),
//!     Box::new(|| { /* logger.sync() */ }),
//! ]);
//! ```

use nix::libc;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicI32, Ordering};

pub type Result<T> = std::result::Result<T, ShutdownError>;

#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    /// Signal registration rejected by the OS (e.g. SIGKILL)
    #[error("Signal registration failed: {0}")]
    Signal(#[from] nix::Error),

    /// Only one hook may hold the process signal slot at a time
    #[error("A shutdown hook is already active in this process")]
    HookActive,

    /// The wakeup pipe could not be created
    #[error("Failed to create signal pipe: {message}")]
    Pipe { message: String },
}

// Write end of the wakeup pipe, shared with the signal handler. -1 marks
// the slot as free; at most one hook owns it at a time.
static PIPE_WR: AtomicI32 = AtomicI32::new(-1);

// Signal handlers may only perform async-signal-safe work; a one-byte
// write to a pipe is the classic wakeup that qualifies.
extern "C" fn notify_pipe(_signal: libc::c_int) {
    let fd = PIPE_WR.load(Ordering::SeqCst);
    if fd >= 0 {
        let byte: u8 = 1;
        let _ = unsafe { libc::write(fd, &byte as *const u8 as *const libc::c_void, 1) };
    }
}

/// Signal-driven shutdown orchestrator.
///
/// Construction registers interest in SIGINT and SIGTERM; more signals
/// can be added with [`ShutdownHook::with_signals`]. The hook is
/// single-use: [`ShutdownHook::close`] consumes it, and a second hook
/// can only be constructed after the first is closed or dropped.
pub struct ShutdownHook {
    read_fd: RawFd,
    write_fd: RawFd,
    registered: Vec<(Signal, SigAction)>,
    withdrawn: bool,
}

impl ShutdownHook {
    /// Create a hook registered for the default set {SIGINT, SIGTERM}.
    ///
    /// # Errors
    ///
    /// Fails if the wakeup pipe cannot be created, a hook is already
    /// active, or the OS rejects the registration.
    pub fn new() -> Result<Self> {
        let mut fds = [-1 as libc::c_int; 2];
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(ShutdownError::Pipe {
                message: std::io::Error::last_os_error().to_string(),
            });
        }

        if PIPE_WR
            .compare_exchange(-1, fds[1], Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            unsafe {
                libc::close(fds[0]);
                libc::close(fds[1]);
            }
            return Err(ShutdownError::HookActive);
        }

        let mut hook = Self {
            read_fd: fds[0],
            write_fd: fds[1],
            registered: Vec::new(),
            withdrawn: false,
        };
        hook.register(Signal::SIGINT)?;
        hook.register(Signal::SIGTERM)?;
        Ok(hook)
    }

    /// Register additional termination signals on top of the default set.
    pub fn with_signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Result<Self> {
        for signal in signals {
            self.register(signal)?;
        }
        Ok(self)
    }

    fn register(&mut self, signal: Signal) -> Result<()> {
        if self.registered.iter().any(|(s, _)| *s == signal) {
            return Ok(());
        }
        let action = SigAction::new(
            SigHandler::Handler(notify_pipe),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        let previous = unsafe { sigaction(signal, &action) }?;
        self.registered.push((signal, previous));
        Ok(())
    }

    /// Block until one registered signal arrives, then run the callbacks
    /// in the given order on the calling thread.
    ///
    /// Before the first callback runs, every signal registration is
    /// withdrawn (later signals revert to their prior handling), so the
    /// hook fires exactly once. Panics from a callback are not caught: a
    /// failing callback aborts the remaining sequence and propagates to
    /// the caller, who decides whether to force-exit anyway.
    pub fn close(mut self, callbacks: Vec<Box<dyn FnOnce()>>) {
        self.wait_for_signal();
        self.withdraw();
        for callback in callbacks {
            callback();
        }
    }

    fn wait_for_signal(&self) {
        let mut byte = 0u8;
        loop {
            let n = unsafe {
                libc::read(self.read_fd, &mut byte as *mut u8 as *mut libc::c_void, 1)
            };
            if n >= 0 {
                break;
            }
            if nix::errno::Errno::last() != nix::errno::Errno::EINTR {
                break;
            }
        }
    }

    fn withdraw(&mut self) {
        if self.withdrawn {
            return;
        }
        self.withdrawn = true;
        for (signal, previous) in self.registered.drain(..) {
            let _ = unsafe { sigaction(signal, &previous) };
        }
        PIPE_WR.store(-1, Ordering::SeqCst);
    }
}

impl Drop for ShutdownHook {
    fn drop(&mut self) {
        // An abandoned hook must not keep intercepting signals or hold
        // the slot; the handler sees -1 before the fd closes.
        self.withdraw();
        unsafe {
            libc::close(self.write_fd);
            libc::close(self.read_fd);
        }
    }
}
