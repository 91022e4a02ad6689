//! Keeps the shell alive while a command runs in the foreground.
//!
//! Ctrl-C and Ctrl-\ go to the whole foreground process group, the shell included. While a child
//! runs, the shell ignores SIGINT and SIGQUIT; the child gets the default dispositions back right
//! before it execs, so it can still be interrupted.

use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;
use std::sync::Mutex;

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use tracing::warn;

const INTERRUPTS: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

/// The dispositions to restore once the last foreground child is done. Nested or concurrent
/// guards share them.
struct Saved {
    depth: usize,
    actions: Vec<(Signal, SigAction)>,
}

static SAVED: Mutex<Saved> = Mutex::new(Saved {
    depth: 0,
    actions: Vec::new(),
});

/// Ignores SIGINT and SIGQUIT in the shell for as long as it lives.
pub struct ForegroundGuard {
    _private: (),
}

impl ForegroundGuard {
    /// Starts ignoring interrupts, unless another guard already does.
    pub fn new() -> ForegroundGuard {
        let mut saved = SAVED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if saved.depth == 0 {
            let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
            for sig in INTERRUPTS.iter().copied() {
                match unsafe { signal::sigaction(sig, &ignore) } {
                    Ok(old) => saved.actions.push((sig, old)),
                    Err(errno) => warn!(signal = %sig, %errno, "cannot ignore signal"),
                }
            }
        }
        saved.depth += 1;

        ForegroundGuard { _private: () }
    }
}

impl Drop for ForegroundGuard {
    fn drop(&mut self) {
        let mut saved = SAVED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        saved.depth -= 1;
        if saved.depth == 0 {
            for (sig, old) in saved.actions.drain(..) {
                if let Err(errno) = unsafe { signal::sigaction(sig, &old) } {
                    warn!(signal = %sig, %errno, "cannot restore signal disposition");
                }
            }
        }
    }
}

/// Makes the child start with default SIGINT and SIGQUIT handling, since ignored signals are
/// inherited across exec.
pub fn restore_interrupts_in_child(cmd: &mut Command) -> &mut Command {
    unsafe {
        cmd.pre_exec(|| {
            for sig in INTERRUPTS.iter().copied() {
                signal::signal(sig, SigHandler::SigDfl).map_err(io::Error::from)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn guards_nest() {
        let outer = ForegroundGuard::new();
        let inner = ForegroundGuard::new();
        drop(inner);

        // Still ignored while the outer guard lives.
        let current = unsafe { signal::signal(Signal::SIGQUIT, SigHandler::SigIgn) }.unwrap();
        assert_eq!(current, SigHandler::SigIgn);

        drop(outer);
    }
}
