use std::process::ExitStatus;

/// This code, if returned by a command, will cause the shell to exit.
pub const EXIT_CODE: i32 = 251;

/// Whether a command that finished with `code` asks the shell to terminate.
pub fn terminates_shell(code: i32) -> bool {
    code == EXIT_CODE
}

/// Reduces an `ExitStatus` to a plain exit code.
///
/// A child killed by a signal has no code of its own and reports `128 + signal`, like most
/// shells do.
pub fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
        128 + signal
    } else if status.core_dumped() {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> i32 {
    -1
}
