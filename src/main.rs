use std::path::PathBuf;

use anyhow::{Context, Result};
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use icesh::shell::Shell;

/// The environment variable holding the log filter.
const LOG_ENV: &str = "ICESH_LOG";

#[derive(FromArgs)]
/// A restricted shell that only runs the commands found under <root>/bin and <root>/sbin.
struct Args {
    /// extra directory to look for commands in, searched before <root>/bin (repeatable)
    #[argh(option, short = 'p')]
    path: Vec<PathBuf>,

    /// root directory holding bin/, sbin/ and etc/
    #[argh(positional)]
    root: PathBuf,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut shell = Shell::new(&args.root)
        .with_context(|| format!("cannot start a shell in {}", args.root.display()))?;
    for (idx, dir) in args.path.into_iter().enumerate() {
        shell.path_mut().insert(idx, dir);
    }

    shell.run()?;

    Ok(())
}
