//! Binary crate for `dbus-commit-string`, a D-Bus object at `/CommitString`
//! that injects text into whatever input context currently has focus.

use std::io::IsTerminal;

use anyhow::{Context, Error};
use clap::Parser;
use log::{error, LevelFilter};
use tokio::runtime::Builder as RtBuilder;

mod client;
mod interface;
mod opts;
mod server;
mod timeout;

use opts::{Command, LogOpts, Opts};

type Result<T = (), E = Error> = std::result::Result<T, E>;

fn log_init(opts: &LogOpts, server: bool) -> Result {
    const VERBOSITY: [LevelFilter; 3] = [LevelFilter::Info, LevelFilter::Debug, LevelFilter::Trace];
    #[cfg(debug_assertions)]
    const DEFAULT_V: usize = 1;
    #[cfg(not(debug_assertions))]
    const DEFAULT_V: usize = 0;

    let LogOpts {
        quiet,
        no_quiet,
        verbose,
    } = *opts;
    let verbose = usize::from(verbose);

    let mut b = env_logger::builder();

    b.filter_level(VERBOSITY[(DEFAULT_V + verbose).min(VERBOSITY.len() - 1)]);

    if quiet || (server && !(no_quiet || verbose != 0 || std::io::stderr().is_terminal())) {
        b.filter_level(LevelFilter::Warn);
    }

    b.parse_default_env().try_init().map_err(Into::into)
}

fn main() {
    let Opts { log, bus, cmd } = Opts::parse();
    let server = matches!(cmd, Command::Server(..));

    if let Err(e) = log_init(&log, server) {
        eprintln!("Error initializing logger: {e}");
    }

    let result = run(bus, cmd);

    if let Err(e) = result {
        error!("{e:?}");
        std::process::exit(1);
    }
}

fn run(bus: opts::BusOpts, cmd: Command) -> Result {
    let rt = RtBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("Error starting runtime")?;

    match cmd {
        Command::Server(opts) => rt.block_on(server::run(bus, opts)),
        Command::Client(cmd) => rt.block_on(client::run(bus, cmd)),
    }
}
