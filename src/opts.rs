use std::path::PathBuf;

/// The well-known name requested by the server and targeted by the client
pub const DEFAULT_BUS_NAME: &str = "org.fcitx.Fcitx.CommitString";

#[derive(clap::Parser)]
#[command(author, version, max_term_width = 80)]
/// A D-Bus endpoint for committing text into the focused input context.
pub struct Opts {
    #[command(flatten)]
    pub log: LogOpts,

    #[command(flatten)]
    pub bus: BusOpts,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Default, clap::Args)]
pub struct LogOpts {
    /// Disable info logs (enabled by default if stderr is not a TTY)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable info logs, even if stderr is not a TTY
    #[arg(long, conflicts_with("quiet"), global = true)]
    pub no_quiet: bool,

    /// Output extra information to the console - specify multiple times to
    /// increase the log level further (maximum is TRACE)
    #[arg(
        short,
        long,
        global = true,
        action(clap::ArgAction::Count),
        conflicts_with("quiet"),
        conflicts_with("no_quiet")
    )]
    pub verbose: u8,
}

#[derive(Debug, Clone, clap::Args)]
pub struct BusOpts {
    /// Connect to the system bus rather than the session bus
    #[arg(long, global = true)]
    pub system: bool,

    /// The well-known bus name the server owns
    #[arg(long, global = true, default_value = DEFAULT_BUS_NAME)]
    pub name: String,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Serve the commit object and write committed text to an output
    Server(ServerOpts),
    #[command(flatten)]
    Client(ClientCommand),
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServerOpts {
    /// Append committed text to the given file instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Terminate each committed string with a null byte rather than a
    /// newline
    #[arg(short = '0', long)]
    pub zero: bool,

    /// Start with no focused input context, so commits are acknowledged but
    /// discarded
    #[arg(long)]
    pub unfocused: bool,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum ClientCommand {
    /// Commit a string to a running server
    Commit {
        /// The text to commit.  It is sent exactly as given, including any
        /// surrounding whitespace.
        text: String,

        /// Seconds to wait for the server to answer
        #[arg(short, long, default_value_t = 2.0)]
        timeout: f64,
    },
    /// Print the introspection data of a running server
    Introspect {
        /// Seconds to wait for the server to answer
        #[arg(short, long, default_value_t = 2.0)]
        timeout: f64,
    },
}
