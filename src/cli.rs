use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "xtbug",
    version = env!("CARGO_PKG_VERSION"),
    about = "Realtime variable watch windows for running programs",
    long_about = "Realtime variable watch windows for running programs.\n\n\
        Without a subcommand, runs a demo that opens three watch windows.\n\
        Set XTBUG_TERMINAL=none to skip spawning terminals, XTBUG_LOG to enable logging."
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open three demo channels and feed them counters until Ctrl-C
    Demo {
        /// FIFO directory, defaults to $XTBUG_DIR or the system temp dir
        #[arg(long, env = "XTBUG_DIR")]
        dir: Option<PathBuf>,
    },

    /// Show one channel; this is what each terminal window runs
    Window {
        /// Channel index
        index: u32,
        /// FIFO directory, defaults to $XTBUG_DIR or the system temp dir
        #[arg(long, env = "XTBUG_DIR")]
        dir: Option<PathBuf>,
        /// Print a closing message when the stream ends
        #[arg(long)]
        hold: bool,
    },
}
