// src/main.rs
mod cli;
mod demo;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use std::{io::Write, process::exit};
use xtbug::constants::{HOLD_MESSAGE, LOG_EXTENSION};
use xtbug::transport::Transport;
use xtbug::window::{self, WindowConfig};

fn main() {
    let cli = Cli::parse();

    match cli.cmd.unwrap_or(Commands::Demo { dir: None }) {
        // ─────────────────────────── demo ──────────────────────────────────
        Commands::Demo { dir } => {
            logging::init_stderr();
            if let Err(e) = demo::run(dir) {
                eprintln!("xtbug demo error: {e:#}");
                exit(1);
            }
        }

        // ─────────────────────────── window ────────────────────────────────
        Commands::Window { index, dir, hold } => {
            let dir = dir.unwrap_or_else(xtbug::config::pipe_dir_from_env);
            let log = Transport::path_for(&dir, index).with_extension(LOG_EXTENSION);
            if let Err(e) = logging::init_file(&log) {
                eprintln!("xtbug: {e:#}");
            }

            let code = match window::run(&WindowConfig { index, dir }) {
                Ok(_) => 0,
                Err(e) => {
                    eprintln!("xtbug window error: {e}");
                    1
                }
            };
            if hold {
                println!("{HOLD_MESSAGE}");
            }
            std::io::stdout().flush().ok();
            exit(code);
        }
    }
}
