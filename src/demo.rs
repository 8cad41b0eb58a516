//! Three windows fed from one loop: everything, a subset, and the loop guard.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;
use xtbug::{config, snapshot, ChannelOptions, LaunchConfig, Session};

pub fn run(dir: Option<PathBuf>) -> Result<()> {
    let mut launch = LaunchConfig::from_env();
    if std::env::var_os(xtbug::constants::ENV_VIEWER).is_none() {
        launch = launch.viewer(std::env::current_exe().context("locate own executable")?);
    }
    let session = Session::with_boxed_launcher(
        dir.unwrap_or_else(config::pipe_dir_from_env),
        xtbug::launch::from_config(&launch),
    );

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("install Ctrl-C handler")?;

    let options = ChannelOptions::default();
    let mut everything = session.open_channel(&options)?;
    let mut subset = session.open_channel(&options)?;
    let mut forever = session.open_channel(&options)?;
    info!(dir = ?session.dir(), "demo channels open, Ctrl-C to stop");

    let mut aaa: u64 = 1;
    let mut bbb: u64 = 1;
    let mut ccc = String::new();
    while !stop.load(Ordering::SeqCst) && forever.submit_all(&snapshot!(aaa, bbb)) {
        aaa += 1;
        bbb = bbb.wrapping_add(aaa * 2);
        ccc = format!("{} ticks", aaa - 1);
        everything.submit(&snapshot!(aaa, bbb, ccc));
        subset.submit_named(&snapshot!(aaa, bbb, ccc), &["aaa", "bbb"]);
        thread::sleep(Duration::from_millis(10));
    }

    info!(ticks = aaa - 1, last = %ccc, "demo stopped");
    Ok(())
}
