mod app;
mod cli;
mod config;
mod descriptor;
mod game;
mod library;
mod logging;
mod reconcile;
mod relations;
mod scan;
mod store;

use anyhow::Result;

fn main() -> Result<()> {
    cli::run()
}
