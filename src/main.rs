use clap::Parser;

use em_sandbox::app::{self, Cli};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    app::run(Cli::parse())
}
