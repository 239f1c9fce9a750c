use std::{io, process::ExitCode};

use clap::Parser;
use color_eyre::Result;
use engine::config::ApiKey;
use gemini_imagen::{Cli, report, run};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    pretty_env_logger::init();
    color_eyre::install()?;
    let cli = Cli::parse();

    match run(&cli, ApiKey::from_env(), &mut io::stdout()).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => Ok(ExitCode::from(report(&e, &mut io::stderr()))),
    }
}
