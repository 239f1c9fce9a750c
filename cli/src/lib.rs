use std::io::Write;

use engine::{
    config::{ApiKey, load_settings},
    error::GenerateError,
    fs::LocalFs,
    gemini::Gemini,
    orchestrator::Orchestrator,
};
use log::debug;

pub mod cli;
pub use cli::Cli;

/// Wires the Gemini client and the local filesystem into the pipeline and
/// runs it once. The credential is resolved by the caller.
pub async fn run(
    cli: &Cli,
    api_key: Result<ApiKey, GenerateError>,
    out: &mut impl Write,
) -> Result<(), GenerateError> {
    let api_key = api_key?;
    let settings = load_settings(cli.config.as_deref()).map_err(GenerateError::Settings)?;
    let model = cli.model.clone().unwrap_or(settings.model);
    debug!("Using model {model} at {}", settings.endpoint);

    let service =
        Gemini::new(api_key, model, settings.endpoint).with_image_size(settings.send_image_size);
    let orchestrator = Orchestrator::new(Box::new(service), Box::new(LocalFs));
    orchestrator.run(&cli.to_request(), out).await
}

/// Writes a failure to the error stream and returns the exit status for it.
pub fn report(err: &GenerateError, err_out: &mut impl Write) -> u8 {
    // nothing sensible left to do if stderr itself is gone
    _ = writeln!(err_out, "{err}");
    err.exit_code()
}
