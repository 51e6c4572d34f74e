use astronaut_analysis::config::{AnalysisConfig, Args};
use astronaut_analysis::{perform_analysis, AnalysisError};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    let result = AnalysisConfig::try_from(args)
        .map_err(AnalysisError::from)
        .and_then(|config| perform_analysis(&config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
