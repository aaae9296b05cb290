//! Interaction fetcher HTTP service entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use interaction_fetcher::{
    BatchCoordinator, FetchError, FetcherConfig, OctocrabInteractionGateway, PersonalAccessToken,
    server,
};
use ortho_config::OrthoConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,interaction_fetcher=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), FetchError> {
    let config = load_config()?;

    if config.show_version {
        return write_version();
    }

    config.validate()?;
    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let gateway = OctocrabInteractionGateway::for_token(&token, config.api_base())?
        .with_page_size(config.page_size)?;
    let coordinator = Arc::new(BatchCoordinator::new(
        Arc::new(gateway),
        config.walk_options(),
    ));

    let static_dir = config.static_dir();
    let app = server::router(coordinator, static_dir.as_deref());
    server::serve(config.bind_address(), app).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`FetchError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<FetcherConfig, FetchError> {
    FetcherConfig::load().map_err(|error| FetchError::Configuration {
        message: error.to_string(),
    })
}

fn write_version() -> Result<(), FetchError> {
    writeln!(io::stdout().lock(), "v{}", env!("CARGO_PKG_VERSION")).map_err(|error| {
        FetchError::Io {
            message: error.to_string(),
        }
    })
}
