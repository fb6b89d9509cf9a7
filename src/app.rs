use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::ConverterConfig;

pub fn run() -> std::io::Result<()> {
    let config = match ConverterConfig::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            error!(error = %err, "Failed to load configuration");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err));
        }
    };

    init_tracing(&config.log_filter);
    info!(
        preview_rows = config.preview.rows,
        chart_columns = config.chart.max_columns,
        "Starting tabconv"
    );

    actix_web::rt::System::new().block_on(async move {
        let server = crate::interfaces::http::start_server(&config)?;
        server.await
    })
}

/// `RUST_LOG` wins over the configured filter
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
