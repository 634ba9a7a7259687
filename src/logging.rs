use crate::configuration::Cli;

pub fn init(cli: &Cli) -> anyhow::Result<()> {
    {
        use tracing_subscriber::prelude::*;
        let log_filter = tracing_subscriber::filter::Targets::new()
            .with_target(env!("CARGO_CRATE_NAME"), cli.log_level)
            .with_target("tower_http", cli.log_level);
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(log_filter)
            .try_init()?;
    }

    {
        tracing::info!("Starting service version {}", env!("CARGO_PKG_VERSION"));
        tracing::info!("Using data file: {}", cli.data_file.display());
        tracing::info!("Listening on: {}", cli.listen_address);
        tracing::info!("Monitoring on: {}", cli.monitoring_listen);
    }

    Ok(())
}
