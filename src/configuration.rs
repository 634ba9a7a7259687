use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};

#[derive(Clone, Debug, Parser)]
#[clap(version, author)]
pub struct Cli {
    /// the listen address for the customer api
    #[clap(
        long = "listen-address",
        default_value = "0.0.0.0:8080",
        help = "Listen address for the server.",
        env = "GROCERY_STORE_API_LISTEN_ADDRESS"
    )]
    pub listen_address: SocketAddr,

    /// Address to listen for monitoring related requests
    #[arg(
        long = "monitoring-listen",
        help = "Listen address for the health check and metrics server.",
        default_value = "127.0.0.1:8003",
        env = "GROCERY_STORE_API_MONITORING_ADDRESS"
    )]
    pub monitoring_listen: SocketAddr,

    /// the file holding the serialized customer list
    #[clap(
        long = "data-file",
        default_value = "database.json",
        help = "Path to the JSON file backing the customer store. Created if missing.",
        env = "GROCERY_STORE_API_DATA_FILE"
    )]
    pub data_file: PathBuf,

    /// log level to start this service
    #[clap(
        long = "log-level",
        default_value = "info",
        help = "Maximum log level.",
        env = "GROCERY_STORE_API_LOG_LEVEL"
    )]
    pub log_level: tracing_subscriber::filter::LevelFilter,

    /// whether headers should be logged or not for requests and responses
    #[clap(
        long = "log-headers",
        help = "Whether to log headers for requests and responses.",
        env = "GROCERY_STORE_API_LOG_HEADERS"
    )]
    pub log_headers: bool,

    /// the request timeout in milliseconds
    #[clap(
        long = "request-timeout",
        help = "Request timeout in milliseconds.",
        default_value = "5000",
        env = "GROCERY_STORE_API_REQUEST_TIMEOUT"
    )]
    pub request_timeout: u64,
}
