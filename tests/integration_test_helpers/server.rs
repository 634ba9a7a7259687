use std::{
    net::{SocketAddr, TcpStream},
    path::PathBuf,
    sync::{Arc, OnceLock},
    thread,
    time::{Duration, Instant},
};

use grocery_store_api::{configuration::Cli, logging, service};
use tempfile::TempDir;
use tracing::{info, level_filters::LevelFilter};

use crate::integration_test_helpers::rest_client::{self, RestClient};

const REST_PORT: u16 = 18000;
const MONITORING_PORT: u16 = 18001;

fn config(data_file: PathBuf) -> Cli {
    Cli {
        listen_address: SocketAddr::new("127.0.0.1".parse().unwrap(), REST_PORT),
        monitoring_listen: SocketAddr::new("127.0.0.1".parse().unwrap(), MONITORING_PORT),
        data_file,
        log_level: LevelFilter::INFO,
        log_headers: true,
        request_timeout: 1000u64,
    }
}

#[derive(Debug, Clone)]
pub struct ServerHandle {
    properties:        Arc<ServerProperties>,
    rest_client:       RestClient,
    monitoring_client: RestClient,
    // Kept alive for as long as the handle is reachable from the static.
    _runtime:          Arc<tokio::runtime::Runtime>,
    _data_dir:         Arc<TempDir>,
}

#[allow(dead_code)]
#[derive(Debug)]
pub struct ServerProperties {
    pub rest_url:       String,
    pub monitoring_url: String,
    pub data_file:      PathBuf,
}

#[allow(dead_code)]
impl ServerHandle {
    pub fn rest_client(&self) -> &RestClient {
        &self.rest_client
    }

    pub fn monitoring_client(&self) -> &RestClient {
        &self.monitoring_client
    }

    pub fn properties(&self) -> &ServerProperties {
        &self.properties
    }
}

static START_SERVER_ONCE: OnceLock<ServerHandle> = OnceLock::new();

pub fn start_server() -> ServerHandle {
    Clone::clone(START_SERVER_ONCE.get_or_init(start_server_impl))
}

fn wait_for_port(port: u16) {
    let start = Instant::now();
    while TcpStream::connect(("127.0.0.1", port)).is_err() {
        if start.elapsed() > Duration::from_secs(60) {
            panic!("server did not start within 60 seconds");
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn start_server_impl() -> ServerHandle {
    // Create runtime that persists between tests
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()
        .expect("tokio runtime");

    let data_dir = tempfile::tempdir().expect("data directory");
    let config = config(data_dir.path().join("database.json"));
    logging::init(&config).unwrap();

    // start customer service
    let service_config = config.clone();
    runtime.spawn(async move {
        info!("starting grocery store api for test");
        if let Err(e) = service::run_service(service_config).await {
            eprintln!("grocery-store-api exited with error: {:?}", e);
        }
    });

    // create connection urls for server
    let properties = ServerProperties {
        rest_url:       format!("http://127.0.0.1:{}", REST_PORT),
        monitoring_url: format!("http://127.0.0.1:{}", MONITORING_PORT),
        data_file:      config.data_file.clone(),
    };

    info!("waiting for the grocery store api to start...");
    wait_for_port(MONITORING_PORT);
    wait_for_port(REST_PORT);

    // create clients
    let rest_client = rest_client::create_client(properties.rest_url.clone());
    let monitoring_client = rest_client::create_client(properties.monitoring_url.clone());

    info!("grocery store api started with properties:\n{:#?}", properties);

    ServerHandle {
        properties: Arc::new(properties),
        rest_client,
        monitoring_client,
        _runtime: Arc::new(runtime),
        _data_dir: Arc::new(data_dir),
    }
}
