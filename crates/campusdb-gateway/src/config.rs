//! Gateway configuration.

use std::path::PathBuf;

use clap::Parser;

/// campusdb HTTP/JSON gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "campusdb-gateway")]
#[command(about = "HTTP/JSON gateway for the campusdb enrollment service")]
pub struct Args {
    /// Address to listen on for HTTP requests.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Directory for the sled data files.
    #[arg(short, long, default_value = "./campusdb-data")]
    pub data_dir: PathBuf,

    /// Run on the ephemeral in-memory store instead of sled.
    #[arg(long, default_value_t = false)]
    pub ephemeral: bool,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Directory for the sled data files.
    pub data_dir: PathBuf,
    /// Whether to run on the ephemeral in-memory store.
    pub ephemeral: bool,
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        Self {
            listen_addr: args.listen.clone(),
            data_dir: args.data_dir.clone(),
            ephemeral: args.ephemeral,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            data_dir: PathBuf::from("./campusdb-data"),
            ephemeral: false,
        }
    }
}
