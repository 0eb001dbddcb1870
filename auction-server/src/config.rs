use {
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    std::{
        fs,
        time::Duration,
    },
};

pub mod server;

#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the auction server service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,

    /// The bearer token that admin endpoints require.
    #[arg(long = "admin-api-key")]
    #[arg(env = "ADMIN_API_KEY")]
    pub admin_api_key: String,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file containing the auction room runtime settings
    #[arg(long = "config")]
    #[arg(env = "AUCTION_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub ws:        WsConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LifecycleConfig {
    /// How often the scheduler checks for auctions whose start or end time
    /// has passed. Bounds how far after its scheduled edge a room actually
    /// opens or closes.
    #[serde(with = "humantime_serde", default = "default_tick_interval")]
    pub tick_interval: Duration,
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WsConfig {
    /// Capacity of the broadcast channel that fans room updates out to
    /// websocket subscribers. Subscribers that fall further behind than this
    /// are resynced with a fresh snapshot.
    #[serde(default = "default_broadcast_channel_size")]
    pub broadcast_channel_size:   usize,
    /// The header to read the requester ip address from.
    #[serde(default = "default_requester_ip_header_name")]
    pub requester_ip_header_name: String,
}

fn default_broadcast_channel_size() -> usize {
    1000
}

fn default_requester_ip_header_name() -> String {
    "X-Forwarded-For".to_string()
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            broadcast_channel_size:   default_broadcast_channel_size(),
            requester_ip_header_name: default_requester_ip_header_name(),
        }
    }
}
