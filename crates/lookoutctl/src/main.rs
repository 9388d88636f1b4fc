// # lookoutctl - Lookout CLI
//
// Thin command-line front end for the lookout system.
//
// This binary is an integration layer ONLY:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Registering geolocation providers
// 4. Dispatching one subcommand through the core Tracker
//
// All lookup, persistence and fallback logic lives in lookout-core and
// the provider crates. Rendering is plain JSON on stdout.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `LOOKOUT_DATA_DIR`: Root of the persisted documents (default: lookout_data)
// - `LOOKOUT_PRIMARY_URL`: Primary geolocation endpoint (default: ip-api.com)
// - `LOOKOUT_SECONDARY_URL`: Fallback geolocation endpoint (default: ipinfo.io)
// - `LOOKOUT_TIMEOUT_SECS`: Per-request timeout in seconds (default: 10)
// - `LOOKOUT_LOG_LEVEL`: trace|debug|info|warn|error (default: info)
//
// ## Usage
//
// ```bash
// lookoutctl track-ip [ip]
// lookoutctl public-ip
// lookoutctl phone <number>
// lookoutctl validate-phone <number>
// lookoutctl register-device <nickname> <kind> <brand> <model> [imei] [serial] [purchase-date]
// lookoutctl checkin-device <index>
// lookoutctl device-history <index>
// lookoutctl list-devices
// lookoutctl journal
// lookoutctl clear-journal
// ```

use std::env;
use std::process::ExitCode;

use anyhow::Result;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use lookout_core::{
    DeviceForm, GeoProviderConfig, ProviderRegistry, Tracker, TrackerConfig,
};
use lookout_phone::PhoneDirectory;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum CliExitCode {
    /// Operation completed
    Success = 0,
    /// Configuration or usage error
    ConfigError = 1,
    /// Operation failed at runtime
    RuntimeError = 2,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration read from the environment
struct CliConfig {
    data_dir: String,
    primary_url: String,
    secondary_url: String,
    timeout_secs: u64,
    log_level: String,
}

impl CliConfig {
    fn from_env() -> Self {
        Self {
            data_dir: env::var("LOOKOUT_DATA_DIR").unwrap_or_else(|_| "lookout_data".to_string()),
            primary_url: env::var("LOOKOUT_PRIMARY_URL")
                .unwrap_or_else(|_| lookout_geo_ipapi::DEFAULT_URL.to_string()),
            secondary_url: env::var("LOOKOUT_SECONDARY_URL")
                .unwrap_or_else(|_| lookout_geo_ipinfo::DEFAULT_URL.to_string()),
            timeout_secs: env::var("LOOKOUT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            log_level: env::var("LOOKOUT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            data_dir: self.data_dir.clone().into(),
            providers: vec![
                GeoProviderConfig::IpApi {
                    url: self.primary_url.clone(),
                    timeout_secs: self.timeout_secs,
                },
                GeoProviderConfig::IpInfo {
                    url: self.secondary_url.clone(),
                    timeout_secs: self.timeout_secs,
                },
            ],
            engine: Default::default(),
        }
    }
}

const USAGE: &str = "Usage: lookoutctl <command> [args]

Commands:
  track-ip [ip]           Geolocate an IP (your own when omitted) and record it
  public-ip               Print your public IP, nothing recorded
  phone <number>          Look up phone-number metadata and record it
  validate-phone <number> Parse/validate a phone number, nothing recorded
  register-device <nickname> <kind> <brand> <model> [imei] [serial] [purchase-date]
  checkin-device <index>  Record the current IP location against a device
  device-history <index>  Show a device's most recent check-ins
  list-devices            Show all registered devices
  journal                 Show the activity journal
  clear-journal           Delete the activity journal";

fn main() -> ExitCode {
    let config = CliConfig::from_env();

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CliExitCode::ConfigError.into();
    }

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        return CliExitCode::ConfigError.into();
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CliExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_command(&config, &args).await {
            Ok(()) => CliExitCode::Success,
            Err(e) => {
                error!("{}", e);
                CliExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Build the tracker from configuration and registered providers
fn build_tracker(config: &CliConfig) -> Result<Tracker> {
    let registry = ProviderRegistry::new();
    lookout_geo_ipapi::register(&registry);
    lookout_geo_ipinfo::register(&registry);

    let tracker_config = config.tracker_config();
    tracker_config.validate()?;

    let providers = registry.create_chain(&tracker_config.providers)?;
    let tracker = Tracker::new(tracker_config, providers, Box::new(PhoneDirectory::new()))?;
    Ok(tracker)
}

/// Dispatch one subcommand
async fn run_command(config: &CliConfig, args: &[String]) -> Result<()> {
    let tracker = build_tracker(config)?;

    match args[0].as_str() {
        "track-ip" => {
            let ip = args.get(1).map(String::as_str);
            let record = tracker.track_ip(ip).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        "public-ip" => {
            let ip = tracker.public_ip().await?;
            println!("{}", ip);
        }
        "phone" => {
            let number = args.get(1).ok_or_else(|| anyhow::anyhow!(USAGE))?;
            let record = tracker.lookup_phone(number).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        "validate-phone" => {
            let number = args.get(1).ok_or_else(|| anyhow::anyhow!(USAGE))?;
            let validation = tracker.validate_phone(number)?;
            println!("{}", serde_json::to_string_pretty(&validation)?);
        }
        "register-device" => {
            if args.len() < 5 {
                anyhow::bail!(USAGE);
            }
            let form = DeviceForm {
                nickname: args[1].clone(),
                kind: args[2].clone(),
                brand: args[3].clone(),
                model: args[4].clone(),
                imei: args.get(5).cloned().unwrap_or_default(),
                serial: args.get(6).cloned().unwrap_or_default(),
                purchase_date: args.get(7).cloned().unwrap_or_default(),
            };
            let device = tracker.register_device(form).await?;
            info!("Registered device {}", device.device_id);
            println!("{}", serde_json::to_string_pretty(&device)?);
        }
        "checkin-device" => {
            let index: usize = parse_index(args.get(1))?;
            let checkin = tracker.checkin_device(index).await?;
            println!("{}", serde_json::to_string_pretty(&checkin)?);
        }
        "device-history" => {
            let index: usize = parse_index(args.get(1))?;
            let history = tracker.device_history(index).await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        "list-devices" => {
            let devices = tracker.list_devices().await?;
            println!("{}", serde_json::to_string_pretty(&devices)?);
        }
        "journal" => {
            let entries = tracker.journal().await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        "clear-journal" => {
            tracker.clear_journal().await?;
            info!("Journal cleared");
        }
        other => {
            anyhow::bail!("Unknown command: {}\n\n{}", other, USAGE);
        }
    }

    Ok(())
}

fn parse_index(arg: Option<&String>) -> Result<usize> {
    arg.ok_or_else(|| anyhow::anyhow!(USAGE))?
        .parse()
        .map_err(|_| anyhow::anyhow!("Device index must be a non-negative integer"))
}
