use clap::Parser;
use jitsi_connector::cli::{Cli, Commands, ConfigAction, SettingsAction};
use jitsi_connector::config::{validate_config_object, Config, LoggingConfig};
use jitsi_connector::gateway::{open_settings_store, GatewayServer};
use jitsi_connector::logging;
use jitsi_connector::providers::{CallProvider, JitsiProvider, PersistedSettings, Settings};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(opts) => {
            let config = Config::load(opts.config.as_deref())?;
            logging::init(&config.logging);
            info!("Starting Jitsi connector");
            validate_config_object(&config)?;
            let server = GatewayServer::start(config, opts).await?;
            server.run_until_shutdown().await?;
        }
        Commands::Settings(opts) => {
            let config = Config::load(opts.config.as_deref())?;
            logging::init(&config.logging);
            let jitsi = &config.providers.jitsi;
            let store = open_settings_store(&config)?;
            let provider = JitsiProvider::initialize(&jitsi.params, store, jitsi.configuration)?;

            match opts.action {
                SettingsAction::Show => {
                    match provider.load_persisted() {
                        PersistedSettings::Found(_) => info!("Showing persisted settings"),
                        PersistedSettings::Missing => info!("No persisted settings, showing defaults"),
                        PersistedSettings::Unreadable => {
                            warn!("Persisted settings unreadable, showing defaults")
                        }
                    }
                    println!("{}", serde_json::to_string_pretty(&provider.client_settings())?);
                }
                SettingsAction::Set { log_enabled } => {
                    provider.update_settings(Settings::new(log_enabled))?;
                    println!("{}", serde_json::to_string_pretty(&provider.settings())?);
                }
            }
        }
        Commands::Config(opts) => {
            logging::init(&LoggingConfig::default());
            match opts.action {
                ConfigAction::Show => {
                    let config = Config::load(opts.config.as_deref())?;
                    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
                }
                ConfigAction::Validate => {
                    let config = Config::load(opts.config.as_deref())?;
                    validate_config_object(&config)?;
                    info!("Configuration is valid");
                }
                ConfigAction::Init => {
                    Config::write_default(opts.config.as_deref().unwrap_or("jitsi-connector.json"))?;
                    info!("Configuration file created");
                }
            }
        }
        Commands::Version => {
            println!("jitsi-connector {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
