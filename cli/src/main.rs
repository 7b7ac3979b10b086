use clap::Parser;
use owo_colors::OwoColorize;
use stargem_core::EconomyConfig;
use stargem_economy::EconomyService;
use stargem_storage::Storage;
use std::path::PathBuf;
use std::time::Duration;
use tokio::{signal, time};

#[derive(Parser)]
#[command(name = "stargemd")]
#[command(about = "Star gem economy daemon")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Data directory for aggregate snapshots
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Show version
    #[arg(short, long)]
    version: bool,
}

fn load_config(path: &PathBuf) -> EconomyConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: invalid config, using defaults: {}", e);
                EconomyConfig::default()
            }
        },
        Err(_) => EconomyConfig::default(),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.version {
        println!("stargemd 0.1.0");
        return;
    }

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from("stargem.toml"));
    let data_dir = cli.data_dir.unwrap_or_else(|| PathBuf::from("stargem-data"));

    println!("{}", "Star Gem Economy v0.1.0".cyan().bold());
    println!("Config file: {:?}", config_path);
    println!("Data dir:    {:?}\n", data_dir);

    let config = load_config(&config_path);
    let sweep_interval = config.sweep_interval_secs.max(1);

    let storage = match Storage::open(&data_dir) {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("Cannot open data directory: {}", e);
            std::process::exit(1);
        }
    };

    let service = EconomyService::load_all(config, storage);
    let stats = service.stats();

    println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());
    if service.is_enabled() {
        println!("{}: {}", "Economy".yellow().bold(), "enabled".green());
    } else {
        println!("{}: {}", "Economy".yellow().bold(), "disabled".red());
    }
    println!("{}: {}", "Accounts".yellow().bold(), stats.accounts);
    println!("{}: {}", "Shop entries".yellow().bold(), stats.shop_entries);
    println!(
        "{}: {} ({} active)",
        "Listings".yellow().bold(),
        stats.listings,
        stats.active_listings
    );
    println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("\n{}", "Shutting down...".yellow());
                if let Err(e) = service.shutdown() {
                    eprintln!("Final save failed: {}", e);
                }
                break;
            }
            _ = time::sleep(Duration::from_secs(sweep_interval)) => {
                match service.sweep_expired() {
                    Ok(0) => {}
                    Ok(removed) => log::info!("swept {} expired listings", removed),
                    Err(e) => log::warn!("sweep failed: {}", e),
                }
                if let Err(e) = service.save_all() {
                    log::warn!("periodic flush failed: {}", e);
                }
            }
        }
    }
}
