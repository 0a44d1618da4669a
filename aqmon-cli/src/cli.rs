use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use tracing::info;

use aqmon_core::{City, Config, Dashboard, Period, SeriesKind, city::DEFAULT_CITY};

use crate::{
    client::{DEFAULT_SERVER, DashboardClient, ReadingCache},
    export::ExportSnapshot,
    render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aqmon", version, about = "Air quality and weather monitor for Indian cities")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG still applies).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Address to bind, overrides the config file.
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on, overrides the config file and PORT.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store the OpenWeatherMap API key and default city.
    Configure,

    /// Show current air quality and weather.
    Show {
        /// City key, e.g. "bengaluru" or "delhi".
        #[arg(long)]
        city: Option<String>,
    },

    /// Print a synthetic historical series.
    History {
        /// "aqi" or "weather".
        kind: SeriesKind,

        /// "24h", "7d" or "30d".
        #[arg(long, default_value = "24h")]
        period: Period,
    },

    /// Compare current AQI and temperature across all cities.
    Compare,

    /// Poll a running server and print the latest readings.
    Watch {
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,

        #[arg(long, default_value = DEFAULT_CITY)]
        city: String,

        /// Seconds between polls.
        #[arg(long, default_value_t = 600)]
        interval_secs: u64,

        /// Poll once and exit.
        #[arg(long)]
        once: bool,
    },

    /// Save current and 24h historical data as JSON and CSV.
    Export {
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,

        #[arg(long, default_value = DEFAULT_CITY)]
        city: String,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Serve { bind, port } => {
                let mut config = Config::load_with_env()?;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }
                aqmon_server::run(&config).await
            }
            Command::Configure => configure(),
            Command::Show { city } => {
                let dashboard = local_dashboard()?;
                let current = dashboard.current(city.as_deref()).await?;
                let city = City::lookup(&current.city)?;

                print!("{}", render::air_quality(city.name, &current.air_quality));
                print!("{}", render::weather(&current.weather));
                print!("{}", render::advice(&current.air_quality));
                Ok(())
            }
            Command::History { kind, period } => {
                let series = local_dashboard()?.historical(kind, period);
                print!("{}", render::series(&series));
                Ok(())
            }
            Command::Compare => {
                let comparison = local_dashboard()?.compare().await?;
                print!("{}", render::comparison(&comparison));
                Ok(())
            }
            Command::Watch { server, city, interval_secs, once } => {
                watch(&server, &city, Duration::from_secs(interval_secs.max(1)), once).await
            }
            Command::Export { server, city, out_dir } => export(&server, &city, &out_dir).await,
        }
    }
}

fn local_dashboard() -> Result<Dashboard> {
    let config = Config::load_with_env()?;
    Dashboard::from_config(&config)
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let mut prompt = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation();
    if config.is_configured() {
        prompt = prompt.with_help_message("Leave empty to keep the current key");
    }
    let api_key = prompt.prompt().context("API key prompt cancelled")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let names: Vec<&str> = City::all().iter().map(|c| c.name).collect();
    let current = config.default_city().map(|c| c.key).unwrap_or(DEFAULT_CITY);
    let cursor = City::all().iter().position(|c| c.key == current).unwrap_or(0);
    let choice = Select::new("Default city:", names)
        .with_starting_cursor(cursor)
        .raw_prompt()
        .context("City prompt cancelled")?;
    config.set_default_city(&City::all()[choice.index]);

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn watch(server: &str, city: &str, interval: Duration, once: bool) -> Result<()> {
    let client = DashboardClient::new(server)?;
    let name = City::lookup(city)?.name;

    let mut air_cache = ReadingCache::default();
    let mut weather_cache = ReadingCache::default();
    let mut ticker = tokio::time::interval(interval);

    info!(server, city, ?interval, "Watching");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let (air, weather) = tokio::join!(client.air_quality(Some(city)), client.weather(Some(city)));
        let air = air_cache.update(air);
        let weather = weather_cache.update(weather);

        println!("---- {} ----", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
        print!("{}", render::reading("Air quality", &air, |s| {
            format!("{}{}", render::air_quality(name, s), render::advice(s))
        }));
        print!("{}", render::reading("Weather", &weather, render::weather));

        if once {
            break;
        }
    }

    Ok(())
}

async fn export(server: &str, city: &str, out_dir: &std::path::Path) -> Result<()> {
    let client = DashboardClient::new(server)?;
    let city = City::lookup(city)?;

    let (air_quality, weather, air_history, weather_history) = tokio::try_join!(
        client.air_quality(Some(city.key)),
        client.weather(Some(city.key)),
        client.historical(SeriesKind::Aqi, Period::Day),
        client.historical(SeriesKind::Weather, Period::Day),
    )
    .context("Failed to fetch export data")?;

    let snapshot = ExportSnapshot::new(city, air_quality, weather, air_history, weather_history);
    let (json_path, csv_path) = snapshot.write_to(out_dir)?;

    println!("Exported {} and {}", json_path.display(), csv_path.display());
    Ok(())
}
