use std::{fmt, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{InquireError, Password, Select, Text};
use weather_core::{Config, FileStore, QueryController, Resolution, UnitSystem};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default units.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Paris".
        city: String,

        /// Unit system; defaults to the configured one.
        #[arg(long, value_enum)]
        units: Option<UnitsArg>,

        /// Also print humidity, wind speed and observation time.
        #[arg(long)]
        details: bool,
    },

    /// List recently searched cities, most recent first.
    Recent,

    /// Menu-driven session: search, re-select recent cities, switch units.
    Interactive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for UnitSystem {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Metric => UnitSystem::Metric,
            UnitsArg::Imperial => UnitSystem::Imperial,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units, details } => {
                let config = Config::load()?;
                let mut ctl = controller(&config)?;
                let units = units.map(UnitSystem::from).unwrap_or(config.units);

                lookup(&mut ctl, &city, units).await;
                if details {
                    if let Some(snap) = ctl.details() {
                        println!("\n{}", render::details(&snap));
                    }
                }
                Ok(())
            }
            Command::Recent => {
                let store = Arc::new(FileStore::new(Config::data_dir()?));
                let recent = weather_core::RecentCities::initialize(store);
                println!("{}", render::recent(recent.current()));
                Ok(())
            }
            Command::Interactive => {
                let config = Config::load()?;
                let mut ctl = controller(&config)?;
                interactive(&mut ctl).await
            }
        }
    }
}

fn controller(config: &Config) -> anyhow::Result<QueryController> {
    let data_dir = Config::data_dir()?;
    tracing::debug!(dir = %data_dir.display(), "opening recent cities store");

    let store = Arc::new(FileStore::new(data_dir));
    QueryController::from_config(config, store)
}

/// Runs one lookup, printing the loading view first and the outcome after.
async fn lookup(ctl: &mut QueryController, city: &str, units: UnitSystem) {
    let ticket = ctl.begin(city, units);
    println!("{}", render::summary(&ctl.view()));

    let outcome = ctl.dispatcher().fetch(&ticket.request).await;
    if ctl.complete(&ticket, outcome) == Resolution::Stale {
        return;
    }

    println!("{}", render::summary(&ctl.view()));
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let units = Select::new("Default units:", vec![UnitSystem::Metric, UnitSystem::Imperial])
        .with_starting_cursor(match config.units {
            UnitSystem::Metric => 0,
            UnitSystem::Imperial => 1,
        })
        .prompt()
        .context("Failed to read default units")?;
    config.units = units;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

enum MenuChoice {
    Search,
    Recent(String),
    ToggleUnits(UnitSystem),
    Details,
    Quit,
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuChoice::Search => f.write_str("Search a city"),
            MenuChoice::Recent(city) => write!(f, "Recent: {city}"),
            MenuChoice::ToggleUnits(current) => {
                write!(f, "Switch to {}", current.toggle().scale_name())
            }
            MenuChoice::Details => f.write_str("See more details"),
            MenuChoice::Quit => f.write_str("Quit"),
        }
    }
}

async fn interactive(ctl: &mut QueryController) -> anyhow::Result<()> {
    loop {
        let mut choices = vec![MenuChoice::Search];
        choices.extend(ctl.recent().iter().cloned().map(MenuChoice::Recent));
        choices.push(MenuChoice::ToggleUnits(ctl.units()));
        if ctl.details().is_some() {
            choices.push(MenuChoice::Details);
        }
        choices.push(MenuChoice::Quit);

        let choice = match Select::new("Weather App", choices).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to read menu choice"),
        };

        match choice {
            MenuChoice::Search => {
                let city = match Text::new("Enter city name:").prompt() {
                    Ok(city) => city,
                    Err(InquireError::OperationCanceled) => continue,
                    Err(InquireError::OperationInterrupted) => return Ok(()),
                    Err(e) => return Err(e).context("Failed to read city name"),
                };
                let units = ctl.units();
                lookup(ctl, &city, units).await;
            }
            MenuChoice::Recent(city) => {
                let units = ctl.units();
                lookup(ctl, &city, units).await;
            }
            MenuChoice::ToggleUnits(_) => {
                let units = ctl.toggle_units();
                println!("Next searches use {}.", units.scale_name());
            }
            MenuChoice::Details => {
                if let Some(snap) = ctl.details() {
                    println!("{}", render::details(&snap));
                }
            }
            MenuChoice::Quit => return Ok(()),
        }
    }
}
