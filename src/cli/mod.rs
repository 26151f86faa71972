//! CLI module for tripflow
//!
//! Command-line parsing for the tripflow-server binary. Uses clap for argument
//! parsing and owo-colors for colored terminal output.

pub mod output;

use crate::types::TripRequest;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tripflow - concurrent trip-planning workflow engine
#[derive(Parser, Debug)]
#[command(
    name = "tripflow-server",
    version,
    about = "Tripflow - concurrent trip-planning workflow engine",
    long_about = "Plans trips by running flight, hotel, visa and activity searches concurrently,\n\
                  then building an itinerary from what they found. Progress streams live over\n\
                  WebSocket while the plan is assembled.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  tripflow-server                           # Start the server (reads tripflow.toml)\n    \
                  tripflow-server --config my.toml serve    # Use a custom config file\n    \
                  tripflow-server plan Lisbon --origin Berlin --days 4\n    \
                  tripflow-server config --validate         # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tripflow.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP and WebSocket server (default)
    Serve {
        /// Override the configured host address
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,

        /// Do not watch the configuration file for changes
        #[arg(long)]
        no_watch: bool,
    },

    /// Plan one trip locally and print the result
    Plan(PlanArgs),

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// Trip parameters for the `plan` subcommand
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Where to go
    pub destination: String,

    /// Where the trip starts
    #[arg(long)]
    pub origin: Option<String>,

    /// Travel dates, e.g. "2026-05-03 to 2026-05-07"
    #[arg(long)]
    pub dates: Option<String>,

    /// Trip length in days
    #[arg(long)]
    pub days: Option<u32>,

    #[arg(long, default_value_t = 1)]
    pub travelers: u32,

    /// Preferred currency code
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Favour cheap options
    #[arg(long)]
    pub strict_budget: bool,

    #[arg(long)]
    pub budget: Option<String>,

    /// Free-form notes passed to every collaborator
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Print the plan as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn to_request(&self) -> TripRequest {
        TripRequest {
            query: self.query.clone(),
            destination: Some(self.destination.clone()),
            origin: self.origin.clone(),
            dates: self.dates.clone(),
            days: self.days,
            travelers: self.travelers,
            travel_time: None,
            currency: self.currency.clone(),
            strict_budget: self.strict_budget,
            budget: self.budget.clone(),
        }
    }
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
