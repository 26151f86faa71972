//! Colored output helpers for CLI
//!
//! Consistent, colored terminal output for the tripflow CLI.

use crate::status::StatusEvent;
use crate::types::TripPlan;
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "tripflow".bright_cyan().bold(),
                version.dimmed(),
                "concurrent trip planning".bright_white()
            );
        } else {
            println!("\n   tripflow {}\n   concurrent trip planning\n", version);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// One live progress line
    pub fn status(&self, event: &StatusEvent) {
        let step = event.step.as_deref().unwrap_or("-");
        if self.colored {
            println!("  {} {}", format!("[{}]", step).dimmed(), event.status.bright_white());
        } else {
            println!("  [{}] {}", step, event.status);
        }
    }

    /// Human-readable summary of a finished plan
    pub fn plan_summary(&self, plan: &TripPlan) {
        self.header(&format!("Trip to {}", plan.destination));
        if let Some(origin) = &plan.origin {
            self.kv("From", origin);
        }
        self.kv("Estimated total", &plan.total_budget);
        self.kv(
            "Flights",
            &format!(
                "{} outbound, {} return",
                plan.outbound_flights.len(),
                plan.return_flights.len()
            ),
        );
        self.kv("Visa required", if plan.visa.required { "yes" } else { "no" });

        if !plan.hotels.is_empty() {
            self.subheader("Hotels");
            for hotel in &plan.hotels {
                self.list_item(&format!(
                    "{} ({}, {:.1})",
                    hotel.name, hotel.price_per_night, hotel.rating
                ));
            }
        }

        if !plan.itinerary.is_empty() {
            self.subheader("Itinerary");
            for day in &plan.itinerary {
                let names: Vec<&str> = day.activities.iter().map(|a| a.name.as_str()).collect();
                self.list_item(&format!("Day {}: {}", day.day, names.join(", ")));
            }
        }

        if !plan.defaults_applied.is_empty() {
            self.warning(&format!(
                "No data for: {} (defaults used)",
                plan.defaults_applied.join(", ")
            ));
        }
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}
