//! CLI command definitions using clap
//!
//! Defines the command structure for the `fuellog` CLI tool.

use clap::{Parser, Subcommand, ValueEnum};

use crate::api::fuel_logs::PaymentMethod;

/// fuellog - Fuel log client
///
/// Log in to the fleet backend, list vehicles and record fuel purchases.
#[derive(Parser, Debug)]
#[command(name = "fuellog", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, log out and register
    Auth(AuthArgs),

    /// Browse vehicles
    Vehicle(VehicleArgs),

    /// Record and inspect fuel logs
    Log(LogArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication commands
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in with email and password
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(long, env = "FUEL_LOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and remove the stored token
    Logout,

    /// Show current authentication status
    Status,

    /// Create a new account
    Register {
        /// First name
        #[arg(long)]
        firstname: String,

        /// Last name
        #[arg(long)]
        lastname: String,

        /// Account email
        #[arg(long)]
        email: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: String,

        /// Account password (prompted when omitted)
        #[arg(long, env = "FUEL_LOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Vehicle Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Vehicle commands
#[derive(Parser, Debug)]
pub struct VehicleArgs {
    #[command(subcommand)]
    pub command: VehicleCommand,
}

#[derive(Subcommand, Debug)]
pub enum VehicleCommand {
    /// List vehicles available to you
    List,
}

// ─────────────────────────────────────────────────────────────────────────────
// Log Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Fuel log commands
#[derive(Parser, Debug)]
pub struct LogArgs {
    #[command(subcommand)]
    pub command: LogCommand,
}

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    /// Show the last recorded odometer reading of a vehicle
    Last {
        /// Vehicle id (quote it, e.g. '"42"', to send digits as text)
        #[arg(long)]
        vehicle: String,
    },

    /// Add a fuel log entry
    ///
    /// The fuel volume is derived from the total cost and the price per
    /// unit. The odometer must be above the vehicle's last recorded reading.
    Add {
        /// Vehicle id (quote it, e.g. '"42"', to send digits as text)
        #[arg(long)]
        vehicle: String,

        /// Total cost of the purchase
        #[arg(long, allow_hyphen_values = true)]
        total_cost: String,

        /// Price per unit of fuel
        #[arg(long, allow_hyphen_values = true)]
        price_per_unit: String,

        /// Odometer reading
        #[arg(long, allow_hyphen_values = true)]
        odometer: String,

        /// Where the fuel was bought
        #[arg(long)]
        location: String,

        /// Payment method
        #[arg(long, value_enum, default_value_t = PaymentArg::Cash)]
        payment: PaymentArg,
    },
}

/// Payment method argument
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PaymentArg {
    Cash,
    CreditCard,
    FuelCard,
}

impl From<PaymentArg> for PaymentMethod {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::Cash => PaymentMethod::Cash,
            PaymentArg::CreditCard => PaymentMethod::CreditCard,
            PaymentArg::FuelCard => PaymentMethod::FuelCard,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set a configuration value
    Set {
        /// Configuration key
        key: ConfigKey,

        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: ConfigKey,
    },

    /// Reset a configuration value to its default
    Remove {
        /// Configuration key
        key: ConfigKey,
    },
}

/// Available configuration keys
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ConfigKey {
    /// Backend base URL
    #[value(name = "api-url")]
    ApiUrl,

    /// Request timeout in seconds
    #[value(name = "timeout")]
    Timeout,

    /// Where the login token is kept (keyring, file, memory)
    #[value(name = "credential-backend")]
    CredentialBackend,
}
