//! Clap derive structures for the `smarthome` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use smarthome_config::Defaults;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// smarthome -- control a smart home from the command line
#[derive(Debug, Parser)]
#[command(
    name = "smarthome",
    version,
    about = "Control smart-home devices from the command line",
    long_about = "Manage devices, scenarios, notifications and locations of a smart-home\n\
        backend. Every command also works in demo mode, which answers from\n\
        built-in sample data without contacting a server.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format [default: table]
    #[arg(long, short = 'o', env = "SMARTHOME_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds [default: 10]
    #[arg(long, env = "SMARTHOME_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// File holding the persisted server settings and session
    #[arg(long, env = "SMARTHOME_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,
}

impl GlobalOpts {
    /// Fill unset flags from the config file defaults.
    pub fn apply_defaults(&mut self, defaults: &Defaults) {
        if self.output.is_none() {
            self.output = OutputFormat::from_str(&defaults.output, true).ok();
        }
        if self.color.is_none() {
            self.color = ColorMode::from_str(&defaults.color, true).ok();
        }
        if self.timeout.is_none() {
            self.timeout = Some(defaults.timeout);
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage devices, commands and device history
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage automation scenarios
    #[command(alias = "sc")]
    Scenarios(ScenariosArgs),

    /// View and manage notifications
    #[command(alias = "notif", alias = "n")]
    Notifications(NotificationsArgs),

    /// Query statistics and reports
    Stats(StatsArgs),

    /// Manage locations and their rooms
    #[command(alias = "loc")]
    Locations(LocationsArgs),

    /// Manage the user account
    Users(UsersArgs),

    /// Log in and store the session token
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the current user
    Whoami,

    /// Test the connection to the server
    Status,

    /// Manage server URL, demo mode and CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared payload arguments ─────────────────────────────────────────

/// JSON payload given inline or read from a file.
#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// Inline JSON payload
    #[arg(long, conflicts_with = "from_file")]
    pub data: Option<String>,

    /// Read the JSON payload from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List,

    /// Show one device
    Get {
        /// Device id
        id: String,
    },

    /// Register a new device
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Device type (light, thermostat, lock, ...)
        #[arg(long = "type", short = 't')]
        device_type: String,

        /// Room the device is in
        #[arg(long)]
        room: Option<String>,

        /// Device category
        #[arg(long)]
        category: Option<String>,

        /// Device sub-type
        #[arg(long)]
        sub_type: Option<String>,

        /// Initial properties (key=value, repeatable)
        #[arg(long = "prop", short = 'p', value_name = "KEY=VALUE")]
        properties: Vec<String>,
    },

    /// Change device fields
    Update {
        /// Device id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        room: Option<String>,

        /// Properties to set (key=value, repeatable)
        #[arg(long = "prop", short = 'p', value_name = "KEY=VALUE")]
        properties: Vec<String>,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device id
        id: String,
    },

    /// Send a command to a device
    #[command(alias = "cmd")]
    Command {
        /// Device id
        id: String,

        /// Command name
        #[arg(default_value = "setState")]
        command: String,

        /// Command parameters (key=value, repeatable)
        #[arg(long = "param", short = 'P', value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Switch a device on (setState tb_power=on)
    On {
        /// Device id
        id: String,
    },

    /// Switch a device off (setState tb_power=off)
    Off {
        /// Device id
        id: String,
    },

    /// Show the live status of a device
    Status {
        /// Device id
        id: String,
    },

    /// List devices available for registration
    Available,

    /// Synchronize a device with ThingsBoard
    Sync {
        /// Device id
        id: String,
    },

    /// Device history (temperature, humidity, lock, sensor alerts)
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IntervalArg {
    Hour,
    Day,
    Week,
    Month,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// Temperature samples
    Temperature {
        /// Device id
        id: String,

        /// Sampling interval
        #[arg(long, short = 'i', default_value = "day")]
        interval: IntervalArg,
    },

    /// Humidity samples
    Humidity {
        /// Device id
        id: String,

        /// Sampling interval
        #[arg(long, short = 'i', default_value = "day")]
        interval: IntervalArg,
    },

    /// Lock/unlock events (all locks when no id is given)
    Lock {
        /// Device id
        id: Option<String>,
    },

    /// Record a lock event
    AddLock {
        /// Device id
        id: String,

        /// lock or unlock
        #[arg(long, default_value = "lock")]
        action: String,

        #[arg(long)]
        user: Option<String>,

        /// How the lock was operated (app, key, pin, ...)
        #[arg(long)]
        method: Option<String>,
    },

    /// Sensor alert history (all devices when no id is given)
    Sensor {
        /// Device id
        id: Option<String>,
    },

    /// Record a sensor alert
    AddSensor {
        /// Device id
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Acknowledge sensor alerts
    Ack {
        /// Acknowledge a single entry
        #[arg(long, conflicts_with_all = ["device", "all"])]
        entry: Option<String>,

        /// Acknowledge every entry of one device
        #[arg(long, conflicts_with = "all")]
        device: Option<String>,

        /// Acknowledge everything
        #[arg(long)]
        all: bool,
    },
}

// ── Scenarios ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScenariosArgs {
    #[command(subcommand)]
    pub command: ScenariosCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScenariosCommand {
    /// List scenarios
    #[command(alias = "ls")]
    List,

    /// Show one scenario
    Get { id: String },

    /// Create a scenario from JSON
    Create {
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Replace a scenario from JSON
    Update {
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a scenario
    #[command(alias = "rm")]
    Delete { id: String },

    /// Run a scenario now
    Run { id: String },
}

// ── Notifications ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NotificationStatusArg {
    All,
    Read,
    Unread,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// List notifications
    #[command(alias = "ls")]
    List {
        /// Filter by read state
        #[arg(long, short = 's', default_value = "all")]
        status: NotificationStatusArg,
    },

    /// Mark a notification as read
    Read { id: String },

    /// Delete a notification
    #[command(alias = "rm")]
    Delete { id: String },
}

// ── Stats ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Dashboard counters and recent events
    Dashboard,

    /// Energy consumption for a period
    Energy {
        /// day, week, month, ...
        #[arg(default_value = "day")]
        period: String,
    },

    /// Consumption statistics for a period
    Consumption {
        #[arg(default_value = "month")]
        period: String,
    },

    /// Per-device usage statistics
    Usage,

    /// Device activity history
    Activity {
        /// Query parameters (key=value, repeatable)
        #[arg(long = "param", short = 'P', value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}

// ── Locations ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub command: LocationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocationsCommand {
    /// List locations
    #[command(alias = "ls")]
    List,

    /// Show one location
    Get { id: String },

    /// Create a location
    Create {
        /// Location name (ignored when a payload is given)
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Replace a location from JSON
    Update {
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a location
    #[command(alias = "rm")]
    Delete { id: String },

    /// Manage the rooms of a location
    Rooms(RoomsArgs),
}

#[derive(Debug, Args)]
pub struct RoomsArgs {
    #[command(subcommand)]
    pub command: RoomsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoomsCommand {
    /// List rooms of a location
    #[command(alias = "ls")]
    List { location: String },

    /// Create a room
    Create {
        location: String,

        /// Room name (ignored when a payload is given)
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Replace a room from JSON
    Update {
        location: String,
        room: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a room
    #[command(alias = "rm")]
    Delete { location: String, room: String },
}

// ── Users & session ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// Show the current user
    Me,

    /// Update the current user from JSON
    Update {
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Register a new account from JSON
    Register {
        #[command(flatten)]
        payload: PayloadArgs,
    },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account e-mail
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "SMARTHOME_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show server settings and CLI defaults
    Show,

    /// Set the server URL (normalized to end in /api)
    SetServer {
        /// e.g. 192.168.1.20:3000 or https://home.example.com
        url: String,
    },

    /// Turn demo mode on or off
    Demo { state: Toggle },

    /// Restore the default server URL and leave demo mode
    Reset,

    /// Print the config and state file paths
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
