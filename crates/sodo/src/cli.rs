//! Clap derive structures for the `sodo` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sodo -- floor-plan surveys for cameras and network gear
#[derive(Debug, Parser)]
#[command(
    name = "sodo",
    version,
    about = "Annotate floor plans with cameras, radios and network links",
    long_about = "Place surveillance cameras and network devices on a floor plan,\n\
        connect them, and export the diagram as JSON, a share link or a PNG.\n\n\
        The project is saved to the data directory after every change.",
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
    /// Directory holding the saved project (overrides config)
    #[arg(long, env = "SODO_DATA_DIR", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Open a shared project read-only for this invocation
    #[arg(long, global = true, value_name = "LINK")]
    pub share: Option<String>,

    /// Output format (overrides config)
    #[arg(long, short = 'o', env = "SODO_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
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
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Show, rename, reset, import or export the project
    #[command(alias = "p")]
    Project(ProjectArgs),

    /// Place and edit devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Link devices together
    #[command(alias = "conn", alias = "c")]
    Connections(ConnectionsArgs),

    /// Set or clear the floor-plan image
    #[command(alias = "fp")]
    Floorplan(FloorplanArgs),

    /// Bill of materials: device counts per category
    Bom,

    /// Print a read-only share link for the project
    Share,

    /// Export the diagram as a PNG image
    Render(RenderArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROJECT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Project summary
    Show,

    /// Rename the project
    Rename {
        /// New project name
        name: String,
    },

    /// Remove all devices, connections and the floor plan
    Reset,

    /// Write the project JSON to a file (default: "<name>.json")
    Export {
        /// Destination file, or "-" for stdout
        #[arg(long, short = 'f', value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Replace the project with a JSON export
    Import {
        /// Exported project file
        file: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

/// Editable device attributes shared by `add` and `update`.
#[derive(Debug, Default, Args)]
pub struct DeviceFields {
    /// Display name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Device type: dome-camera, bullet-camera, ptz-camera, wifi-emitter,
    /// ptp-radio, nvr, switch, router
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub category: Option<String>,

    /// active or maintenance
    #[arg(long)]
    pub status: Option<String>,

    /// IP address
    #[arg(long)]
    pub ip: Option<String>,

    /// MAC address
    #[arg(long)]
    pub mac: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Facing in degrees, 0 = up, clockwise
    #[arg(long, allow_hyphen_values = true)]
    pub rotation: Option<f64>,

    /// Field of view in degrees
    #[arg(long)]
    pub fov: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List,

    /// Device details
    Get {
        /// Device ID or exact name
        device: String,
    },

    /// Place a new device at image coordinates
    Add {
        /// X coordinate in image pixels
        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        /// Y coordinate in image pixels
        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        #[command(flatten)]
        fields: DeviceFields,
    },

    /// Edit device attributes
    Update {
        /// Device ID or exact name
        device: String,

        #[command(flatten)]
        fields: DeviceFields,
    },

    /// Drag a device to new coordinates
    Move {
        /// Device ID or exact name
        device: String,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },

    /// Turn a device to a heading or toward a point
    Rotate {
        /// Device ID or exact name
        device: String,

        /// Absolute heading in degrees, 0 = up, clockwise
        #[arg(long, allow_hyphen_values = true, conflicts_with = "toward")]
        degrees: Option<f64>,

        /// Face the point "X,Y" in image coordinates
        #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
        toward: Option<String>,
    },

    /// Delete a device and every connection touching it
    #[command(alias = "rm")]
    Remove {
        /// Device ID or exact name
        device: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONNECTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConnectionsArgs {
    #[command(subcommand)]
    pub command: ConnectionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConnectionsCommand {
    /// List connections
    #[command(alias = "ls")]
    List,

    /// Connect two devices
    Add {
        /// Source device ID or name
        from: String,

        /// Target device ID or name
        to: String,

        /// wired or wireless
        #[arg(long = "type", short = 't', value_name = "MEDIUM")]
        medium: Option<String>,

        /// Optional label drawn on the link
        #[arg(long)]
        label: Option<String>,
    },

    /// Change a connection's medium or label
    Update {
        /// Connection ID
        connection: String,

        /// wired or wireless
        #[arg(long = "type", short = 't', value_name = "MEDIUM")]
        medium: Option<String>,

        /// New label; an empty string removes it
        #[arg(long)]
        label: Option<String>,
    },

    /// Delete a connection
    #[command(alias = "rm")]
    Remove {
        /// Connection ID
        connection: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FLOOR PLAN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FloorplanArgs {
    #[command(subcommand)]
    pub command: FloorplanCommand,
}

#[derive(Debug, Subcommand)]
pub enum FloorplanCommand {
    /// Load an image or the first page of a PDF as the floor plan
    Set {
        /// Image (PNG, JPEG, GIF, WebP, BMP) or PDF file
        file: PathBuf,
    },

    /// Remove the floor plan
    Clear,

    /// Floor-plan format and size
    Info,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RENDER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Destination PNG (default: "SODO_<name>.png")
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Pixel density
    #[arg(long, default_value = "2.0")]
    pub scale: f32,

    /// Ring this device as selected
    #[arg(long, value_name = "DEVICE")]
    pub highlight: Option<String>,

    /// Omit device names
    #[arg(long)]
    pub no_labels: bool,

    /// Omit radio coverage circles
    #[arg(long)]
    pub no_coverage: bool,

    /// Write the SVG scene instead of a PNG
    #[arg(long)]
    pub svg: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG & COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
