//! Clap derive structures for the `breezly` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// breezly -- Breezeway properties, tasks and reservations from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "breezly",
    version,
    about = "Query and update Breezeway properties, tasks and reservations",
    long_about = "A CLI for the Breezeway property-management API.\n\n\
        Also runs the HTTP server (REST, MCP and Slack slash commands)\n\
        and an MCP server on stdio for desktop assistants.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "BREEZLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "BREEZEWAY_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Breezeway client id
    #[arg(long, env = "BREEZEWAY_API_KEY", global = true, hide_env = true)]
    pub client_id: Option<String>,

    /// Breezeway client secret
    #[arg(
        long,
        env = "BREEZEWAY_API_SECRET",
        global = true,
        hide_env = true,
        hide_env_values = true
    )]
    pub client_secret: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BREEZLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BREEZLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Plain text, one id per line (scripting)
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
    /// List, look up and edit properties
    #[command(alias = "prop", alias = "p")]
    Properties(PropertiesArgs),

    /// List tasks and sweep for completed work
    #[command(alias = "t")]
    Tasks(TasksArgs),

    /// List reservations
    #[command(alias = "res", alias = "r")]
    Reservations(ReservationsArgs),

    /// Case-insensitive search across properties, tasks and reservations
    Search(SearchArgs),

    /// Fetch one entity by kind and id
    Fetch(FetchArgs),

    /// Check credentials against the API
    Auth(AuthArgs),

    /// Run the HTTP server (REST, MCP at /mcp, Slack slash commands)
    Serve(ServeArgs),

    /// Run an MCP server on stdin/stdout
    Mcp,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Properties ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PropertiesArgs {
    #[command(subcommand)]
    pub command: PropertiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PropertiesCommand {
    /// List properties
    #[command(alias = "ls")]
    List(PageArgs),

    /// Show one property by Breezeway id
    Get {
        /// Property id
        id: String,
    },

    /// Find a property by its internal reference id
    Find {
        /// Internal reference id (e.g. a PMS listing id)
        internal_id: String,
    },

    /// Count properties, with a per-status breakdown
    Count,

    /// Show WiFi credentials for a property
    Wifi {
        /// Property id
        id: String,
    },

    /// Update WiFi credentials or notes on a property
    Update(UpdateArgs),
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Maximum number of results
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Skip this many results
    #[arg(long, default_value = "0")]
    pub offset: usize,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Property id
    pub id: String,

    #[arg(long)]
    pub wifi_name: Option<String>,

    #[arg(long)]
    pub wifi_password: Option<String>,

    /// Replace the "about" note
    #[arg(long)]
    pub about: Option<String>,

    /// Replace the directions note
    #[arg(long)]
    pub direction: Option<String>,

    /// Replace the trash collection note
    #[arg(long)]
    pub trash_info: Option<String>,

    /// Replace the guest access note
    #[arg(long)]
    pub guest_access: Option<String>,
}

// ── Tasks ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Debug, Subcommand)]
pub enum TasksCommand {
    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Only tasks for this property
        #[arg(long)]
        property_id: Option<String>,

        /// Only tasks with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Tasks completed in a time window (defaults to the last 24 hours)
    Completed(CompletedArgs),
}

#[derive(Debug, Args)]
pub struct CompletedArgs {
    /// Window start (RFC 3339 or "YYYY-MM-DD HH:MM:SS", UTC)
    #[arg(long)]
    pub since: Option<String>,

    /// Window end (defaults to now)
    #[arg(long)]
    pub until: Option<String>,

    /// Window length in hours when --since is omitted
    #[arg(long, default_value = "24")]
    pub hours: u32,

    /// Delay between per-property requests on the fallback path, in ms
    #[arg(long, default_value = "500")]
    pub delay_ms: u64,
}

// ── Reservations ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReservationsArgs {
    #[command(subcommand)]
    pub command: ReservationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    /// List reservations
    #[command(alias = "ls")]
    List {
        /// Only reservations for this property
        #[arg(long)]
        property_id: Option<String>,

        /// Start of the date range (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,

        /// End of the date range (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
    },
}

// ── Search / Fetch ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to look for
    pub query: String,

    /// Restrict to these kinds (property, task, reservation)
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub types: Vec<String>,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Entity kind: property, task or reservation
    pub kind: String,

    /// Entity id
    pub id: String,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Exchange credentials for a token and report the result
    Check,
}

// ── Serve ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides server.bind and PORT)
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Display the current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
