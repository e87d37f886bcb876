//! CLI definitions using clap.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// Macrum - businesses, clients, projects and tasks from the terminal
#[derive(Parser, Debug)]
#[command(name = "macrum", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.macrum/data/macrum.db)
    #[arg(long, global = true, env = "MACRUM_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Output only the ID of created records (for scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the Macrum database
    Init {
        /// Recreate the database, discarding existing data
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,

    /// Business management
    Business {
        #[command(subcommand)]
        command: BusinessCommands,
    },

    /// Client management
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },

    /// Project management
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Task management
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Free-form notes
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },

    /// Summary statistics across everything
    Dashboard,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Sorting and truncation shared by every list command.
#[derive(Args, Debug, Clone, Default)]
pub struct SortArgs {
    /// Sort by field
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort order (asc, desc)
    #[arg(long, default_value = "asc")]
    pub order: String,

    /// Maximum records to return
    #[arg(short, long)]
    pub limit: Option<usize>,
}

// ============================================================================
// Business Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum BusinessCommands {
    /// Create a business
    Create(BusinessCreateArgs),

    /// List businesses
    List(BusinessListArgs),

    /// Show a business with its projects and clients
    Show {
        /// Business ID
        id: String,
    },

    /// Update a business
    Update(BusinessUpdateArgs),

    /// Delete business(es)
    Delete {
        /// Business IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BusinessCreateArgs {
    /// Business name
    pub name: String,

    /// Description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Industry
    #[arg(long)]
    pub industry: Option<String>,

    /// Website URL
    #[arg(long)]
    pub website: Option<String>,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Contact phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BusinessListArgs {
    /// Search name, description and industry
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by industry
    #[arg(long)]
    pub industry: Option<String>,

    #[command(flatten)]
    pub sort: SortArgs,
}

/// Empty strings clear optional fields.
#[derive(Args, Debug, Clone)]
pub struct BusinessUpdateArgs {
    /// Business ID
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(long)]
    pub industry: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,
}

// ============================================================================
// Client Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// Create a client
    Create(ClientCreateArgs),

    /// List clients
    List(ClientListArgs),

    /// Show a client with their projects
    Show {
        /// Client ID
        id: String,
    },

    /// Update a client
    Update(ClientUpdateArgs),

    /// Delete client(s)
    Delete {
        /// Client IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Export clients as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filter: ClientListArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ClientCreateArgs {
    /// Client name
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Linked business IDs (comma-separated)
    #[arg(long = "business", value_delimiter = ',')]
    pub businesses: Vec<String>,

    /// Status (active, inactive, prospect)
    #[arg(short, long)]
    pub status: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ClientListArgs {
    /// Search name, email and company
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by status
    #[arg(short, long)]
    pub status: Option<String>,

    /// Filter by linked business ID
    #[arg(long)]
    pub business: Option<String>,

    #[command(flatten)]
    pub sort: SortArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ClientUpdateArgs {
    /// Client ID
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Replace linked business IDs (comma-separated)
    #[arg(long = "business", value_delimiter = ',')]
    pub businesses: Option<Vec<String>>,

    #[arg(short, long)]
    pub status: Option<String>,
}

// ============================================================================
// Project Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    Create(ProjectCreateArgs),

    /// List projects
    List(ProjectListArgs),

    /// Show a project with its tasks
    Show {
        /// Project ID
        id: String,
    },

    /// Update a project
    Update(ProjectUpdateArgs),

    /// Delete project(s)
    Delete {
        /// Project IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Project statistics
    Stats {
        /// Only count projects of this business
        #[arg(long)]
        business: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProjectCreateArgs {
    /// Project name
    pub name: String,

    /// Owning business ID
    #[arg(short, long)]
    pub business: String,

    /// Client ID
    #[arg(long)]
    pub client: Option<String>,

    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Status (planning, in-progress, on-hold, completed)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Start date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Due date, YYYY-MM-DD
    #[arg(long)]
    pub due: NaiveDate,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectListArgs {
    /// Search name and description
    #[arg(long)]
    pub search: Option<String>,

    #[arg(short, long)]
    pub status: Option<String>,

    #[arg(short, long)]
    pub priority: Option<String>,

    /// Filter by business ID
    #[arg(short, long)]
    pub business: Option<String>,

    /// Filter by client ID
    #[arg(long)]
    pub client: Option<String>,

    /// Date bucket (upcoming, current, overdue, completed)
    #[arg(long)]
    pub bucket: Option<String>,

    #[command(flatten)]
    pub sort: SortArgs,
}

/// An empty `--client` unlinks the client.
#[derive(Args, Debug, Clone)]
pub struct ProjectUpdateArgs {
    /// Project ID
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub business: Option<String>,

    #[arg(long)]
    pub client: Option<String>,

    #[arg(short, long)]
    pub status: Option<String>,

    #[arg(short, long)]
    pub priority: Option<String>,

    #[arg(long)]
    pub start: Option<NaiveDate>,

    #[arg(long)]
    pub due: Option<NaiveDate>,
}

// ============================================================================
// Task Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Create(TaskCreateArgs),

    /// List tasks
    List(TaskListArgs),

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Update a task
    Update(TaskUpdateArgs),

    /// Mark task(s) as completed
    Complete {
        /// Task IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Move completed task(s) back to todo
    Reopen {
        /// Task IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete task(s)
    Delete {
        /// Task IDs (one or more)
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TaskCreateArgs {
    /// Task title
    pub title: String,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Status (todo, in-progress, completed)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Due date, YYYY-MM-DD
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Project ID
    #[arg(long)]
    pub project: Option<String>,

    /// Assignee
    #[arg(long)]
    pub assign: Option<String>,

    /// Tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// IDs of tasks this one depends on (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub depends_on: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskListArgs {
    /// Search title, description and tags
    #[arg(long)]
    pub search: Option<String>,

    #[arg(short, long)]
    pub status: Option<String>,

    #[arg(short, long)]
    pub priority: Option<String>,

    /// Filter by project ID
    #[arg(long)]
    pub project: Option<String>,

    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Date bucket (overdue, due-soon)
    #[arg(long)]
    pub bucket: Option<String>,

    #[command(flatten)]
    pub sort: SortArgs,
}

/// Empty strings clear optional fields; `--due none` clears the due date.
#[derive(Args, Debug, Clone)]
pub struct TaskUpdateArgs {
    /// Task ID
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub status: Option<String>,

    #[arg(short, long)]
    pub priority: Option<String>,

    /// Due date, YYYY-MM-DD, or `none`
    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub assign: Option<String>,

    /// Replace tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    /// Replace dependencies (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub depends_on: Option<Vec<String>>,
}

// ============================================================================
// Notes Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum NotesCommands {
    /// Print the notes
    Show,

    /// Replace the notes
    Set {
        /// New content
        content: String,
    },

    /// Append a line to the notes
    Append {
        /// Text to append
        text: String,
    },

    /// Clear the notes
    Clear,
}
