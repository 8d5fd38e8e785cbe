//! # fitout-timeline
//!
//! Calendar and Gantt views of the finishing-contractor back office's tasks
//! and milestones, with a CLI for quick edits and a TUI for browsing.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! fitout-timeline
//! # or explicitly
//! fitout-timeline ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `v`: Switch between Calendar and Gantt views
//! *   `z`: Cycle the Gantt scale (day, week, month)
//! *   `r`: Refresh from the API
//! *   `a`: Add a task
//! *   `m`: Add a milestone
//! *   `e`: Edit the selected record
//! *   `p`: Update progress of the selected task
//! *   `Space`: Toggle completion of the selected milestone
//! *   `d`: Delete the selected record
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # This month's events
//! fitout-timeline calendar
//!
//! # A given week
//! fitout-timeline calendar --view week --date 2024-03-04
//!
//! # Gantt chart, one column per week
//! fitout-timeline gantt --scale week
//!
//! # Tasks and milestones
//! fitout-timeline task add "Tile bathroom" --start 2024-03-01 --end 2024-03-08 --property <ID>
//! fitout-timeline task progress <ID> 40
//! fitout-timeline milestone add "Handover" --date 2024-04-01 --category delivery
//! fitout-timeline milestone toggle <ID>
//! ```
//!
//! ## Configuration
//!
//! *   `TIMELINE_API_URL` / `--api-url`: API base URL (default `http://localhost:5000/api`)
//! *   `TIMELINE_API_TOKEN` / `--token`: bearer token
//! *   `TIMELINE_LOCALE` / `--locale`: `en` or `ar`
//! *   `TIMELINE_DB`: path of the offline snapshot
//! *   `RUST_LOG`: log filter (default `warn`)

use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use fitout_timeline::calendar::CalendarView;
use fitout_timeline::commands::*;
use fitout_timeline::config::{data_dir, Config};
use fitout_timeline::gantt::GanttScale;
use fitout_timeline::tui::run_tui;

#[derive(Parser)]
#[command(name = "fitout-timeline")]
#[command(about = "Calendar and Gantt timeline for the back office", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "TIMELINE_API_URL")]
    api_url: Option<String>,
    /// Bearer token sent with every request
    #[arg(long, global = true, env = "TIMELINE_API_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Display language (en, ar)
    #[arg(long, global = true, env = "TIMELINE_LOCALE")]
    locale: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List calendar events
    Calendar {
        /// month, week, day or agenda
        #[arg(short, long, default_value = "month")]
        view: String,
        /// Day to show, in YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Use the last snapshot instead of the API
        #[arg(long)]
        offline: bool,
    },
    /// Show the Gantt chart
    Gantt {
        /// day, week or month
        #[arg(short, long, default_value = "month")]
        scale: String,
        /// Use the last snapshot instead of the API
        #[arg(long)]
        offline: bool,
    },
    /// List properties
    Properties {
        #[arg(long)]
        offline: bool,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage milestones
    Milestone {
        #[command(subcommand)]
        command: MilestoneCommands,
    },
    /// Delete the offline snapshot
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(clap::Args)]
struct TaskFields {
    /// Property id
    #[arg(short, long)]
    property: Option<String>,
    #[arg(short = 'D', long)]
    description: Option<String>,
    /// Start date in YYYY-MM-DD
    #[arg(short, long)]
    start: Option<String>,
    /// End date in YYYY-MM-DD
    #[arg(short, long)]
    end: Option<String>,
    /// pending, in-progress, completed, on-hold or cancelled
    #[arg(long)]
    status: Option<String>,
    /// low, medium, high or urgent
    #[arg(long)]
    priority: Option<String>,
    /// Completion percentage
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    progress: Option<u8>,
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Create a task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Set the completion percentage of a task
    Progress {
        id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        progress: u8,
    },
    /// Delete a task
    Delete {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct MilestoneFields {
    /// Property id
    #[arg(short, long)]
    property: Option<String>,
    /// Date in YYYY-MM-DD
    #[arg(short, long)]
    date: Option<String>,
    /// planning, construction, inspection, payment or delivery
    #[arg(short, long)]
    category: Option<String>,
    /// Days before the date to send a reminder
    #[arg(short, long)]
    notify_before: Option<u32>,
}

#[derive(Subcommand)]
enum MilestoneCommands {
    /// Create a milestone
    Add {
        title: String,
        #[command(flatten)]
        fields: MilestoneFields,
    },
    /// Edit a milestone
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: MilestoneFields,
    },
    /// Toggle the completion flag of a milestone
    Toggle {
        id: String,
    },
    /// Delete a milestone
    Delete {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
}

impl TaskFields {
    fn into_changes(self, title: Option<String>) -> TaskChanges {
        TaskChanges {
            property: self.property,
            title,
            description: self.description,
            start: self.start,
            end: self.end,
            status: self.status,
            priority: self.priority,
            progress: self.progress,
        }
    }
}

impl MilestoneFields {
    fn into_changes(self, title: Option<String>) -> MilestoneChanges {
        MilestoneChanges {
            property: self.property,
            title,
            date: self.date,
            category: self.category,
            notify_before: self.notify_before,
        }
    }
}

/// Logs to stderr, or to `timeline.log` in the data directory while the TUI
/// owns the terminal.
fn init_logging(tui: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if tui {
        let dir = data_dir();
        let file = std::fs::create_dir_all(&dir)
            .and_then(|_| std::fs::OpenOptions::new().create(true).append(true).open(dir.join("timeline.log")));
        match file {
            Ok(f) => {
                builder.target(env_logger::Target::Pipe(Box::new(f)));
            }
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let is_tui = matches!(cli.command, Some(Commands::Ui) | None);
    init_logging(is_tui);

    let cfg = Config::new(cli.api_url, cli.token, cli.locale);

    let result = match cli.command {
        Some(Commands::Calendar { view, date, offline }) => match CalendarView::parse(&view) {
            Some(view) => cmd_calendar(&cfg, view, date, offline).await,
            None => Err(anyhow::anyhow!("Unknown view '{}'. Use month, week, day or agenda.", view)),
        },
        Some(Commands::Gantt { scale, offline }) => match GanttScale::parse(&scale) {
            Some(scale) => cmd_gantt(&cfg, scale, offline).await,
            None => Err(anyhow::anyhow!("Unknown scale '{}'. Use day, week or month.", scale)),
        },
        Some(Commands::Properties { offline }) => cmd_properties(&cfg, offline).await,
        Some(Commands::Task { command }) => match command {
            TaskCommands::Add { title, fields } => cmd_task_add(&cfg, fields.into_changes(Some(title))).await,
            TaskCommands::Edit { id, title, fields } => cmd_task_edit(&cfg, id, fields.into_changes(title)).await,
            TaskCommands::Progress { id, progress } => cmd_task_progress(&cfg, id, progress).await,
            TaskCommands::Delete { id, force } => cmd_task_delete(&cfg, id, force).await,
        },
        Some(Commands::Milestone { command }) => match command {
            MilestoneCommands::Add { title, fields } => cmd_milestone_add(&cfg, fields.into_changes(Some(title))).await,
            MilestoneCommands::Edit { id, title, fields } => {
                cmd_milestone_edit(&cfg, id, fields.into_changes(title)).await
            }
            MilestoneCommands::Toggle { id } => cmd_milestone_toggle(&cfg, id).await,
            MilestoneCommands::Delete { id, force } => cmd_milestone_delete(&cfg, id, force).await,
        },
        Some(Commands::Reset { force }) => cmd_reset(force),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "fitout-timeline", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => run_tui(cfg).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
