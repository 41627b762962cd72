use crate::commands;
use crate::log_debug;
use crate::ui;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};

const LOG_FILE: &str = "aria-changelog-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "Aria: AI-powered changelogs from merged GitHub pull requests",
    long_about = "Aria connects to GitHub repositories, turns merged pull requests into categorized changelogs, and lets you refine them conversationally.",
    disable_version_flag = true,
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Echo debug log lines to stderr
    #[arg(
        long = "log-stderr",
        global = true,
        help = "Echo debug log lines to stderr"
    )]
    pub log_stderr: bool,

    /// Suppress non-essential output (spinners, waiting messages, etc.)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Connect a GitHub repository
    #[command(
        about = "Connect a GitHub repository",
        long_about = "Connect a repository by URL (https://github.com/owner/repo). Without --token the global token from the first connection is reused."
    )]
    Connect {
        /// Repository URL
        url: String,

        /// GitHub personal access token
        #[arg(short, long, help = "GitHub personal access token")]
        token: Option<String>,
    },

    /// Disconnect a repository and forget its history
    #[command(about = "Disconnect a repository and forget its history")]
    Disconnect {
        /// Repository id (owner/name) or URL
        repo: String,
    },

    /// List connected repositories
    #[command(about = "List connected repositories")]
    List,

    /// Generate the next changelog from newly merged pull requests
    #[command(
        about = "Generate the next changelog",
        long_about = "Fetch pull requests merged since the most recent changelog and synthesize a new version."
    )]
    Generate {
        /// Repository id (owner/name) or URL
        repo: String,

        /// Version label (defaults to the next patch version)
        #[arg(long, help = "Version label (defaults to the next patch version)")]
        version: Option<String>,
    },

    /// Show a generated changelog
    #[command(about = "Show a generated changelog")]
    Show {
        /// Repository id (owner/name) or URL
        repo: String,

        /// Entry id or version label (defaults to the most recent)
        #[arg(short, long, help = "Entry id or version label")]
        entry: Option<String>,

        /// Print Markdown instead of formatted output
        #[arg(short, long, help = "Print Markdown instead of formatted output")]
        markdown: bool,

        /// Copy the Markdown export to the clipboard
        #[arg(short, long, help = "Copy the Markdown export to the clipboard")]
        copy: bool,
    },

    /// Refine a changelog conversationally
    #[command(
        about = "Refine a changelog conversationally",
        long_about = "Read edit instructions from stdin, one per line, and apply each to the selected changelog. An empty line or EOF ends the session."
    )]
    Chat {
        /// Repository id (owner/name) or URL
        repo: String,

        /// Entry id or version label (defaults to the most recent)
        #[arg(short, long, help = "Entry id or version label")]
        entry: Option<String>,
    },

    /// Poll enabled repositories and generate changelogs automatically
    #[command(about = "Poll enabled repositories until Ctrl-C")]
    Watch {
        /// Seconds between checks (overrides the configured interval)
        #[arg(long, help = "Seconds between checks")]
        interval: Option<u64>,
    },

    /// Enable or disable auto-generation for one repository
    #[command(about = "Enable or disable auto-generation for a repository")]
    Auto {
        /// Repository id (owner/name) or URL
        repo: String,

        /// Disable instead of enable
        #[arg(long, help = "Disable auto-generation")]
        off: bool,
    },

    /// List or acknowledge notifications
    #[command(about = "List or acknowledge notifications")]
    Notifications {
        /// Mark one notification as read
        #[arg(long, help = "Mark one notification as read")]
        mark_read: Option<u64>,

        /// Mark every notification as read
        #[arg(long, help = "Mark every notification as read")]
        all: bool,
    },

    /// Show or change application settings
    #[command(about = "Show or change application settings")]
    Settings {
        /// Deliver notifications
        #[arg(long, help = "Deliver notifications (true/false)")]
        notifications: Option<bool>,

        /// Enable the auto-generation poller
        #[arg(long, help = "Enable auto-generation (true/false)")]
        auto_generation: Option<bool>,
    },

    /// Configure the LLM and GitHub settings
    #[command(about = "Configure LLM and GitHub settings")]
    Config {
        /// Set API key for the LLM
        #[arg(long, help = "Set API key for the LLM")]
        api_key: Option<String>,

        /// Set model
        #[arg(long, help = "Set model")]
        model: Option<String>,

        /// Set sampling temperature for synthesis
        #[arg(long, help = "Set sampling temperature for synthesis")]
        temperature: Option<f64>,

        /// Set LLM call timeout in seconds
        #[arg(long, help = "Set LLM call timeout in seconds")]
        timeout: Option<u64>,

        /// Set GitHub API base URL
        #[arg(long, help = "Set GitHub API base URL")]
        github_api_url: Option<String>,

        /// Set auto-generation interval in seconds
        #[arg(long, help = "Set auto-generation interval in seconds")]
        interval: Option<u64>,
    },
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
        crate::logger::set_log_to_stderr(cli.log_stderr);
    } else if cli.log_stderr {
        crate::logger::enable_logging();
        crate::logger::set_log_to_stderr(true);
    } else {
        crate::logger::disable_logging();
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        let _ = Cli::parse_from(["aria-changelog", "--help"]);
        Ok(())
    }
}

/// Handle the command based on parsed arguments
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Connect { url, token } => {
            log_debug!("Handling 'connect' for {}", url);
            commands::handle_connect_command(&url, token.as_deref().unwrap_or_default())
        }
        Commands::Disconnect { repo } => commands::handle_disconnect_command(&repo),
        Commands::List => commands::handle_list_command(),
        Commands::Generate { repo, version } => {
            log_debug!("Handling 'generate' for {} version {:?}", repo, version);
            commands::handle_generate_command(&repo, version).await
        }
        Commands::Show {
            repo,
            entry,
            markdown,
            copy,
        } => commands::handle_show_command(&repo, entry.as_deref(), markdown, copy),
        Commands::Chat { repo, entry } => {
            commands::handle_chat_command(&repo, entry.as_deref()).await
        }
        Commands::Watch { interval } => commands::handle_watch_command(interval).await,
        Commands::Auto { repo, off } => commands::handle_auto_command(&repo, !off),
        Commands::Notifications { mark_read, all } => {
            commands::handle_notifications_command(mark_read, all)
        }
        Commands::Settings {
            notifications,
            auto_generation,
        } => commands::handle_settings_command(notifications, auto_generation),
        Commands::Config {
            api_key,
            model,
            temperature,
            timeout,
            github_api_url,
            interval,
        } => commands::handle_config_command(
            api_key,
            model,
            temperature,
            timeout,
            github_api_url,
            interval,
        ),
    }
}
