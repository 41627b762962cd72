use crate::config::Config;
use crate::error::ChangelogError;
use crate::history::HistoricalChangelogEntry;
use crate::log_debug;
use crate::notifications::{AppNotification, LogNotifier, NotificationLevel, Notifier};
use crate::storage::FileStore;
use crate::studio::{StudioApp, StudioEvent};
use crate::ui::{self, rgb};
use crate::workspace::Workspace;

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints notifications as they are delivered
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn deliver(&self, notification: &AppNotification) {
        ui::print_message(&ui::format_notification(notification));
    }
}

fn load_workspace() -> Result<(FileStore, Workspace)> {
    let config = Config::load()?;
    let store = FileStore::new(config.storage_dir()?)?;
    let workspace = Workspace::load(&store).context("Failed to load workspace")?;
    log_debug!("Workspace loaded from {}", store.dir().display());
    Ok((store, workspace))
}

fn open_studio() -> Result<StudioApp> {
    let config = Config::load()?;
    StudioApp::from_config(&config)
}

/// Surface the last reducer error; informational outcomes become warnings
fn report_outcome(app: &mut StudioApp) -> Result<bool> {
    match app.state.last_error.take() {
        None => Ok(true),
        Some(e) if e.is_informational() => {
            ui::print_warning(&e.to_string());
            Ok(false)
        }
        Some(e) => Err(e.into()),
    }
}

/// Select the repository and, optionally, an entry
fn select(app: &mut StudioApp, repo: &str, entry: Option<&str>) -> Result<()> {
    app.dispatch(StudioEvent::SelectRepository(repo.to_string()))?;
    report_outcome(app)?;
    if let Some(entry) = entry {
        app.dispatch(StudioEvent::SelectEntry(entry.to_string()))?;
        report_outcome(app)?;
    }
    Ok(())
}

/// Handle the 'connect' command
pub fn handle_connect_command(url: &str, token: &str) -> Result<()> {
    let (store, mut workspace) = load_workspace()?;

    let result = workspace
        .connect(url, token)
        .map(|repo| (repo.id.clone(), repo.token.is_empty()));

    match result {
        Ok((id, missing_token)) => {
            workspace.notify(
                &LogNotifier,
                "Repository Connected",
                &format!("Successfully connected {id}"),
                NotificationLevel::Success,
                Some(id.clone()),
            );
            workspace.save(&store)?;
            ui::print_success(&format!("Connected {id}"));
            if missing_token {
                ui::print_warning("No token was given and no global token is set; GitHub requests will fail.");
            }
            Ok(())
        }
        Err(e) => {
            workspace.notify(
                &LogNotifier,
                "Connection Failed",
                &e.to_string(),
                NotificationLevel::Error,
                None,
            );
            workspace.save_notifications(&store)?;
            Err(e.into())
        }
    }
}

/// Handle the 'disconnect' command
pub fn handle_disconnect_command(repo: &str) -> Result<()> {
    let (store, mut workspace) = load_workspace()?;
    let removed = workspace.disconnect(repo)?;
    workspace.save_repositories(&store)?;
    ui::print_success(&format!(
        "Disconnected {} ({} changelogs removed)",
        removed.id,
        removed.history.len()
    ));
    Ok(())
}

/// Handle the 'list' command
pub fn handle_list_command() -> Result<()> {
    let (_, workspace) = load_workspace()?;

    if workspace.repos().is_empty() {
        ui::print_info("No repositories connected. Use `aria-changelog connect <url>` to add one.");
        return Ok(());
    }

    for repo in workspace.repos() {
        let latest = repo
            .history
            .most_recent()
            .map_or_else(|| "no changelogs".to_string(), |e| e.version.clone());
        let auto = if repo.auto_generation { "auto" } else { "manual" };
        println!(
            "{}  {}  {}  {}",
            repo.id.truecolor(rgb::NEON_CYAN.0, rgb::NEON_CYAN.1, rgb::NEON_CYAN.2).bold(),
            latest.truecolor(rgb::SUCCESS_GREEN.0, rgb::SUCCESS_GREEN.1, rgb::SUCCESS_GREEN.2),
            format!("{} entries", repo.history.len()).dimmed(),
            auto.dimmed()
        );
    }
    Ok(())
}

/// Handle the 'generate' command
pub async fn handle_generate_command(repo: &str, version: Option<String>) -> Result<()> {
    let mut app = open_studio()?;
    select(&mut app, repo, None)?;
    if let Some(version) = version {
        app.dispatch(StudioEvent::SetVersion(version))?;
    }

    log_debug!("Generating {} for {}", app.state.version_input, repo);
    let spinner = ui::create_spinner("Fetching merged pull requests and writing the changelog...");
    app.dispatch(StudioEvent::GenerateRequested)?;
    let settled = app.settle().await;
    spinner.finish_and_clear();
    settled?;

    if report_outcome(&mut app)?
        && let Some(entry) = app.state.selected_entry()
    {
        ui::print_success(&format!("Generated {} for {}", entry.version, entry.repo_id));
        ui::print_bordered_content(&ui::format_changelog_entry(entry));
    }
    Ok(())
}

fn find_entry<'a>(
    workspace: &'a Workspace,
    repo: &str,
    entry: Option<&str>,
) -> Result<Option<&'a HistoricalChangelogEntry>> {
    let repo = workspace.repo(repo)?;
    match entry {
        Some(id) => repo
            .history
            .find(id)
            .map(Some)
            .ok_or_else(|| ChangelogError::EntryNotFound(id.to_string()).into()),
        None => Ok(repo.history.most_recent()),
    }
}

/// Handle the 'show' command
pub fn handle_show_command(
    repo: &str,
    entry: Option<&str>,
    markdown: bool,
    copy: bool,
) -> Result<()> {
    let (_, workspace) = load_workspace()?;
    let Some(entry) = find_entry(&workspace, repo, entry)? else {
        ui::print_info("No changelogs generated yet. Run `aria-changelog generate` first.");
        return Ok(());
    };

    let exported = entry.to_markdown();
    if markdown {
        println!("{exported}");
    } else {
        println!("{}", ui::format_changelog_entry(entry));
    }

    if copy {
        let mut clipboard = arboard::Clipboard::new().context("Clipboard is not available")?;
        clipboard
            .set_text(exported)
            .context("Failed to copy to clipboard")?;
        ui::print_success("Copied Markdown to clipboard");
    }
    Ok(())
}

/// Handle the 'chat' command
pub async fn handle_chat_command(repo: &str, entry: Option<&str>) -> Result<()> {
    let mut app = open_studio()?;
    select(&mut app, repo, entry)?;

    let Some(current) = app.state.selected_entry() else {
        ui::print_info("No changelogs generated yet. Run `aria-changelog generate` first.");
        return Ok(());
    };
    ui::print_bordered_content(&ui::format_changelog_entry(current));
    ui::print_info("Describe an edit (empty line to finish):");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let instruction = line.trim();
        if instruction.is_empty() {
            break;
        }

        let spinner = ui::create_spinner("Aria is revising the changelog...");
        app.dispatch(StudioEvent::ReviseRequested(instruction.to_string()))?;
        let settled = app.settle().await;
        spinner.finish_and_clear();
        settled?;

        if let Some(reply) = app.state.transcript.last() {
            println!("{}", ui::format_chat_message(reply));
        }
        if app.state.last_error.take().is_none()
            && let Some(entry) = app.state.selected_entry()
        {
            ui::print_bordered_content(&ui::format_changelog_entry(entry));
        }
    }
    Ok(())
}

/// Handle the 'watch' command
pub async fn handle_watch_command(interval: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let interval = interval.map_or_else(|| config.auto_generation.interval(), Duration::from_secs);
    let mut app = StudioApp::from_config(&config)?.with_notifier(Arc::new(ConsoleNotifier));

    let count = app.state.workspace.auto_generation_repos().len();
    if count == 0 {
        ui::print_warning("No repositories have auto-generation enabled.");
        return Ok(());
    }

    app.start_auto_generation(interval);
    ui::print_info(&format!(
        "Watching {count} repositories every {}s. Press Ctrl-C to stop.",
        interval.as_secs()
    ));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            result = app.process_next() => match result {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => ui::print_error(&format!("{e:#}")),
            },
        }
    }

    let last_check = app
        .auto_generation_status()
        .last_check
        .map_or_else(|| "never".to_string(), |t| t.format("%H:%M:%S UTC").to_string());
    app.stop_auto_generation();
    ui::print_info(&format!("Stopped watching. Last check: {last_check}"));
    Ok(())
}

/// Handle the 'auto' command
pub fn handle_auto_command(repo: &str, enabled: bool) -> Result<()> {
    let (store, mut workspace) = load_workspace()?;
    let repo = workspace.repo_mut(repo)?;
    repo.auto_generation = enabled;
    let id = repo.id.clone();
    workspace.save_repositories(&store)?;
    ui::print_success(&format!(
        "Auto-generation {} for {id}",
        if enabled { "enabled" } else { "disabled" }
    ));
    Ok(())
}

/// Handle the 'notifications' command
pub fn handle_notifications_command(mark_read: Option<u64>, all: bool) -> Result<()> {
    let (store, mut workspace) = load_workspace()?;

    if all {
        workspace.notifications.mark_all_read();
        workspace.save_notifications(&store)?;
    } else if let Some(id) = mark_read {
        if workspace.notifications.mark_read(id) {
            workspace.save_notifications(&store)?;
        } else {
            ui::print_warning(&format!("No notification with id {id}"));
        }
    }

    if workspace.notifications.is_empty() {
        ui::print_info("No notifications.");
        return Ok(());
    }

    for notification in workspace.notifications.iter() {
        println!("{}", ui::format_notification(notification));
    }
    ui::print_message(&format!(
        "\n{} unread",
        workspace.notifications.unread_count()
    ));
    Ok(())
}

/// Handle the 'settings' command
pub fn handle_settings_command(
    notifications: Option<bool>,
    auto_generation: Option<bool>,
) -> Result<()> {
    let (store, mut workspace) = load_workspace()?;

    if notifications.is_some() || auto_generation.is_some() {
        if let Some(enabled) = notifications {
            workspace.settings.notifications = enabled;
        }
        if let Some(enabled) = auto_generation {
            workspace.settings.auto_generation = enabled;
        }
        workspace.save_settings(&store)?;
        ui::print_success("Settings updated.");
    }

    let settings = &workspace.settings;
    print_section_header("SETTINGS");
    print_flag_row("Notify", settings.notifications);
    print_flag_row("Auto-gen", settings.auto_generation);
    print_config_row(
        "Token",
        if settings.global_token.is_some() { "set" } else { "(none)" },
        rgb::CORAL,
        false,
    );
    Ok(())
}

/// Handle the 'config' command
pub fn handle_config_command(
    api_key: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    timeout: Option<u64>,
    github_api_url: Option<String>,
    interval: Option<u64>,
) -> Result<()> {
    let mut config = Config::load()?;

    let changes_made = api_key.is_some()
        || model.is_some()
        || temperature.is_some()
        || timeout.is_some()
        || github_api_url.is_some()
        || interval.is_some();

    if changes_made {
        config.update(api_key, model, temperature, timeout, github_api_url, interval);
        config.validate_settings()?;
        config.save()?;
        ui::print_success("Configuration updated successfully.");
    }

    print_configuration(&config);
    Ok(())
}

fn print_configuration(config: &Config) {
    let purple = rgb::ELECTRIC_PURPLE;
    let cyan = rgb::NEON_CYAN;

    println!();
    println!(
        "{}  {}  {}",
        "━━━".truecolor(purple.0, purple.1, purple.2),
        "ARIA CONFIGURATION".truecolor(cyan.0, cyan.1, cyan.2).bold(),
        "━━━".truecolor(purple.0, purple.1, purple.2)
    );
    println!();

    print_section_header("LLM");
    print_config_row("Model", &config.llm.model, cyan, true);
    let key_state = match (config.llm.api_key.is_empty(), config.api_key_from_env) {
        (true, _) => "(not set)",
        (false, true) => "set (environment)",
        (false, false) => "set",
    };
    print_config_row("API Key", key_state, rgb::CORAL, false);
    print_config_row(
        "Temperature",
        &config.llm.temperature.to_string(),
        rgb::ELECTRIC_YELLOW,
        false,
    );
    print_config_row(
        "Timeout",
        &format!("{}s", config.llm.timeout_seconds),
        rgb::ELECTRIC_YELLOW,
        false,
    );

    println!();
    print_section_header("GITHUB");
    print_config_row("API URL", &config.github.api_url, cyan, false);
    print_config_row(
        "Timeout",
        &format!("{}s", config.github.timeout_seconds),
        rgb::ELECTRIC_YELLOW,
        false,
    );

    println!();
    print_section_header("AUTO-GENERATION");
    print_config_row(
        "Interval",
        &format!("{}s", config.auto_generation.interval_seconds),
        rgb::ELECTRIC_YELLOW,
        false,
    );
    println!();
}

fn print_section_header(name: &str) {
    let purple = rgb::ELECTRIC_PURPLE;
    println!(
        "{} {} {}",
        "─".truecolor(purple.0, purple.1, purple.2),
        name.truecolor(purple.0, purple.1, purple.2).bold(),
        "─".repeat(30 - name.len().min(28)).dimmed()
    );
}

fn print_config_row(label: &str, value: &str, value_color: (u8, u8, u8), highlight: bool) {
    let dim = rgb::DIM_WHITE;
    let label_styled = format!("{label:>12}").truecolor(dim.0, dim.1, dim.2);

    let value_styled = if highlight {
        value
            .truecolor(value_color.0, value_color.1, value_color.2)
            .bold()
    } else {
        value.truecolor(value_color.0, value_color.1, value_color.2)
    };

    println!("{label_styled}  {value_styled}");
}

fn print_flag_row(label: &str, enabled: bool) {
    if enabled {
        print_config_row(label, "enabled", rgb::SUCCESS_GREEN, false);
    } else {
        print_config_row(label, "disabled", rgb::DIM_WHITE, false);
    }
}
