use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::Terminal;
use tokio::sync::mpsc;

use sm_core::services::compose::ComposeRuntime;
use sm_core::services::config_loader;
use sm_core::services::site_manager::SiteManager;

use sm_tui::app::{App, Mode};
use sm_tui::event::{spawn_input_task, spawn_tick_task, AppEvent, TICK_INTERVAL};
use sm_tui::{keys, ui, Manager};

const CONFIG_ENV: &str = "SITE_MANAGER_CONFIG";

struct CliArgs {
    root: Option<PathBuf>,
    config: Option<PathBuf>,
    debug: bool,
    headless_script: Option<PathBuf>,
}

impl CliArgs {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value_after = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .map(PathBuf::from)
        };
        Self {
            root: value_after("--root"),
            config: value_after("--config")
                .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from)),
            debug: args.iter().any(|a| a == "--debug"),
            headless_script: value_after("--headless"),
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();

    let _guard = if args.debug || args.headless_script.is_some() {
        Some(setup_debug_logging())
    } else {
        None
    };

    let manager = build_manager(&args)?;

    if let Some(script_path) = args.headless_script {
        run_headless(script_path, manager).await
    } else {
        run_interactive(manager).await
    }
}

/// Configure file-based tracing to `.site-manager-debug.log` in CWD.
/// Returns the guard that must be held alive for the duration of the program.
fn setup_debug_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", ".site-manager-debug.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .init();

    guard
}

fn build_manager(args: &CliArgs) -> color_eyre::Result<Arc<Manager>> {
    let config = config_loader::resolve(args.config.as_deref(), args.root.as_deref())?;
    std::fs::create_dir_all(&config.sites_directory)?;
    tracing::info!(
        sites_directory = %config.sites_directory.display(),
        template = %config.template,
        runtime = %config.runtime.program,
        "configuration loaded"
    );
    let runtime = ComposeRuntime::new(&config.runtime);
    Ok(Arc::new(SiteManager::new(config, runtime)))
}

async fn new_app(manager: &Arc<Manager>) -> App {
    let mut app = App::new();
    app.root_label = Some(manager.root().display().to_string());
    refresh_sites(&mut app, manager).await;
    app
}

/// Rescan the sites directory. A failed scan keeps the last known list.
async fn refresh_sites(app: &mut App, manager: &Arc<Manager>) {
    match manager.list_sites().await {
        Ok(sites) => app.set_sites(sites),
        Err(e) => {
            tracing::warn!(error = %e, "site_scan_failed");
            app.set_status(format!("Error: {e}"));
        }
    }
}

/// Run the normal interactive TUI with crossterm backend.
async fn run_interactive(manager: Arc<Manager>) -> color_eyre::Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let _input_task = spawn_input_task(event_tx.clone());
    let _tick_task = spawn_tick_task(event_tx.clone(), TICK_INTERVAL);

    let mut app = new_app(&manager).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = async {
        loop {
            terminal.draw(|f| ui::render(f, &app))?;

            if let Ok(event) = event_rx.try_recv() {
                process_event(&mut app, event, &manager, &event_tx).await;
            } else {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }

            if app.should_quit {
                break;
            }
        }
        Ok::<(), color_eyre::Report>(())
    }
    .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Run headless mode: read scripted input, render to TestBackend, dump frames to stdout.
async fn run_headless(script_path: PathBuf, manager: Arc<Manager>) -> color_eyre::Result<()> {
    let script = std::fs::read_to_string(&script_path)?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();
    // No spawn_input_task; input comes from script
    let _tick_task = spawn_tick_task(event_tx.clone(), TICK_INTERVAL);

    let mut terminal = Terminal::new(TestBackend::new(120, 40))?;
    let mut app = new_app(&manager).await;

    for raw_line in script.lines() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if line == "quit" {
            break;
        }

        if line == "screenshot" {
            headless_screenshot(&mut terminal, &app, None)?;
            continue;
        }

        if let Some(label) = line.strip_prefix("screenshot:") {
            headless_screenshot(&mut terminal, &app, Some(label.trim()))?;
            continue;
        }

        if let Some(ms_str) = line.strip_prefix("wait:") {
            let ms: u64 = ms_str.trim().parse().unwrap_or(100);
            headless_wait(&mut app, &mut event_rx, &manager, &event_tx, ms).await;
            continue;
        }

        if let Some(text) = line.strip_prefix("type:") {
            for ch in text.chars() {
                let key_event = press(KeyCode::Char(ch), KeyModifiers::NONE);
                keys::handle_key(&mut app, key_event, &manager, &event_tx).await;
            }
            continue;
        }

        if let Some(key_str) = line.strip_prefix("key:") {
            match parse_key(key_str.trim()) {
                Some(key_event) => {
                    keys::handle_key(&mut app, key_event, &manager, &event_tx).await;
                }
                None => eprintln!("headless: unknown key '{}'", key_str.trim()),
            }
            continue;
        }

        eprintln!("headless: unknown command '{line}'");
    }

    Ok(())
}

fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

/// Parse a script key name such as `enter`, `shift+tab` or `ctrl+c`.
fn parse_key(name: &str) -> Option<KeyEvent> {
    let (modifiers, key_name) = if let Some(rest) = name.strip_prefix("shift+") {
        (KeyModifiers::SHIFT, rest)
    } else if let Some(rest) = name.strip_prefix("ctrl+") {
        (KeyModifiers::CONTROL, rest)
    } else {
        (KeyModifiers::NONE, name)
    };

    let code = match key_name {
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" if modifiers == KeyModifiers::SHIFT => KeyCode::BackTab,
        "tab" => KeyCode::Tab,
        "backtab" => return Some(press(KeyCode::BackTab, KeyModifiers::SHIFT)),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "backspace" => KeyCode::Backspace,
        other => {
            let mut chars = other.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            if modifiers == KeyModifiers::SHIFT {
                KeyCode::Char(ch.to_ascii_uppercase())
            } else {
                KeyCode::Char(ch)
            }
        }
    };
    Some(press(code, modifiers))
}

/// Render the current app state to the TestBackend and dump frame text to stdout.
fn headless_screenshot(
    terminal: &mut Terminal<TestBackend>,
    app: &App,
    label: Option<&str>,
) -> color_eyre::Result<()> {
    if let Some(label) = label {
        println!("=== {label} ===");
    }
    terminal.draw(|f| ui::render(f, app))?;
    let buf = terminal.backend().buffer();
    for y in 0..buf.area.height {
        let mut line = String::new();
        for x in 0..buf.area.width {
            line.push_str(buf[(x, y)].symbol());
        }
        println!("{}", line.trim_end());
    }
    Ok(())
}

/// Process async events during a `wait:` command.
async fn headless_wait(
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
    manager: &Arc<Manager>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    ms: u64,
) {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(ms);
    while tokio::time::Instant::now() < deadline {
        while let Ok(event) = event_rx.try_recv() {
            process_event(app, event, manager, event_tx).await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

/// Process a single AppEvent, updating app state accordingly.
async fn process_event(
    app: &mut App,
    event: AppEvent,
    manager: &Arc<Manager>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match event {
        AppEvent::Key(key) => {
            keys::handle_key(app, key, manager, event_tx).await;
        }
        AppEvent::Tick => {
            refresh_sites(app, manager).await;
        }
        AppEvent::SitesLoaded(sites) => {
            tracing::debug!(count = sites.len(), "sites_loaded");
            app.set_sites(sites);
            app.set_status(format!("{} sites", app.sites.len()));
        }
        AppEvent::Error(msg) => {
            tracing::debug!(error = %msg, "event_error");
            app.set_status(format!("Error: {msg}"));
            if matches!(app.mode, Mode::Loading(_)) {
                app.mode = Mode::SiteList;
            }
            refresh_sites(app, manager).await;
        }
        AppEvent::Info(msg) => {
            tracing::debug!(info = %msg, "event_info");
            app.set_status(msg);
            if matches!(app.mode, Mode::Loading(_)) {
                app.mode = Mode::SiteList;
            }
            refresh_sites(app, manager).await;
        }
        AppEvent::SiteCreated(response) => {
            tracing::debug!(site = %response.name, "site_created");
            app.set_status(format!(
                "Created site '{}' on port {}",
                response.name, response.ports.app
            ));
            app.create_form = Default::default();
            refresh_sites(app, manager).await;
            let position = app
                .visible_sites()
                .iter()
                .position(|site| site.name == response.name);
            if let Some(index) = position {
                app.selected_index = index;
            }
            app.mode = Mode::Credentials(response);
        }
    }
}
