//! src/main.rs
//! pi: terminal file manager with a keyboard and a line-oriented front end

use std::{
    env,
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use pi_core::{
    AppError, AppState, LoggerBuilder,
    config::Config,
    controller::{EventLoop, Repl},
    ipc::{InstanceServer, single_instance},
    util::paths,
    view::{theme, ui::AppTerminal},
};

/// Terminal file manager.
#[derive(Debug, Parser)]
#[command(name = "pi", version, about)]
struct Args {
    /// Starting directory (default: the current directory).
    dir: Option<PathBuf>,

    /// Use the line-oriented interface instead of the keyboard UI.
    #[arg(long)]
    repl: bool,

    /// Do not coordinate with other running instances.
    #[arg(long)]
    no_server: bool,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let args: Args = Args::parse();

    let (config, config_error): (Config, Option<AppError>) = match Config::load().await {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let _log_guard: Option<WorkerGuard> =
        match LoggerBuilder::new().with_config(config.logger_config()).build() {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("pi: logging disabled: {e}");
                None
            }
        };
    if let Some(e) = config_error {
        warn!(
            marker = "CONFIG_LOAD_FAILED",
            operation_type = "config",
            error = %e,
            "Failed to load config, using defaults"
        );
    }
    setup_panic_handler();

    let cwd: PathBuf = env::current_dir().context("Failed to get current directory")?;
    let target: PathBuf = match &args.dir {
        Some(dir) => paths::resolve_input(&dir.to_string_lossy(), &cwd, paths::home_dir().as_deref()),
        None => cwd,
    };

    let mut server: Option<InstanceServer> = None;
    let mut open_rx: Option<UnboundedReceiver<PathBuf>> = None;

    if !args.no_server {
        let socket: PathBuf = config.paths.socket.clone();
        if single_instance::probe(&socket, config.probe_timeout).await {
            if args.dir.is_some() {
                single_instance::send(&socket, &target)
                    .await
                    .context("Failed to reach the running instance")?;
            } else {
                println!("already running");
            }
            return Ok(());
        }

        match InstanceServer::bind(socket) {
            Ok((bound, rx)) => {
                server = Some(bound);
                open_rx = Some(rx);
            }
            Err(e) => warn!(
                marker = "INSTANCE_SERVER_FAILED",
                operation_type = "ipc",
                error = %e,
                "Running without single-instance coordination"
            ),
        }
    }

    if !target.is_dir() {
        bail!("{}: no such directory", target.display());
    }

    info!(
        marker = "APP_START",
        operation_type = "startup",
        start_dir = %target.display(),
        repl = args.repl,
        "Starting pi"
    );

    let app: AppState = AppState::new(config, target).context("Failed to initialize engine")?;

    let result: Result<()> = tokio::task::block_in_place(|| {
        if args.repl {
            run_repl(app, open_rx)
        } else {
            run_keyboard_ui(app, open_rx)
        }
    });

    if let Some(server) = server {
        server.shutdown().await;
    }

    info!(marker = "APP_EXIT", operation_type = "startup", "Application exited");
    result
}

fn run_keyboard_ui(app: AppState, open_rx: Option<UnboundedReceiver<PathBuf>>) -> Result<()> {
    theme::init_theme();
    let mut terminal: AppTerminal = setup_terminal().context("Failed to initialize terminal")?;

    let mut event_loop: EventLoop = EventLoop::new(app);
    if let Some(rx) = open_rx {
        event_loop = event_loop.with_open_requests(rx);
    }
    let result = event_loop.run(&mut terminal);

    cleanup_terminal(&mut terminal)?;
    result.context("Application runtime error")
}

fn run_repl(app: AppState, open_rx: Option<UnboundedReceiver<PathBuf>>) -> Result<()> {
    let stdin = io::stdin();
    let mut repl = Repl::new(app, stdin.lock(), io::stdout());
    if let Some(rx) = open_rx {
        repl = repl.with_open_requests(rx);
    }
    repl.run().context("Line interface error")
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout: Stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
