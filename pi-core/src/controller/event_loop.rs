//! src/controller/event_loop.rs
//! ============================================================================
//! # EventLoop: the keyboard front end
//!
//! Draw, wait up to one tick for a terminal event, translate a key press into
//! an [`Action`], dispatch it and carry out the returned [`Effect`]. External
//! programs run with the terminal handed back to them and the engine blocked
//! until they exit. Paths received from other invocations are applied on
//! every pass.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event as TerminalEvent, KeyEvent, KeyEventKind};
use ratatui::CompletedFrame;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, instrument};

use crate::controller::action_dispatcher::{complete_process, dispatch};
use crate::controller::actions::{Action, Effect};
use crate::controller::handlers::keyboard_handler::KeyboardHandler;
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::model::ui_state::UIMode;
use crate::operators::process_operator::{self, ProcessOutcome, ProcessRequest, SuspendedTerminal};
use crate::view::ui::{AppTerminal, UIRenderer, listing_height};

pub struct EventLoop {
    app: AppState,
    keyboard: KeyboardHandler,
    renderer: UIRenderer,
    open_rx: Option<UnboundedReceiver<PathBuf>>,
    tick: Duration,
}

impl EventLoop {
    pub fn new(app: AppState) -> Self {
        let keyboard: KeyboardHandler = KeyboardHandler::new(&app.config.bindings);
        let renderer: UIRenderer = UIRenderer::new(keyboard.help_lines());
        let tick: Duration = app.config.tick;
        Self {
            app,
            keyboard,
            renderer,
            open_rx: None,
            tick,
        }
    }

    /// Paths from other invocations, opened as they arrive.
    #[must_use]
    pub fn with_open_requests(mut self, open_rx: UnboundedReceiver<PathBuf>) -> Self {
        self.open_rx = Some(open_rx);
        self
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    /// Run until quit. Blocks the calling thread.
    #[instrument(level = "info", skip_all)]
    pub fn run(&mut self, terminal: &mut AppTerminal) -> Result<(), AppError> {
        info!(
            marker = "EVENT_LOOP_START",
            operation_type = "event_loop",
            cwd = %self.app.cwd().display(),
            "Keyboard interface started"
        );

        loop {
            self.drain_open_requests(terminal)?;
            self.draw(terminal)?;

            if !event::poll(self.tick)? {
                self.on_tick();
                continue;
            }

            let effect: Effect = match event::read()? {
                TerminalEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    self.handle_key(key_event)
                }
                TerminalEvent::Resize(width, height) => {
                    debug!(
                        marker = "TERMINAL_RESIZED",
                        operation_type = "event_loop",
                        width,
                        height,
                        "Terminal resized"
                    );
                    Effect::None
                }
                _ => Effect::None,
            };

            match effect {
                Effect::None => {}
                Effect::Quit => break,
                Effect::Spawn(request) => self.run_program(terminal, &request)?,
            }
        }

        info!(
            marker = "EVENT_LOOP_EXIT",
            operation_type = "event_loop",
            "Keyboard interface stopped"
        );
        Ok(())
    }

    fn draw(&mut self, terminal: &mut AppTerminal) -> Result<(), AppError> {
        let (renderer, app): (&mut UIRenderer, &AppState) = (&mut self.renderer, &self.app);
        let completed: CompletedFrame<'_> = terminal.draw(|f| renderer.render(f, app))?;
        self.app.pane.viewport_height = listing_height(completed.area).max(1);
        Ok(())
    }

    fn handle_key(&mut self, key_event: KeyEvent) -> Effect {
        let action: Action = self.keyboard.handle(key_event, &self.app.ui);
        if action == Action::NoOp {
            return Effect::None;
        }
        dispatch(&mut self.app, action)
    }

    /// Hand the terminal to the program, wait for it and fold the outcome
    /// back into the engine. A failure is shown on the plain terminal until
    /// the user presses Enter.
    fn run_program(
        &mut self,
        terminal: &mut AppTerminal,
        request: &ProcessRequest,
    ) -> Result<(), AppError> {
        let result: Result<ProcessOutcome, AppError> = {
            let suspended: SuspendedTerminal<'_> = SuspendedTerminal::new(terminal)?;
            let result = process_operator::run(request, &self.app.config.programs);
            let failure: Option<String> = match &result {
                Ok(outcome) => outcome.failure().map(|e: AppError| e.to_string()),
                Err(e) => Some(e.to_string()),
            };
            if let Some(message) = failure {
                suspended.acknowledge(&message);
            }
            result
        };
        complete_process(&mut self.app, request, result);
        Ok(())
    }

    fn drain_open_requests(&mut self, terminal: &mut AppTerminal) -> Result<(), AppError> {
        let mut received: Vec<PathBuf> = Vec::new();
        if let Some(rx) = self.open_rx.as_mut() {
            while let Ok(path) = rx.try_recv() {
                received.push(path);
            }
        }
        for path in received {
            info!(
                marker = "OPEN_REQUEST",
                operation_type = "ipc",
                path = %path.display(),
                "Opening path from another invocation"
            );
            if let Effect::Spawn(request) = dispatch(&mut self.app, Action::OpenPath(path)) {
                self.run_program(terminal, &request)?;
            }
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        if self.app.config.auto_refresh && self.app.ui.mode == UIMode::Browsing {
            self.app.pane.refresh();
        }
        self.app.ui.update_notification();
    }
}
