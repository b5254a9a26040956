pub mod error;

pub mod config;

pub mod controller {

    pub mod actions;
    pub use actions::{Action, Effect, PromptKind};

    pub mod action_dispatcher;
    pub use action_dispatcher::{complete_process, dispatch};

    pub mod event_loop;
    pub use event_loop::EventLoop;

    pub mod repl;
    pub use repl::{Repl, ReplCommand};

    pub mod handlers;
}

pub mod model {
    pub mod app_state;

    pub mod fs_state;
    pub use fs_state::{PaneState, SearchDirection};

    pub mod history;
    pub use history::{HistoryStore, NavigationHistory};

    pub mod marks;
    pub use marks::{Mark, MarksStore};

    pub mod ui_state;
    pub use ui_state::{Notification, NotificationLevel, UIMode, UIState};
}

pub mod view {
    pub mod theme;

    pub mod ui;

    pub mod components {
        pub mod help_overlay;
        pub use help_overlay::HelpOverlay;
        pub mod object_table;
        pub use object_table::ObjectTable;
        pub mod prompt_bar;
        pub use prompt_bar::PromptBar;
        pub mod status_bar;
        pub use status_bar::StatusBar;
    }
}

pub mod fs {
    pub mod dir_scanner;
    pub mod object_info;
}

pub mod operators {
    pub mod file_system_operator;

    pub mod process_operator;
}

pub mod ipc {
    pub mod single_instance;
    pub use single_instance::InstanceServer;
}

pub mod logging;
pub use logging::LoggerBuilder;

pub mod util {
    pub mod paths;
}

pub use error::AppError;

pub use model::app_state::AppState;
