// pi-core/src/controller/action_dispatcher/command_dispatcher.rs
// Turns a submitted prompt line into the command it stands for

use crate::controller::actions::{Action, Effect, PromptKind};
use crate::error::AppError;
use crate::model::app_state::AppState;

pub(super) fn submit_prompt(app: &mut AppState) -> Result<Effect, AppError> {
    let Some((kind, text)) = app.ui.take_prompt() else {
        return Ok(Effect::None);
    };
    let text: String = text.to_string();
    let non_empty: Option<String> = Some(text.trim().to_string()).filter(|t: &String| !t.is_empty());

    let action: Action = match kind {
        PromptKind::CreateFile => Action::CreateFile(text),
        PromptKind::CreateDirectory => Action::CreateDirectory(text),
        PromptKind::Rename(source) => Action::Rename {
            source,
            new_name: text,
        },
        PromptKind::GoTo => non_empty.map_or(Action::NoOp, Action::GoTo),
        PromptKind::Search => {
            if text.is_empty() {
                Action::NoOp
            } else {
                Action::Find(text)
            }
        }
        PromptKind::Filter => Action::SetFilter(Some(text)),
        PromptKind::Mark => Action::Mark(non_empty),
    };

    Ok(super::dispatch(app, action))
}
