// File: ./src/tui/gateway.rs
// Background task that owns the storage and answers UI actions.
use crate::model::UserAction;
use crate::storage::LocalStorage;
use crate::tui::action::{Action, AppEvent};
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, Sender};

pub async fn run(storage: LocalStorage, mut actions: Receiver<Action>, events: Sender<AppEvent>) {
    let storage = Arc::new(storage);
    while let Some(action) = actions.recv().await {
        if matches!(action, Action::Quit) {
            break;
        }
        let storage = Arc::clone(&storage);
        let outcome = tokio::task::spawn_blocking(move || handle(&storage, action)).await;
        let reply = match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                log::error!("Gateway error: {:#}", e);
                AppEvent::Error(format!("{:#}", e))
            }
            Err(e) => AppEvent::Error(format!("Storage task failed: {}", e)),
        };
        if events.send(reply).await.is_err() {
            break;
        }
    }
    log::debug!("Gateway stopped");
}

fn handle(storage: &LocalStorage, action: Action) -> anyhow::Result<AppEvent> {
    let (user_action, event) = match action {
        Action::Reload => return storage.load().map(AppEvent::TripLoaded),
        Action::AddEvent(e) => (UserAction::AddEvent, e),
        Action::UpdateEvent(e) => (UserAction::UpdateEvent, e),
        Action::DeleteEvent(e) => (UserAction::DeleteEvent, e),
        Action::Quit => return Ok(AppEvent::Status("Bye".to_string())),
    };
    storage.apply(user_action, &event)?;
    let verb = match user_action {
        UserAction::AddEvent => "Added",
        UserAction::UpdateEvent => "Saved",
        UserAction::DeleteEvent => "Deleted",
    };
    Ok(AppEvent::Status(format!(
        "{} {} to {}",
        verb, event.kind, event.destination.name
    )))
}
