//! Effect executor.
//!
//! [`Runtime::start`] spawns a task that owns the controller state. Actions
//! are processed one at a time from an mpsc channel; after each one the new
//! state is published on a watch channel. Network effects run as independent
//! tasks that report back with an action. They are neither serialized nor
//! cancelled. Seek requests go out on a separate channel for whoever owns the
//! [`PlaybackSurface`](crate::playback::PlaybackSurface).

use std::sync::Arc;

use lus_core::wire::ChangePasswordRequest;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::action::{Action, Effect};
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::controller::{reduce, Transition};
use crate::state::AppState;

/// Commands for the media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Seek { seconds: f64 },
}

/// Errors from talking to a running [`Runtime`].
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Runtime has stopped")]
    Stopped,
}

/// Handle to a running controller.
pub struct Runtime {
    actions: mpsc::UnboundedSender<Action>,
    state: watch::Receiver<Arc<AppState>>,
    media: mpsc::UnboundedReceiver<MediaCommand>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Runtime {
    /// Spawn the controller loop and dispatch [`Action::Init`].
    pub fn start(api: ApiClient, config: &ClientConfig) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (media_tx, media_rx) = mpsc::unbounded_channel();
        let initial = Arc::new(AppState::new(config));
        let (state_tx, state_rx) = watch::channel(Arc::clone(&initial));
        let cancel = CancellationToken::new();

        let executor = Executor {
            api: Arc::new(api),
            actions: action_tx.clone(),
            media: media_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(run(initial, action_rx, state_tx, executor, cancel.clone()));

        // The receiver is alive until `task` ends, which cannot happen yet.
        let _ = action_tx.send(Action::Init);
        tracing::info!(base_url = %config.api_base_url, "Annotation runtime started");

        Self {
            actions: action_tx,
            state: state_rx,
            media: media_rx,
            cancel,
            task,
        }
    }

    pub fn dispatch(&self, action: Action) -> Result<(), RuntimeError> {
        self.actions.send(action).map_err(|_| RuntimeError::Stopped)
    }

    /// Latest state snapshot.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.state.clone()
    }

    /// Wait until a snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&AppState) -> bool,
    ) -> Result<Arc<AppState>, RuntimeError> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|s| predicate(s.as_ref()))
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        Ok(Arc::clone(&state))
    }

    /// Next command for the media element, if any is queued.
    pub fn try_next_media_command(&mut self) -> Option<MediaCommand> {
        self.media.try_recv().ok()
    }

    pub async fn next_media_command(&mut self) -> Option<MediaCommand> {
        self.media.recv().await
    }

    /// Stop the loop and wait for it to exit. In-flight requests are
    /// abandoned.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Annotation runtime task failed");
        }
        tracing::info!("Annotation runtime stopped");
    }
}

async fn run(
    initial: Arc<AppState>,
    mut actions: mpsc::UnboundedReceiver<Action>,
    state_tx: watch::Sender<Arc<AppState>>,
    executor: Executor,
    cancel: CancellationToken,
) {
    let mut current = initial;
    loop {
        let action = tokio::select! {
            () = cancel.cancelled() => break,
            action = actions.recv() => match action {
                Some(action) => action,
                None => break,
            },
        };

        let Transition { state, effects } = reduce(&current, action);
        current = Arc::new(state);
        state_tx.send_replace(Arc::clone(&current));

        for effect in effects {
            executor.execute(effect);
        }
    }
}

struct Executor {
    api: Arc<ApiClient>,
    actions: mpsc::UnboundedSender<Action>,
    media: mpsc::UnboundedSender<MediaCommand>,
    cancel: CancellationToken,
}

impl Executor {
    fn execute(&self, effect: Effect) {
        match effect {
            Effect::LoadUsers => self.spawn(|api| async move {
                Action::UsersLoaded(api.list_users().await.map_err(|e| e.user_message()))
            }),
            Effect::LoadPatients => self.spawn(|api| async move {
                Action::PatientsLoaded(api.list_patients().await.map_err(|e| e.user_message()))
            }),
            Effect::LoadVideos {
                request,
                patient_id,
                class,
            } => self.spawn(move |api| async move {
                let result = api
                    .list_videos(&patient_id, class)
                    .await
                    .map_err(|e| e.user_message());
                Action::VideosLoaded {
                    request,
                    patient_id,
                    class,
                    result,
                }
            }),
            Effect::Login { username, password } => self.spawn(move |api| async move {
                let result = api
                    .login(&username, &password)
                    .await
                    .map_err(|e| e.user_message());
                Action::LoginFinished { username, result }
            }),
            Effect::ChangePassword {
                username,
                old_password,
                new_password,
            } => self.spawn(move |api| async move {
                let request = ChangePasswordRequest {
                    username,
                    old_password,
                    new_password,
                };
                Action::PasswordChangeFinished(
                    api.change_password(&request)
                        .await
                        .map_err(|e| e.user_message()),
                )
            }),
            Effect::LoadHistory { annotator } => self.spawn(move |api| async move {
                let result = api
                    .list_history(&annotator)
                    .await
                    .map_err(|e| e.user_message());
                Action::HistoryLoaded { annotator, result }
            }),
            Effect::PostHistory {
                annotator,
                local_id,
                entry,
            } => self.spawn(move |api| async move {
                let result = api.post_history(&entry).await.map_err(|e| e.user_message());
                Action::HistoryPersisted {
                    annotator,
                    local_id,
                    result,
                }
            }),
            Effect::DeleteHistory { id } => self.spawn(move |api| async move {
                let result = api.delete_history(id).await.map_err(|e| e.user_message());
                Action::HistoryDeleteFinished { id, result }
            }),
            Effect::Seek { seconds } => {
                // Nobody listening just means no player is mounted.
                let _ = self.media.send(MediaCommand::Seek { seconds });
            }
            Effect::ScheduleHighlightClear { token, after } => {
                let actions = self.actions.clone();
                let cancel = self.cancel.clone();
                // Deadline counts from now, not from when the task first runs.
                let sleep = tokio::time::sleep(after);
                tokio::spawn(async move {
                    tokio::select! {
                        () = cancel.cancelled() => {}
                        () = sleep => {
                            let _ = actions.send(Action::HighlightExpired(token));
                        }
                    }
                });
            }
        }
    }

    /// Run a request on its own task and feed the resulting action back.
    fn spawn<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<ApiClient>) -> Fut,
        Fut: std::future::Future<Output = Action> + Send + 'static,
    {
        let future = request(Arc::clone(&self.api));
        let actions = self.actions.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                action = future => {
                    let _ = actions.send(action);
                }
            }
        });
    }
}
