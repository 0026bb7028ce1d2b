//! The widget controller: user intents in, session mutations and API calls out.
//!
//! All state lives in one [`SessionState`] behind a `RefCell`. Borrows are never
//! held across an `.await`, so hosts may run several operations concurrently on
//! the UI thread (`spawn_local` in the browser, a `LocalSet` in the terminal).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::events::Intent;
use super::file::{ActiveFile, UploadSource};
use super::sequence::{SettleRejection, Settlement};
use super::session::{SessionState, StatusTicket};
use super::view::{WidgetView, render};
use crate::api::{ChatApi, ChatRequest};
use crate::settings::DEFAULT_STATUS_CLEAR_MILLIS;
use crate::timer::Sleeper;

pub const GENERIC_CHAT_ERROR: &str =
    "Sorry, there was an error processing your request. Please try again.";
pub const STATUS_UPLOADING: &str = "Uploading...";
pub const STATUS_UPLOAD_SUCCEEDED: &str = "Upload successful!";
pub const STATUS_UPLOAD_FAILED: &str = "Upload failed!";

/// Called with a fresh snapshot after every state change.
pub type ViewObserver = Rc<dyn Fn(&WidgetView)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to send: empty text and no active file.
    Skipped,
    Replied,
    /// The request failed and the generic error bubble was shown.
    Failed,
    /// A newer reply was already shown; this one was dropped.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Attached,
    Rejected,
    Failed,
    /// A newer upload already settled; this result was dropped.
    Discarded,
}

pub struct ChatWidgetController<A, S> {
    api: A,
    sleeper: S,
    status_clear_delay: Duration,
    session: RefCell<SessionState>,
    observer: RefCell<Option<ViewObserver>>,
}

impl<A, S> ChatWidgetController<A, S>
where
    A: ChatApi,
    S: Sleeper,
{
    pub fn new(api: A, sleeper: S) -> Self {
        Self {
            api,
            sleeper,
            status_clear_delay: Duration::from_millis(DEFAULT_STATUS_CLEAR_MILLIS),
            session: RefCell::new(SessionState::new()),
            observer: RefCell::new(None),
        }
    }

    pub fn with_status_clear_delay(mut self, delay: Duration) -> Self {
        self.status_clear_delay = delay;
        self
    }

    pub fn set_observer(&self, observer: ViewObserver) {
        *self.observer.borrow_mut() = Some(observer);
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> WidgetView {
        render(&self.session.borrow())
    }

    pub fn active_file(&self) -> Option<ActiveFile> {
        self.session.borrow().active_file.clone()
    }

    pub fn draft(&self) -> String {
        self.session.borrow().draft.clone()
    }

    /// Mirrors the input field so a later [`Self::submit_draft`] can read it.
    pub fn set_draft(&self, text: impl Into<String>) {
        self.session.borrow_mut().draft = text.into();
        self.publish();
    }

    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.draft();
        self.submit_message(&draft).await
    }

    /// Routes one host intent to the matching operation.
    pub async fn dispatch(&self, intent: Intent) {
        match intent {
            Intent::Submit(submit) => {
                self.submit_message(&submit.content).await;
            }
            Intent::FileSelected(file) => {
                self.upload_file(file).await;
            }
            Intent::ClearFile => self.clear_active_file().await,
            Intent::ClosePreview => self.close_preview(),
        }
    }

    /// Sends one chat turn, attaching the active file's content when known.
    ///
    /// The active file stays attached afterwards.
    pub async fn submit_message(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();

        let (seq, request) = {
            let mut session = self.session.borrow_mut();
            if text.is_empty() && !session.has_active_file() {
                return SubmitOutcome::Skipped;
            }

            if !text.is_empty() {
                session.push_user_text(text);
            }
            session.draft.clear();
            session.preview.hide();

            let mut request = ChatRequest::new(text);
            if let Some(content) = session
                .active_file
                .as_ref()
                .and_then(ActiveFile::chat_content)
            {
                request = request.with_file_content(content);
            }

            (session.chat_requests.begin(), request)
        };
        self.publish();

        tracing::debug!(seq = %seq, "chat request issued");
        let result = self.api.chat(request).await;

        let outcome = {
            let mut session = self.session.borrow_mut();
            match Self::settlement(session.chat_requests.settle(seq)) {
                Settlement::Stale { superseded_by } => {
                    tracing::info!(
                        seq = %seq,
                        superseded_by = %superseded_by,
                        "dropping chat response that resolved after a newer one"
                    );
                    SubmitOutcome::Discarded
                }
                Settlement::Apply => match result {
                    Ok(reply) => {
                        session.push_bot_text(reply);
                        SubmitOutcome::Replied
                    }
                    Err(error) => {
                        tracing::error!(seq = %seq, error = %error, "chat request failed");
                        session.push_bot_text(GENERIC_CHAT_ERROR);
                        SubmitOutcome::Failed
                    }
                },
            }
        };
        self.publish();
        outcome
    }

    /// Uploads `file` and makes it the active file on success.
    ///
    /// Returns once the resulting status text has expired.
    pub async fn upload_file(&self, file: UploadSource) -> UploadOutcome {
        let local_name = file.file_name.clone();
        let seq = {
            let mut session = self.session.borrow_mut();
            session.upload_status.show(STATUS_UPLOADING);
            session.uploads.begin()
        };
        self.publish();

        tracing::debug!(seq = %seq, file_name = %local_name, "upload issued");
        let result = self.api.upload(file).await;

        let (outcome, ticket) = {
            let mut session = self.session.borrow_mut();
            // Only an attached file supersedes older uploads.
            match Self::settlement(session.uploads.finish(seq)) {
                Settlement::Stale { superseded_by } => {
                    tracing::info!(
                        seq = %seq,
                        superseded_by = %superseded_by,
                        "dropping upload result that resolved after a newer one"
                    );
                    return UploadOutcome::Discarded;
                }
                Settlement::Apply => match result {
                    Ok(uploaded) => {
                        session.uploads.mark_applied(seq);
                        tracing::info!(
                            filename = %uploaded.filename,
                            file_type = uploaded.file_type.as_str(),
                            "file attached"
                        );
                        session.push_attachment(local_name, uploaded.file_type);
                        session.attach(uploaded);
                        (
                            UploadOutcome::Attached,
                            session.upload_status.show(STATUS_UPLOAD_SUCCEEDED),
                        )
                    }
                    Err(error) => {
                        tracing::error!(seq = %seq, error = %error, "upload failed");
                        match error.rejection_message() {
                            Some(message) => (
                                UploadOutcome::Rejected,
                                session.upload_status.show(message),
                            ),
                            None => (
                                UploadOutcome::Failed,
                                session.upload_status.show(STATUS_UPLOAD_FAILED),
                            ),
                        }
                    }
                },
            }
        };
        self.publish();

        self.expire_status_after(ticket).await;
        outcome
    }

    /// Detaches the file on the server, then locally whatever the server said.
    pub async fn clear_active_file(&self) {
        if let Err(error) = self.api.clear_file().await {
            tracing::error!(error = %error, "failed to clear file on server");
        }

        self.session.borrow_mut().detach();
        self.publish();
    }

    /// Shows the server's session file in the indicator without fetching its content.
    pub async fn sync_active_file_on_load(&self) {
        let generation = self.session.borrow().file_generation();
        let status = match self.api.file_status().await {
            Ok(status) => status,
            Err(error) => {
                tracing::error!(error = %error, "failed to check file status");
                return;
            }
        };

        let filename = match status.filename {
            Some(filename) if status.has_active_file => filename,
            _ => return,
        };

        {
            let mut session = self.session.borrow_mut();
            // A local upload or clear is newer than what the server reported.
            if session.file_generation() != generation || session.has_active_file() {
                tracing::info!(
                    filename = %filename,
                    "skipping file status that a local change superseded"
                );
                return;
            }
            tracing::info!(filename = %filename, "restored active file from session");
            session.active_file = Some(ActiveFile::Restored {
                filename,
                file_type: status.file_type,
            });
        }
        self.publish();
    }

    pub fn close_preview(&self) {
        self.session.borrow_mut().preview.hide();
        self.publish();
    }

    async fn expire_status_after(&self, ticket: StatusTicket) {
        self.sleeper.sleep(self.status_clear_delay).await;

        let expired = self.session.borrow_mut().upload_status.expire(ticket);
        if expired {
            self.publish();
        }
    }

    fn settlement(settled: Result<Settlement, SettleRejection>) -> Settlement {
        settled.unwrap_or_else(|rejection| {
            // Each seq is settled exactly once by the task that issued it.
            tracing::warn!(?rejection, "request settled outside the tracker");
            Settlement::Apply
        })
    }

    fn publish(&self) {
        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            let view = self.view();
            observer(&view);
        }
    }
}
