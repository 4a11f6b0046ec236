//! Session revocation
//!
//! Rows are removed only after the server confirms; when the last row goes,
//! the view is reloaded so the server renders its own empty state.

use leptos::logging;
use std::cell::Cell;

use super::{Dialogs, InFlight};
use crate::api::SessionApi;

pub const CONFIRM_REVOKE_SESSION: &str =
    "Are you sure you want to revoke this session? The device will be logged out immediately.";
pub const CONFIRM_REVOKE_ALL: &str = "Are you sure you want to revoke all other sessions? All other devices will be logged out immediately.";

/// What the session panel shows
pub trait SessionView {
    fn remove_row(&self, session_id: &str);
    /// Rows still displayed, `None` when the page has no session table
    fn remaining_rows(&self) -> Option<usize>;
    fn reload(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The user declined the prompt
    Cancelled,
    /// Another revocation is still pending
    Busy,
    Removed,
    Reloaded,
    /// Message already shown to the user
    Failed(String),
}

pub struct SessionPanel<A, V, D> {
    api: A,
    view: V,
    dialogs: D,
    pending: Cell<bool>,
}

impl<A, V, D> SessionPanel<A, V, D>
where
    A: SessionApi,
    V: SessionView,
    D: Dialogs,
{
    pub fn new(api: A, view: V, dialogs: D) -> Self {
        Self {
            api,
            view,
            dialogs,
            pending: Cell::new(false),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub async fn revoke_session(&self, session_id: &str) -> RevokeOutcome {
        if self.is_pending() {
            logging::warn!("revocation of {} ignored: another one is pending", session_id);
            return RevokeOutcome::Busy;
        }
        if !self.dialogs.confirm(CONFIRM_REVOKE_SESSION) {
            return RevokeOutcome::Cancelled;
        }

        let result = match InFlight::begin(&self.pending) {
            Some(_in_flight) => self.api.revoke_session(session_id).await,
            None => return RevokeOutcome::Busy,
        };

        match result {
            Ok(response) if response.success => {
                logging::log!("session {} revoked", session_id);
                self.view.remove_row(session_id);
                if self.view.remaining_rows() == Some(0) {
                    self.view.reload();
                    RevokeOutcome::Reloaded
                } else {
                    RevokeOutcome::Removed
                }
            }
            Ok(response) => self.fail(format!(
                "Error revoking session: {}",
                response.failure_message()
            )),
            Err(e) => self.fail(format!("Error revoking session: {}", e)),
        }
    }

    /// Revokes every session except the current one, then reloads: the
    /// server decides what remains.
    pub async fn revoke_all_sessions(&self) -> RevokeOutcome {
        if self.is_pending() {
            logging::warn!("revoke-all ignored: another revocation is pending");
            return RevokeOutcome::Busy;
        }
        if !self.dialogs.confirm(CONFIRM_REVOKE_ALL) {
            return RevokeOutcome::Cancelled;
        }

        let result = match InFlight::begin(&self.pending) {
            Some(_in_flight) => self.api.revoke_all_sessions().await,
            None => return RevokeOutcome::Busy,
        };

        match result {
            Ok(response) if response.success => {
                logging::log!("all other sessions revoked");
                self.view.reload();
                RevokeOutcome::Reloaded
            }
            Ok(response) => self.fail(format!(
                "Error revoking sessions: {}",
                response.failure_message()
            )),
            Err(e) => self.fail(format!("Error revoking sessions: {}", e)),
        }
    }

    fn fail(&self, message: String) -> RevokeOutcome {
        logging::warn!("{}", message);
        self.dialogs.alert(&message);
        RevokeOutcome::Failed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::controllers::fakes::FakeDialogs;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::FutureExt;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::pin::pin;
    use uvlhub_common::RevokeResponse;

    #[derive(Default)]
    struct FakeApi {
        responses: RefCell<VecDeque<Result<RevokeResponse, ApiError>>>,
        calls: RefCell<Vec<String>>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    impl FakeApi {
        fn answering(response: Result<RevokeResponse, ApiError>) -> Self {
            let api = Self::default();
            api.responses.borrow_mut().push_back(response);
            api
        }

        async fn answer(&self, call: String) -> Result<RevokeResponse, ApiError> {
            self.calls.borrow_mut().push(call);
            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(RevokeResponse::default()))
        }
    }

    impl SessionApi for &FakeApi {
        async fn revoke_session(&self, session_id: &str) -> Result<RevokeResponse, ApiError> {
            self.answer(format!("revoke:{}", session_id)).await
        }

        async fn revoke_all_sessions(&self) -> Result<RevokeResponse, ApiError> {
            self.answer("revoke-all".to_string()).await
        }
    }

    struct FakeView {
        rows: RefCell<Option<Vec<String>>>,
        reloads: Cell<usize>,
    }

    impl FakeView {
        fn with_rows(rows: &[&str]) -> Self {
            Self {
                rows: RefCell::new(Some(rows.iter().map(|r| r.to_string()).collect())),
                reloads: Cell::new(0),
            }
        }

        fn rows(&self) -> Vec<String> {
            self.rows.borrow().clone().unwrap_or_default()
        }
    }

    impl SessionView for &FakeView {
        fn remove_row(&self, session_id: &str) {
            if let Some(rows) = self.rows.borrow_mut().as_mut() {
                rows.retain(|row| row != session_id);
            }
        }

        fn remaining_rows(&self) -> Option<usize> {
            self.rows.borrow().as_ref().map(Vec::len)
        }

        fn reload(&self) {
            self.reloads.set(self.reloads.get() + 1);
        }
    }

    fn ok() -> Result<RevokeResponse, ApiError> {
        Ok(RevokeResponse {
            success: true,
            error: None,
        })
    }

    fn rejected(error: &str) -> Result<RevokeResponse, ApiError> {
        Ok(RevokeResponse {
            success: false,
            error: Some(error.to_string()),
        })
    }

    #[test]
    fn test_declined_revoke_has_no_effect() {
        let api = FakeApi::answering(ok());
        let view = FakeView::with_rows(&["a", "b"]);
        let dialogs = FakeDialogs::answering(false);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        assert_eq!(block_on(panel.revoke_session("a")), RevokeOutcome::Cancelled);
        assert_eq!(block_on(panel.revoke_all_sessions()), RevokeOutcome::Cancelled);

        assert!(api.calls.borrow().is_empty());
        assert_eq!(view.rows(), vec!["a", "b"]);
        assert_eq!(view.reloads.get(), 0);
        assert!(dialogs.alerts.borrow().is_empty());
        assert_eq!(
            *dialogs.confirms.borrow(),
            vec![CONFIRM_REVOKE_SESSION, CONFIRM_REVOKE_ALL]
        );
    }

    #[test]
    fn test_revoke_removes_only_that_row() {
        let api = FakeApi::answering(ok());
        let view = FakeView::with_rows(&["a", "b", "c"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        assert_eq!(block_on(panel.revoke_session("b")), RevokeOutcome::Removed);

        assert_eq!(*api.calls.borrow(), vec!["revoke:b"]);
        assert_eq!(view.rows(), vec!["a", "c"]);
        assert_eq!(view.reloads.get(), 0);
        assert!(!panel.is_pending());
    }

    #[test]
    fn test_revoking_last_row_reloads() {
        let api = FakeApi::answering(ok());
        let view = FakeView::with_rows(&["only"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        assert_eq!(block_on(panel.revoke_session("only")), RevokeOutcome::Reloaded);
        assert!(view.rows().is_empty());
        assert_eq!(view.reloads.get(), 1);
    }

    #[test]
    fn test_page_without_table_never_reloads() {
        let api = FakeApi::answering(ok());
        let view = FakeView {
            rows: RefCell::new(None),
            reloads: Cell::new(0),
        };
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        assert_eq!(block_on(panel.revoke_session("x")), RevokeOutcome::Removed);
        assert_eq!(view.reloads.get(), 0);
    }

    #[test]
    fn test_server_error_is_shown_verbatim() {
        let api = FakeApi::answering(rejected("X"));
        let view = FakeView::with_rows(&["a"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        let outcome = block_on(panel.revoke_session("a"));

        assert_eq!(outcome, RevokeOutcome::Failed("Error revoking session: X".to_string()));
        assert_eq!(*dialogs.alerts.borrow(), vec!["Error revoking session: X"]);
        assert_eq!(view.rows(), vec!["a"]);
        assert_eq!(view.reloads.get(), 0);
    }

    #[test]
    fn test_server_error_without_message_uses_fallback() {
        let api = FakeApi::answering(Ok(RevokeResponse::default()));
        let view = FakeView::with_rows(&["a"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        block_on(panel.revoke_session("a"));
        assert_eq!(*dialogs.alerts.borrow(), vec!["Error revoking session: Unknown error"]);
    }

    #[test]
    fn test_transport_error_includes_detail() {
        let api = FakeApi::answering(Err(ApiError::Network(
            "TypeError: Failed to fetch".to_string(),
        )));
        let view = FakeView::with_rows(&["a"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        block_on(panel.revoke_session("a"));

        assert_eq!(
            *dialogs.alerts.borrow(),
            vec!["Error revoking session: TypeError: Failed to fetch"]
        );
        assert_eq!(view.rows(), vec!["a"]);
        assert!(!panel.is_pending());
    }

    #[test]
    fn test_failed_revoke_can_be_retried() {
        let api = FakeApi::answering(rejected("Session not found"));
        api.responses.borrow_mut().push_back(ok());
        let view = FakeView::with_rows(&["a", "b"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        assert!(matches!(block_on(panel.revoke_session("a")), RevokeOutcome::Failed(_)));
        assert_eq!(block_on(panel.revoke_session("a")), RevokeOutcome::Removed);
        assert_eq!(api.calls.borrow().len(), 2);
    }

    #[test]
    fn test_revoke_all_reloads_on_success() {
        let api = FakeApi::answering(ok());
        let view = FakeView::with_rows(&["a", "b"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        assert_eq!(block_on(panel.revoke_all_sessions()), RevokeOutcome::Reloaded);
        assert_eq!(*api.calls.borrow(), vec!["revoke-all"]);
        assert_eq!(view.reloads.get(), 1);
    }

    #[test]
    fn test_revoke_all_failure() {
        let api = FakeApi::answering(rejected("No active session"));
        let view = FakeView::with_rows(&["a"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        block_on(panel.revoke_all_sessions());

        assert_eq!(
            *dialogs.alerts.borrow(),
            vec!["Error revoking sessions: No active session"]
        );
        assert_eq!(view.reloads.get(), 0);
    }

    #[test]
    fn test_second_revocation_refused_while_pending() {
        let api = FakeApi::answering(ok());
        let (release, gate) = oneshot::channel();
        *api.gate.borrow_mut() = Some(gate);
        let view = FakeView::with_rows(&["a", "b"]);
        let dialogs = FakeDialogs::answering(true);
        let panel = SessionPanel::new(&api, &view, &dialogs);

        let mut first = pin!(panel.revoke_session("a"));
        assert!(first.as_mut().now_or_never().is_none());
        assert!(panel.is_pending());

        assert_eq!(block_on(panel.revoke_session("b")), RevokeOutcome::Busy);
        assert_eq!(block_on(panel.revoke_all_sessions()), RevokeOutcome::Busy);
        assert_eq!(dialogs.confirms.borrow().len(), 1);

        release.send(()).unwrap();
        assert_eq!(block_on(first), RevokeOutcome::Removed);
        assert!(!panel.is_pending());
        assert_eq!(*api.calls.borrow(), vec!["revoke:a"]);
    }
}
