//! Active Sessions panel
//!
//! Lists the user's login sessions and lets them revoke any session other
//! than the one they are using.

use leptos::*;
use std::rc::Rc;
use uvlhub_common::SessionInfo;

use crate::api::ApiClient;
use crate::browser::{self, BrowserDialogs};
use crate::config::PageConfig;
use crate::controllers::{SessionPanel, SessionView};

/// Id of the JSON block carrying the initial session list
pub const SESSIONS_DATA_ID: &str = "sessions-data";

/// Rows held in a signal; removing one re-renders the table
#[derive(Clone, Copy)]
pub struct SignalSessionView {
    sessions: RwSignal<Vec<SessionInfo>>,
}

impl SessionView for SignalSessionView {
    fn remove_row(&self, session_id: &str) {
        self.sessions
            .update(|sessions| sessions.retain(|s| s.session_id != session_id));
    }

    fn remaining_rows(&self) -> Option<usize> {
        // The current session has no revoke button and does not count
        Some(
            self.sessions
                .with_untracked(|sessions| sessions.iter().filter(|s| !s.is_current).count()),
        )
    }

    fn reload(&self) {
        browser::reload_page();
    }
}

type Panel = SessionPanel<ApiClient, SignalSessionView, BrowserDialogs>;

#[component]
pub fn SessionsPanel(
    sessions: Vec<SessionInfo>,
    #[prop(optional)] config: Option<PageConfig>,
) -> impl IntoView {
    let config = config.unwrap_or_default();
    let rows = create_rw_signal(sessions);
    let pending = create_rw_signal(false);
    let panel: StoredValue<Rc<Panel>> = store_value(Rc::new(SessionPanel::new(
        ApiClient::new(&config),
        SignalSessionView { sessions: rows },
        BrowserDialogs,
    )));

    let revoke = move |session_id: String| {
        let panel = panel.get_value();
        spawn_local(async move {
            pending.set(true);
            panel.revoke_session(&session_id).await;
            pending.set(false);
        });
    };

    let revoke_all = move || {
        let panel = panel.get_value();
        spawn_local(async move {
            pending.set(true);
            panel.revoke_all_sessions().await;
            pending.set(false);
        });
    };

    let other_sessions = move || rows.with(|r| r.iter().filter(|s| !s.is_current).count());

    view! {
        <div class="sessions-panel">
            <div class="d-flex justify-content-between align-items-center mb-3">
                <h2>"Active Sessions"</h2>
                <button
                    class="btn btn-outline-danger"
                    disabled=move || pending.get() || other_sessions() == 0
                    on:click=move |_| revoke_all()
                >
                    "Revoke all other sessions"
                </button>
            </div>

            {move || if other_sessions() == 0 {
                view! {
                    <div class="empty-state">
                        <p>"No other active sessions. You are only signed in on this device."</p>
                    </div>
                }.into_view()
            } else {
                view! {
                    <table class="table align-middle">
                        <thead>
                            <tr>
                                <th>"Device"</th>
                                <th>"Location"</th>
                                <th>"IP Address"</th>
                                <th>"Last Active"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {rows.get().into_iter().map(|session| {
                                let now = chrono::Utc::now();
                                let session_id = session.session_id.clone();
                                view! {
                                    <tr
                                        id={format!("session-{}", session.session_id)}
                                        class:table-active=session.is_current
                                        class:text-muted=session.is_expired_at(now)
                                    >
                                        <td>
                                            <i class={format!("fa {}", session.icon_class())}></i>
                                            " "
                                            <span title={session.user_agent.clone().unwrap_or_default()}>
                                                {session.device_label()}
                                            </span>
                                        </td>
                                        <td>{session.location.clone().unwrap_or_else(|| "Unknown".to_string())}</td>
                                        <td>
                                            <code>{session.ip_address.clone().unwrap_or_else(|| "Unknown".to_string())}</code>
                                        </td>
                                        <td title={session.last_activity.format("%Y-%m-%d %H:%M:%S UTC").to_string()}>
                                            {session.last_active_label(now)}
                                        </td>
                                        <td class="text-end">
                                            {if session.is_current {
                                                view! {
                                                    <span class="badge bg-success">"Current session"</span>
                                                }.into_view()
                                            } else {
                                                view! {
                                                    <button
                                                        class="btn btn-sm btn-danger"
                                                        title="Revoke this session"
                                                        disabled=move || pending.get()
                                                        on:click=move |_| revoke(session_id.clone())
                                                    >
                                                        "Revoke"
                                                    </button>
                                                }.into_view()
                                            }}
                                        </td>
                                    </tr>
                                }
                            }).collect_view()}
                        </tbody>
                    </table>
                }.into_view()
            }}
        </div>
    }
}
