//! The main event loop: user input first, then background channels, then a
//! throttled render.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event;
use ratatui::prelude::*;

use crate::actions::{Action, ActionResult, apply_action, streaming};
use crate::config::{EnvConfig, PROMPTS};
use crate::constants::{EVENT_POLL_MS, GEMINI_MODEL, RENDER_THROTTLE_MS};
use crate::events::handle_event;
use crate::export::{self, ExportError};
use crate::github::{GithubClient, RepoRef};
use crate::llms::{LlmClient, StreamEnvelope, StreamEvent, build_chat_request, build_document_request, start_streaming};
use crate::logging::log_error;
use crate::platform::PlatformClient;
use crate::remote::{RemoteRequest, RemoteUpdate, dispatch};
use crate::state::tree::ROOT_PATH;
use crate::state::{AuthPhase, SelectedFile, State, now_ms};
use crate::ui;

/// All channels the loop drains, created in `main`.
pub struct Channels {
    pub remote_tx: Sender<RemoteUpdate>,
    pub remote_rx: Receiver<RemoteUpdate>,
    pub chat_tx: Sender<StreamEnvelope>,
    pub chat_rx: Receiver<StreamEnvelope>,
    pub doc_tx: Sender<StreamEnvelope>,
    pub doc_rx: Receiver<StreamEnvelope>,
    pub export_tx: Sender<(u64, Result<Option<PathBuf>, ExportError>)>,
    pub export_rx: Receiver<(u64, Result<Option<PathBuf>, ExportError>)>,
}

pub struct App {
    pub state: State,
    github: GithubClient,
    platform: PlatformClient,
    llm: Arc<dyn LlmClient>,
    channels: Channels,
    last_render_ms: u64,
}

impl App {
    pub fn new(env: &EnvConfig, llm: Arc<dyn LlmClient>, channels: Channels) -> Self {
        Self {
            state: State::new(),
            github: GithubClient::new(None),
            platform: PlatformClient::new(env.server_url.clone(), env.session_cookie.clone()),
            llm,
            channels,
            last_render_ms: 0,
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        // Resolve the session before anything else; everything downstream
        // (token, repos, postings) chains off its completion.
        self.state.auth = AuthPhase::Loading;
        self.dispatch(RemoteRequest::Session);

        loop {
            let current_ms = now_ms();

            // === INPUT FIRST: minimal latency for key presses ===
            if event::poll(Duration::ZERO)? {
                let evt = event::read()?;
                let Some(action) = handle_event(&evt, &self.state) else {
                    break;
                };
                self.handle_action(action);

                if self.state.dirty {
                    terminal.draw(|frame| ui::render(frame, &mut self.state))?;
                    self.state.dirty = false;
                    self.last_render_ms = current_ms;
                }
            }

            // === BACKGROUND PROCESSING ===
            self.process_chat_events();
            self.process_doc_events();
            self.process_export_results();
            self.process_remote_updates();

            // Render if dirty, throttled while chunks pour in
            if self.state.dirty && current_ms.saturating_sub(self.last_render_ms) >= RENDER_THROTTLE_MS {
                terminal.draw(|frame| ui::render(frame, &mut self.state))?;
                self.state.dirty = false;
                self.last_render_ms = current_ms;
            }

            // Wait for the next event, waking periodically for the channels
            let _ = event::poll(Duration::from_millis(EVENT_POLL_MS))?;
        }

        Ok(())
    }

    fn dispatch(&self, request: RemoteRequest) {
        dispatch(
            request,
            self.github.clone(),
            self.platform.clone(),
            self.state.repo.clone(),
            self.channels.remote_tx.clone(),
        );
    }

    fn handle_action(&mut self, action: Action) {
        match apply_action(&mut self.state, action) {
            ActionResult::Nothing => {}
            ActionResult::Dispatch(request) => self.dispatch(request),
            ActionResult::OpenedRepo => {
                if self.state.tree.begin_root_fetch() {
                    self.dispatch(RemoteRequest::Listing { path: ROOT_PATH.to_string() });
                }
                self.state.snapshot_pending = true;
                self.dispatch(RemoteRequest::Snapshot);
            }
            ActionResult::StartChatStream => {
                let snapshot = self.state.snapshot.as_deref().unwrap_or("");
                let request = build_chat_request(GEMINI_MODEL, snapshot, &self.state.messages);
                start_streaming(
                    Arc::clone(&self.llm),
                    request,
                    self.state.stream_generation,
                    self.channels.chat_tx.clone(),
                );
            }
            ActionResult::StartDocStream => {
                let snapshot = self.state.snapshot.as_deref().unwrap_or("");
                let request = build_document_request(GEMINI_MODEL, &PROMPTS.documentation_prompt, snapshot);
                start_streaming(
                    Arc::clone(&self.llm),
                    request,
                    self.state.doc_generation,
                    self.channels.doc_tx.clone(),
                );
            }
        }
    }

    fn process_chat_events(&mut self) {
        while let Ok(envelope) = self.channels.chat_rx.try_recv() {
            match envelope.event {
                StreamEvent::Chunk(text) => streaming::handle_chunk(&mut self.state, envelope.generation, &text),
                StreamEvent::Done { output_tokens } => {
                    streaming::handle_stream_done(&mut self.state, envelope.generation, output_tokens)
                }
                StreamEvent::Error(error) => {
                    streaming::handle_stream_error(&mut self.state, envelope.generation, &error)
                }
            }
        }
    }

    fn process_doc_events(&mut self) {
        while let Ok(envelope) = self.channels.doc_rx.try_recv() {
            match envelope.event {
                StreamEvent::Chunk(text) => streaming::handle_doc_chunk(&mut self.state, envelope.generation, &text),
                StreamEvent::Done { .. } => {
                    if let Some(buffer) = streaming::handle_doc_done(&mut self.state, envelope.generation) {
                        self.spawn_export(buffer);
                    }
                }
                StreamEvent::Error(error) => {
                    streaming::handle_doc_error(&mut self.state, envelope.generation, &error)
                }
            }
        }
    }

    /// Typst compilation is CPU-heavy; it runs off the UI thread like every
    /// other slow operation.
    fn spawn_export(&self, buffer: String) {
        let repo_name = self.state.repo.as_ref().map(|r| r.name.clone()).unwrap_or_else(|| "repository".to_string());
        let generation = self.state.doc_generation;
        let tx = self.channels.export_tx.clone();
        thread::spawn(move || {
            let result = export::export_documentation(&repo_name, &buffer, &PROMPTS.section_titles);
            let _ = tx.send((generation, result));
        });
    }

    fn process_export_results(&mut self) {
        while let Ok((generation, result)) = self.channels.export_rx.try_recv() {
            streaming::handle_export_result(&mut self.state, generation, result);
        }
    }

    fn process_remote_updates(&mut self) {
        while let Ok(update) = self.channels.remote_rx.try_recv() {
            self.state.dirty = true;
            match update {
                RemoteUpdate::Session(Ok(user)) => {
                    let signed_in = user.is_some();
                    self.state.auth = AuthPhase::Ready(user);
                    if signed_in {
                        self.dispatch(RemoteRequest::AccessToken);
                        self.state.repos_loading = true;
                        self.dispatch(RemoteRequest::Repos);
                    }
                    self.dispatch(RemoteRequest::Postings);
                }
                RemoteUpdate::Session(Err(e)) => {
                    log_error(&e.to_string());
                    self.state.auth = AuthPhase::Ready(None);
                    self.dispatch(RemoteRequest::Postings);
                }
                RemoteUpdate::AccessToken(Ok(token)) => {
                    self.github = GithubClient::new(Some(token));
                }
                RemoteUpdate::AccessToken(Err(e)) => {
                    // Keep the unauthenticated client; public repos still work
                    log_error(&e.to_string());
                }
                RemoteUpdate::Repos(result) => {
                    self.state.repos_loading = false;
                    match result {
                        Ok(repos) => self.state.repos = repos,
                        Err(e) => {
                            log_error(&e.to_string());
                        }
                    }
                }
                RemoteUpdate::Postings(Ok(postings)) => self.state.postings = postings,
                RemoteUpdate::Postings(Err(e)) => {
                    log_error(&e.to_string());
                }
                RemoteUpdate::Listing { repo, path, result } => {
                    if !self.current_repo(&repo) {
                        continue;
                    }
                    match result {
                        Ok(entries) => self.state.tree.insert_listing(&path, &entries),
                        Err(e) => {
                            log_error(&e.to_string());
                            self.state.tree.record_failed(&path);
                        }
                    }
                    let rows = self.state.tree.visible().len();
                    self.state.tree_cursor = self.state.tree_cursor.min(rows.saturating_sub(1));
                }
                RemoteUpdate::FileContent { repo, path, result } => {
                    if !self.current_repo(&repo) {
                        continue;
                    }
                    // Only the selection we are waiting on may land; a late
                    // result for an abandoned selection is dropped.
                    if self.state.file_pending.as_deref() != Some(path.as_str()) {
                        continue;
                    }
                    self.state.file_pending = None;
                    match result {
                        Ok(content) => {
                            self.state.selected_file = Some(SelectedFile { path, content });
                            self.state.file_scroll = 0;
                        }
                        Err(e) => {
                            // Selection stays as it was
                            log_error(&e.to_string());
                        }
                    }
                }
                RemoteUpdate::Snapshot { repo, result } => {
                    if !self.current_repo(&repo) {
                        continue;
                    }
                    self.state.snapshot_pending = false;
                    match result {
                        Ok(snapshot) => self.state.snapshot = Some(snapshot),
                        Err(e) => {
                            // Context stays empty for the session
                            log_error(&e.to_string());
                        }
                    }
                }
            }
        }
    }

    fn current_repo(&self, repo: &RepoRef) -> bool {
        self.state.repo.as_ref() == Some(repo)
    }
}
