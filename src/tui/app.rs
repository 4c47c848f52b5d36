use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;
use tracing::{info, warn};

use crate::io::config_io::{read_json_file, read_settings, state_dir, write_json_file};
use crate::io::logging::init_file_logging;
use crate::io::runner::{RunEvent, RunHandle, RunRequest, Stream, start_run};
use crate::io::schema::{ConfigSource, LoadedSchemas, load_schemas, locate_pioneer_binary};
use crate::model::config::{Settings, Workflow};
use crate::model::path::JsonPath;
use crate::model::workspace::{ConfigState, Message, Workspace};

use super::editor::{EditorRow, InputSession, build_rows};
use super::input;
use super::render;
use super::theme::Theme;

/// Lines of Pioneer output kept for the log panel
pub const RUN_LOG_LIMIT: usize = 500;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into a number, text or list field
    Edit,
    Search,
    /// Typing a file path
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Load,
    SaveAs,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::Load => "load",
            PromptKind::SaveAs => "save as",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptState {
    pub kind: PromptKind,
    pub buffer: String,
}

/// Per-workflow UI state
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Index into the visible rows
    pub cursor: usize,
    /// First visible row
    pub scroll_offset: usize,
    /// Dotted paths of collapsed groups
    pub collapsed: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Progress of the most recent run, kept after it finishes
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatus {
    pub workflow: Workflow,
    pub stage_label: Option<&'static str>,
    pub progress: f32,
    /// `Some(success)` once the run has ended
    pub finished: Option<bool>,
    pub log_path: PathBuf,
}

/// Main application state
pub struct App {
    pub workspace: Workspace,
    /// Workflows in tab order
    pub tabs: Vec<Workflow>,
    pub active_tab: usize,
    pub view_states: HashMap<Workflow, ViewState>,
    pub mode: Mode,
    /// Field being typed into (Edit mode)
    pub input: Option<InputSession>,
    pub prompt: Option<PromptState>,
    /// Search mode: current query being typed
    pub search_input: String,
    /// Last executed search pattern
    pub last_search: Option<String>,
    pub status: Option<StatusMessage>,
    pub run: Option<RunHandle>,
    pub run_status: Option<RunStatus>,
    pub run_log: Vec<String>,
    pub show_log: bool,
    pub show_help: bool,
    /// A run is active and `q` was pressed once
    pub quit_pending: bool,
    pub should_quit: bool,
    pub theme: Theme,
    pub settings: Settings,
    pub source: ConfigSource,
    /// Directory for run log files
    pub log_dir: PathBuf,
}

impl App {
    pub fn new(workspace: Workspace, settings: Settings) -> Self {
        let tabs: Vec<Workflow> = workspace.workflows().collect();
        let view_states = tabs.iter().map(|w| (*w, ViewState::default())).collect();
        App {
            workspace,
            tabs,
            active_tab: 0,
            view_states,
            mode: Mode::Navigate,
            input: None,
            prompt: None,
            search_input: String::new(),
            last_search: None,
            status: None,
            run: None,
            run_status: None,
            run_log: Vec::new(),
            show_log: false,
            show_help: false,
            quit_pending: false,
            should_quit: false,
            theme: Theme::from_settings(&settings.ui),
            settings,
            source: ConfigSource::Fallback,
            log_dir: state_dir().join("runs"),
        }
    }

    /// Build the workspace from discovered schemas. Falling back to bundled
    /// defaults is reported in the status row.
    pub fn from_schemas(schemas: &LoadedSchemas, settings: Settings) -> Self {
        let mut workspace = Workspace::new();
        for workflow in Workflow::ALL {
            let schema = schemas.for_workflow(workflow).clone();
            workspace.insert(workflow, ConfigState::from_schema(schema));
        }
        let mut app = App::new(workspace, settings);
        app.source = schemas.source;
        if let Some(err) = &schemas.binary_error {
            let first = err.lines().next().unwrap_or_default();
            app.set_error(format!("using bundled defaults ({})", first));
        }
        app
    }

    pub fn current_workflow(&self) -> Workflow {
        self.tabs
            .get(self.active_tab)
            .copied()
            .unwrap_or(Workflow::BuildSpecLib)
    }

    pub fn current_state(&self) -> Option<&ConfigState> {
        self.workspace.get(self.current_workflow())
    }

    pub fn view_state(&mut self) -> &mut ViewState {
        self.view_states.entry(self.current_workflow()).or_default()
    }

    /// Visible rows of the active tab
    pub fn rows(&self) -> Vec<EditorRow> {
        let Some(state) = self.current_state() else {
            return Vec::new();
        };
        let empty = HashSet::new();
        let collapsed = self
            .view_states
            .get(&self.current_workflow())
            .map_or(&empty, |v| &v.collapsed);
        build_rows(&state.current, &state.important, collapsed)
    }

    pub fn cursor(&self) -> usize {
        self.view_states
            .get(&self.current_workflow())
            .map_or(0, |v| v.cursor)
    }

    pub fn selected_row(&self) -> Option<EditorRow> {
        let cursor = self.cursor();
        self.rows().into_iter().nth(cursor)
    }

    /// Keep the cursor on a real row after the tree changed shape
    pub fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        let state = self.view_state();
        state.cursor = state.cursor.min(len.saturating_sub(1));
    }

    /// Move the cursor to the row with the given path, if visible
    pub fn select_path(&mut self, path: &JsonPath) {
        if let Some(idx) = self.rows().iter().position(|r| &r.path == path) {
            self.view_state().cursor = idx;
        }
    }

    /// Route a message through the workspace controller
    pub fn dispatch(&mut self, message: Message) {
        if !self.workspace.update(message) {
            warn!("message for a workflow with no state");
        }
        self.clamp_cursor();
    }

    pub fn switch_tab(&mut self, forward: bool) {
        if self.tabs.is_empty() {
            return;
        }
        let n = self.tabs.len();
        self.active_tab = if forward {
            (self.active_tab + 1) % n
        } else {
            (self.active_tab + n - 1) % n
        };
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    /// Get the active search regex for highlighting.
    /// In Search mode: compiles from current input. In Navigate: compiles from last_search.
    pub fn active_search_re(&self) -> Option<Regex> {
        let pattern = match self.mode {
            Mode::Search if !self.search_input.is_empty() => &self.search_input,
            Mode::Navigate => self.last_search.as_deref()?,
            _ => return None,
        };
        Regex::new(&format!("(?i){}", pattern))
            .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(pattern))))
            .ok()
    }

    /// Jump to the next (or previous) row whose dotted path matches the last
    /// search. Collapsed groups hiding the match are expanded.
    pub fn jump_to_match(&mut self, forward: bool) {
        let Some(re) = self.active_search_re() else {
            return;
        };
        let Some(state) = self.current_state() else {
            return;
        };
        let all_rows = build_rows(&state.current, &state.important, &HashSet::new());
        let matches: Vec<&EditorRow> = all_rows
            .iter()
            .filter(|r| re.is_match(&r.path.dotted()))
            .collect();
        if matches.is_empty() {
            let pattern = self.last_search.clone().unwrap_or_default();
            self.set_error(format!("no match for /{}", pattern));
            return;
        }

        let current = self.selected_row().map(|r| r.path);
        let current_idx = current
            .as_ref()
            .and_then(|p| all_rows.iter().position(|r| &r.path == p));
        let target = match (forward, current_idx) {
            (true, Some(ci)) => matches
                .iter()
                .find(|m| all_rows.iter().position(|r| r.path == m.path) > Some(ci))
                .or(matches.first()),
            (false, Some(ci)) => matches
                .iter()
                .rev()
                .find(|m| all_rows.iter().position(|r| r.path == m.path) < Some(ci))
                .or(matches.last()),
            (true, None) => matches.first(),
            (false, None) => matches.last(),
        };
        let Some(target) = target.map(|r| r.path.clone()) else {
            return;
        };

        let view = self.view_state();
        for prefix in target.proper_prefixes() {
            view.collapsed.remove(&prefix.dotted());
        }
        self.select_path(&target);
        self.status = None;
    }

    /// Collapse or expand the group at the cursor
    pub fn toggle_collapse(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.is_group() {
            return;
        }
        let key = row.path.dotted();
        let view = self.view_state();
        if !view.collapsed.remove(&key) {
            view.collapsed.insert(key);
        }
    }

    /// Write `current` as pretty JSON
    pub fn save_to(&mut self, path: PathBuf) {
        let workflow = self.current_workflow();
        let Some(state) = self.workspace.get(workflow) else {
            return;
        };
        match write_json_file(&path, &state.current) {
            Ok(()) => {
                info!(%workflow, path = %path.display(), "saved parameters");
                self.set_status(format!("saved {}", path.display()));
                self.dispatch(Message::Saved { workflow, path });
            }
            Err(e) => {
                warn!(%workflow, error = %e, "save failed");
                self.set_error(e.to_string());
            }
        }
    }

    /// Merge a parameter file onto the defaults of the active workflow
    pub fn load_from(&mut self, path: PathBuf) {
        let workflow = self.current_workflow();
        match read_json_file(&path) {
            Ok(value) => {
                info!(%workflow, path = %path.display(), "loaded parameters");
                self.set_status(format!("loaded {}", path.display()));
                self.dispatch(Message::LoadOverlay {
                    workflow,
                    value,
                    source: Some(path),
                });
            }
            Err(e) => {
                warn!(%workflow, error = %e, "load failed");
                self.set_error(e.to_string());
            }
        }
    }

    pub fn run_in_progress(&self) -> bool {
        self.run.is_some()
    }

    /// Launch Pioneer for the active workflow with the current parameters
    pub fn launch_run(&mut self) {
        if self.run_in_progress() {
            self.set_error("a run is already in progress");
            return;
        }
        let workflow = self.current_workflow();
        let pioneer = match locate_pioneer_binary(&self.settings) {
            Ok(path) => path,
            Err(e) => {
                self.set_error(e.to_string());
                return;
            }
        };
        let Some(state) = self.workspace.get(workflow) else {
            return;
        };
        let request = RunRequest {
            pioneer: &pioneer,
            workflow,
            config: &state.current,
            persist_to: state.persisted_path.as_deref(),
            log_dir: &self.log_dir,
        };
        match start_run(request) {
            Ok(handle) => {
                self.run_log.clear();
                self.run_status = Some(RunStatus {
                    workflow,
                    stage_label: None,
                    progress: 0.0,
                    finished: None,
                    log_path: handle.log_path.clone(),
                });
                self.run = Some(handle);
                self.show_log = true;
            }
            Err(e) => {
                warn!(%workflow, error = %e, "run failed to start");
                self.set_error(e.to_string());
            }
        }
    }

    /// Apply every event the run has produced since the last tick
    pub fn drain_run_events(&mut self) {
        let events = match &self.run {
            Some(handle) => handle.poll(),
            None => return,
        };
        for event in events {
            self.apply_run_event(event);
        }
    }

    pub fn apply_run_event(&mut self, event: RunEvent) {
        match event {
            RunEvent::Started {
                workflow, log_path, ..
            } => {
                self.push_log(format!("started {} (log: {})", workflow.label(), log_path.display()));
                self.set_status(format!("{} running", workflow.label()));
            }
            RunEvent::Log { stream, line, .. } => match stream {
                Stream::Stdout => self.push_log(line),
                Stream::Stderr => self.push_log(format!("{}: {}", stream.as_str(), line)),
            },
            RunEvent::Progress {
                stage_label,
                progress,
                ..
            } => {
                if let Some(status) = &mut self.run_status {
                    status.stage_label = Some(stage_label);
                    status.progress = progress;
                }
            }
            RunEvent::Complete {
                workflow,
                success,
                message,
                ..
            } => {
                if let Some(status) = &mut self.run_status {
                    status.finished = Some(success);
                }
                self.run = None;
                self.quit_pending = false;
                if success {
                    self.set_status(format!("{} finished", workflow.label()));
                } else {
                    let text = message.unwrap_or_else(|| "Pioneer failed".to_string());
                    self.push_log(text.clone());
                    self.set_error(text);
                }
            }
        }
    }

    fn push_log(&mut self, line: String) {
        self.run_log.push(line);
        if self.run_log.len() > RUN_LOG_LIMIT {
            let excess = self.run_log.len() - RUN_LOG_LIMIT;
            self.run_log.drain(..excess);
        }
    }
}

/// Run the TUI application
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = read_settings();
    init_file_logging(&settings.log, &state_dir().join("pconf.log"));

    let schemas = load_schemas(&settings)?;
    let mut app = App::from_schemas(&schemas, settings);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.drain_run_events();
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
