//! Application state and main loop logic.
//!
//! `App` owns the label catalog, the labels attached to the working resource,
//! and the inline picker component. It translates terminal events into picker
//! interactions, dispatches service calls through the task spawner, and folds
//! their results back into state.

use std::collections::BTreeMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{error, info, warn};

use crate::api::types::Label;
use crate::api::{ApiError, LabelsClient};
use crate::config::Settings;
use crate::error::AppError;
use crate::events::Event;
use crate::tasks::{ApiMessage, TaskSpawner};
use crate::ui::components::{picker_menu, LabelPicker, PickerAction};

/// Color assigned to labels created from the picker.
const DEFAULT_NEW_LABEL_COLOR: &str = "#326BBA";

/// Connection and catalog state, drives the status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Connecting,
    LoadingCatalog,
    Ready,
    Failed,
}

/// A transient status line message.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Info(String),
    Error(String),
}

/// Top-level application state.
pub struct App {
    settings: Settings,
    client: Option<LabelsClient>,
    spawner: TaskSpawner,
    phase: Phase,

    /// Every label known to the service, in service order.
    catalog: Vec<Label>,
    /// Labels attached to the working resource.
    selected: Vec<Label>,
    /// Label names given on the command line, attached once the catalog
    /// arrives.
    seed_names: Vec<String>,

    picker: LabelPicker,
    status: Option<Status>,
    should_quit: bool,
}

impl App {
    /// Create the application and kick off the service connection.
    pub fn new(settings: Settings, spawner: TaskSpawner, seed_names: Vec<String>) -> Self {
        spawner.spawn_connect(settings.service_url.clone(), settings.org_id.clone());

        Self {
            settings,
            client: None,
            spawner,
            phase: Phase::Connecting,
            catalog: Vec::new(),
            selected: Vec::new(),
            seed_names,
            picker: LabelPicker::new(),
            status: None,
            should_quit: false,
        }
    }

    /// Whether the main loop should exit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Handle one terminal event.
    pub fn on_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.on_key(key),
            // Losing terminal focus is the picker's outside-click equivalent.
            Event::FocusLost => {
                if self.picker.is_suggesting() {
                    self.picker.dismiss();
                }
            }
            Event::Resize(_, _) | Event::Tick => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            self.should_quit = true;
            return;
        }

        if self.picker.is_suggesting() {
            self.status = None;
            let action = self.picker.handle_input(key, &self.catalog, &self.selected);
            match action {
                Some(action) => self.on_picker_action(action),
                // Escape is inert inside the picker when nothing is
                // highlighted; at the application boundary it still means
                // "close this".
                None if key.code == KeyCode::Esc => self.picker.dismiss(),
                None => {}
            }
            return;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => self.should_quit = true,
            (KeyCode::Char('a') | KeyCode::Char('e'), KeyModifiers::NONE) => {
                if self.phase == Phase::Ready {
                    self.picker.open(&self.catalog, &self.selected);
                } else {
                    self.status = Some(Status::Info("Catalog not loaded yet".to_string()));
                }
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => self.refresh_catalog(),
            _ => {}
        }
    }

    fn on_picker_action(&mut self, action: PickerAction) {
        match action {
            PickerAction::Add(label) => {
                info!(label = %label.name, "Attaching label");
                if !self.selected.iter().any(|l| l.name == label.name) {
                    self.status = Some(Status::Info(format!("Added label '{}'", label.name)));
                    self.selected.push(label);
                }
            }
            PickerAction::Create(name) => match &self.client {
                Some(client) => {
                    let properties = BTreeMap::from([(
                        "color".to_string(),
                        DEFAULT_NEW_LABEL_COLOR.to_string(),
                    )]);
                    self.spawner.spawn_create_label(client, name, properties);
                }
                None => {
                    self.picker.create_failed();
                    self.status =
                        Some(Status::Error("Not connected to the label service".to_string()));
                }
            },
            PickerAction::Dismissed => {}
        }
    }

    /// Handle the result of a background service call.
    pub fn on_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::ClientConnected(Ok(client)) => {
                info!("Connected to label service");
                self.phase = Phase::LoadingCatalog;
                self.spawner.spawn_fetch_catalog(&client);
                self.client = Some(client);
            }
            ApiMessage::ClientConnected(Err(e)) => {
                error!(error = %e, "Connection failed");
                self.phase = Phase::Failed;
                self.report_error(e);
            }
            ApiMessage::CatalogFetched(Ok(labels)) => {
                info!(count = labels.len(), "Catalog loaded");
                self.catalog = labels;
                self.phase = Phase::Ready;
                self.attach_seed_labels();
            }
            ApiMessage::CatalogFetched(Err(e)) => {
                error!(error = %e, "Catalog fetch failed");
                self.phase = Phase::Failed;
                self.report_error(e);
            }
            ApiMessage::LabelCreated { name, result } => match result {
                Ok(label) => {
                    info!(label = %label.name, id = %label.id, "Label created");
                    self.status = Some(Status::Info(format!("Created label '{}'", label.name)));
                    self.catalog.push(label.clone());
                    self.selected.push(label);
                    self.picker.create_succeeded();
                }
                Err(e) => {
                    error!(label = %name, error = %e, "Label creation failed");
                    // Recoverable failures leave the picker open for a retry;
                    // anything else (bad token, lost permissions) closes it.
                    let err = AppError::from(e);
                    let recoverable = err.is_recoverable();
                    self.status = Some(Status::Error(err.user_message()));
                    self.picker.create_failed();
                    if !recoverable {
                        self.picker.dismiss();
                    }
                }
            },
        }
    }

    /// Attach the labels named on the command line, now that the catalog is
    /// known. Unknown names are skipped with a warning.
    fn attach_seed_labels(&mut self) {
        for name in std::mem::take(&mut self.seed_names) {
            match self.catalog.iter().find(|l| l.name == name) {
                Some(label) => {
                    if !self.selected.iter().any(|l| l.name == label.name) {
                        self.selected.push(label.clone());
                    }
                }
                None => {
                    warn!(%name, "Requested label not in catalog, skipping");
                    self.status = Some(Status::Error(format!("No label named '{}'", name)));
                }
            }
        }
    }

    /// Put a service error on the status line in its user-facing form.
    fn report_error(&mut self, error: ApiError) {
        let err = AppError::from(error);
        let mut message = err.user_message();
        if err.is_critical() {
            // No point suggesting a retry for a bad token.
            message.push_str(" Press q to quit.");
        }
        self.status = Some(Status::Error(message));
    }

    fn refresh_catalog(&mut self) {
        match &self.client {
            Some(client) => {
                self.phase = Phase::LoadingCatalog;
                self.spawner.spawn_fetch_catalog(client);
            }
            None => {
                // Retry the connection from scratch.
                self.phase = Phase::Connecting;
                self.spawner.spawn_connect(
                    self.settings.service_url.clone(),
                    self.settings.org_id.clone(),
                );
            }
        }
    }

    /// Render the whole screen.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(1), // Attached labels
                Constraint::Min(5),    // Picker
                Constraint::Length(1), // Status line
                Constraint::Length(1), // Key hints
            ])
            .split(frame.area());

        self.render_title(frame, chunks[0]);
        picker_menu::render_selected(frame, chunks[1], &self.selected);
        self.picker
            .render(frame, chunks[2], &self.catalog, &self.selected);
        self.render_status(frame, chunks[3]);
        self.render_hints(frame, chunks[4]);
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let phase = match self.phase {
            Phase::Connecting => "connecting...",
            Phase::LoadingCatalog => "loading labels...",
            Phase::Ready => "ready",
            Phase::Failed => "offline",
        };
        let line = Line::from(vec![
            Span::styled(
                "labelpick",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", phase), Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some(Status::Info(msg)) => {
                Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Green)))
            }
            Some(Status::Error(msg)) => {
                Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red)))
            }
            None => Line::default(),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.picker.is_suggesting() {
            "↑/↓ move  Enter add  Ctrl+n create  Esc close"
        } else {
            "a add label  r refresh  q quit"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::create_task_channel;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ready_app(catalog: Vec<Label>) -> App {
        let (_rx, spawner) = create_task_channel();
        let mut app = App::new(Settings::default(), spawner, Vec::new());
        app.on_api_message(ApiMessage::CatalogFetched(Ok(catalog)));
        app
    }

    fn abc_catalog() -> Vec<Label> {
        vec![
            Label::new("id-a", "A"),
            Label::new("id-b", "B"),
            Label::new("id-c", "C"),
        ]
    }

    #[tokio::test]
    async fn test_q_quits_when_collapsed() {
        let mut app = ready_app(abc_catalog());
        assert!(!app.should_quit());
        app.on_event(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_q_types_into_open_picker() {
        let mut app = ready_app(abc_catalog());
        app.on_event(key(KeyCode::Char('a')));
        app.on_event(key(KeyCode::Char('q')));
        assert!(!app.should_quit());
        assert_eq!(app.picker.filter_value(), "q");
    }

    #[tokio::test]
    async fn test_open_and_select_attaches_label() {
        let mut app = ready_app(abc_catalog());

        app.on_event(key(KeyCode::Char('a')));
        assert!(app.picker.is_suggesting());

        app.on_event(key(KeyCode::Down));
        app.on_event(key(KeyCode::Enter));

        assert!(!app.picker.is_suggesting());
        assert_eq!(app.selected.len(), 1);
        assert_eq!(app.selected[0].name, "B");
    }

    #[tokio::test]
    async fn test_open_refused_before_catalog_loads() {
        let (_rx, spawner) = create_task_channel();
        let mut app = App::new(Settings::default(), spawner, Vec::new());

        app.on_event(key(KeyCode::Char('a')));
        assert!(!app.picker.is_suggesting());
    }

    #[tokio::test]
    async fn test_escape_without_highlight_still_closes_at_boundary() {
        let catalog = abc_catalog();
        let mut app = ready_app(catalog.clone());
        app.on_api_message(ApiMessage::CatalogFetched(Ok(catalog.clone())));
        app.selected = catalog;

        app.on_event(key(KeyCode::Char('a')));
        assert!(app.picker.is_suggesting());
        assert_eq!(app.picker.highlighted(), None);

        app.on_event(key(KeyCode::Esc));
        assert!(!app.picker.is_suggesting());
    }

    #[tokio::test]
    async fn test_focus_lost_dismisses_picker() {
        let mut app = ready_app(abc_catalog());
        app.on_event(key(KeyCode::Char('a')));
        app.on_event(Event::FocusLost);
        assert!(!app.picker.is_suggesting());
    }

    #[tokio::test]
    async fn test_created_label_joins_catalog_and_selection() {
        let mut app = ready_app(abc_catalog());
        app.on_event(key(KeyCode::Char('a')));
        app.on_event(key(KeyCode::Char('X')));

        let mut created = Label::new("id-x", "X");
        created
            .properties
            .insert("color".to_string(), DEFAULT_NEW_LABEL_COLOR.to_string());
        app.on_api_message(ApiMessage::LabelCreated {
            name: "X".to_string(),
            result: Ok(created),
        });

        assert_eq!(app.catalog.len(), 4);
        assert_eq!(app.selected.len(), 1);
        assert_eq!(app.selected[0].name, "X");
        assert!(!app.picker.is_suggesting());
        assert!(!app.picker.is_creating());
    }

    #[tokio::test]
    async fn test_create_failure_surfaces_error_and_keeps_picker_open() {
        let mut app = ready_app(abc_catalog());
        app.on_event(key(KeyCode::Char('a')));
        app.on_event(key(KeyCode::Char('X')));

        app.on_api_message(ApiMessage::LabelCreated {
            name: "X".to_string(),
            result: Err(ApiError::Conflict("X".to_string())),
        });

        assert!(matches!(app.status, Some(Status::Error(_))));
        assert!(app.catalog.len() == 3);
        assert!(app.selected.is_empty());
        // A conflict is recoverable so the picker stays open for a retry.
        assert!(app.picker.is_suggesting());
        assert!(!app.picker.is_creating());
    }

    #[tokio::test]
    async fn test_unrecoverable_create_failure_closes_picker() {
        let mut app = ready_app(abc_catalog());
        app.on_event(key(KeyCode::Char('a')));
        app.on_event(key(KeyCode::Char('X')));

        app.on_api_message(ApiMessage::LabelCreated {
            name: "X".to_string(),
            result: Err(ApiError::Unauthorized),
        });

        assert!(matches!(app.status, Some(Status::Error(_))));
        assert!(!app.picker.is_suggesting());
    }

    #[tokio::test]
    async fn test_create_without_connection_fails_locally() {
        let mut app = ready_app(abc_catalog());
        assert!(app.client.is_none());

        app.on_event(key(KeyCode::Char('a')));
        app.on_event(key(KeyCode::Char('X')));
        app.on_event(Event::Key(KeyEvent::new(
            KeyCode::Char('n'),
            KeyModifiers::CONTROL,
        )));

        assert!(matches!(app.status, Some(Status::Error(_))));
        assert!(!app.picker.is_creating());
    }

    #[tokio::test]
    async fn test_seed_labels_attached_when_catalog_arrives() {
        let (_rx, spawner) = create_task_channel();
        let mut app = App::new(
            Settings::default(),
            spawner,
            vec!["B".to_string(), "missing".to_string()],
        );

        app.on_api_message(ApiMessage::CatalogFetched(Ok(abc_catalog())));

        assert_eq!(app.selected.len(), 1);
        assert_eq!(app.selected[0].name, "B");
        assert!(matches!(app.status, Some(Status::Error(_))));
    }

    #[tokio::test]
    async fn test_connection_failure_sets_failed_phase() {
        let (_rx, spawner) = create_task_channel();
        let mut app = App::new(Settings::default(), spawner, Vec::new());

        app.on_api_message(ApiMessage::ClientConnected(Err(
            ApiError::ConnectionFailed("connection refused".to_string()),
        )));

        assert_eq!(app.phase, Phase::Failed);
        assert!(matches!(app.status, Some(Status::Error(_))));
    }

    #[tokio::test]
    async fn test_duplicate_selection_is_ignored() {
        let mut app = ready_app(abc_catalog());
        app.selected.push(Label::new("id-a", "A"));

        // "A" is already selected so it never appears as a candidate; even a
        // direct action is a no-op.
        app.on_picker_action(PickerAction::Add(Label::new("id-a", "A")));
        assert_eq!(app.selected.len(), 1);
    }
}
