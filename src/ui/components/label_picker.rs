//! Inline label picker component.
//!
//! The picker rests as a one-line "Add Label" toggle. Activating it opens a
//! filter input plus a suggestion menu over the labels that are still
//! available for the resource. Arrow keys move a highlight cursor through the
//! candidates, Enter attaches the highlighted label, and Ctrl+n asks the
//! label service to create a label named after the current filter text.
//!
//! The filtering and cursor logic lives in the pure functions
//! [`available_labels`] and [`move_highlight`]; [`LabelPicker`] is the state
//! machine that drives them from key events. Menu row rendering is delegated
//! to [`super::picker_menu`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::debug;

use crate::api::types::Label;

use super::picker_menu;

/// Direction for moving the highlight cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    /// Toward the start of the candidate list.
    Up,
    /// Toward the end of the candidate list.
    Down,
}

impl ArrowDirection {
    fn delta(self) -> isize {
        match self {
            ArrowDirection::Up => -1,
            ArrowDirection::Down => 1,
        }
    }
}

/// Picker mode. An explicit enum rather than a boolean so a third state can
/// be added without silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    /// Resting state: only the toggle is shown.
    #[default]
    Collapsed,
    /// Input and suggestion menu are open.
    Suggesting,
}

/// Action resulting from picker input, handled by the owning view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    /// Attach an existing label to the resource.
    Add(Label),
    /// Ask the label service to create a label with this name. The picker
    /// stays open with an in-flight guard until [`LabelPicker::create_succeeded`]
    /// or [`LabelPicker::create_failed`] is called.
    Create(String),
    /// The picker collapsed back to its resting state.
    Dismissed,
}

/// Compute the labels available for selection.
///
/// Removes from `catalog` every label whose `name` appears in `selected`
/// (set difference keyed by name, preserving catalog order), then, when
/// `filter` is non-empty, keeps only labels whose name contains `filter` as a
/// case-sensitive substring.
///
/// An empty `filter` skips the narrowing step entirely; the empty string is
/// the "no filter applied" sentinel, not a pattern.
pub fn available_labels(catalog: &[Label], selected: &[Label], filter: &str) -> Vec<Label> {
    catalog
        .iter()
        .filter(|label| !selected.iter().any(|s| s.name == label.name))
        .filter(|label| filter.is_empty() || label.name.contains(filter))
        .cloned()
        .collect()
}

/// Check whether a cursor key refers to a label.
///
/// A cursor key can hold either of a label's two identities: opening the
/// menu and filter re-validation write a candidate's `name`, while
/// navigation writes the adjacent candidate's `id`. Matching accepts both so
/// the two writers compose; name takes precedence. See DESIGN.md for the
/// dual-key policy.
fn matches_cursor(label: &Label, key: &str) -> bool {
    label.name == key || label.id == key
}

/// Move the highlight cursor one step through `available`.
///
/// Returns `current` unchanged when `available` is empty or `current` is
/// `None` (degenerate cases, not errors). Otherwise the current position is
/// located by name (falling back to id for cursors written by a previous
/// move), stepped by one, and clamped into `[0, len-1]` — moving up from the
/// first candidate stays on the first candidate, there is no wrap-around.
///
/// The returned key is the adjacent label's `id`, even though the lookup key
/// was a `name`. The asymmetry is intentional; selection resolves ids.
pub fn move_highlight(
    current: Option<&str>,
    available: &[Label],
    direction: ArrowDirection,
) -> Option<String> {
    let key = match current {
        Some(key) if !available.is_empty() => key,
        _ => return current.map(String::from),
    };

    let index = available
        .iter()
        .position(|label| matches_cursor(label, key))
        .map(|i| i as isize)
        .unwrap_or(-1);

    let adjacent = (index + direction.delta()).clamp(0, available.len() as isize - 1) as usize;
    Some(available[adjacent].id.clone())
}

/// Inline label picker component.
///
/// The catalog and selected set are owned by the caller and passed into every
/// interaction, so prop changes between events are picked up naturally. The
/// candidate list is always recomputed, never stored.
#[derive(Debug, Default)]
pub struct LabelPicker {
    /// Collapsed vs. suggesting.
    mode: Mode,
    /// The user's current search input. Empty means "no filter applied".
    filter_value: String,
    /// Key of the highlighted candidate, or `None` when nothing is
    /// highlighted. Always refers to a present candidate or is `None`.
    highlighted: Option<String>,
    /// In-flight guard: a create request is outstanding and repeat
    /// submissions are refused until it resolves.
    creating: bool,
}

impl LabelPicker {
    /// Create a new, collapsed picker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the suggestion menu is open.
    pub fn is_suggesting(&self) -> bool {
        self.mode == Mode::Suggesting
    }

    /// Check whether a create request is outstanding.
    pub fn is_creating(&self) -> bool {
        self.creating
    }

    /// The current filter text.
    pub fn filter_value(&self) -> &str {
        &self.filter_value
    }

    /// The current highlight cursor key, if any.
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// The current candidate list for the given inputs.
    pub fn candidates(&self, catalog: &[Label], selected: &[Label]) -> Vec<Label> {
        available_labels(catalog, selected, &self.filter_value)
    }

    /// Start suggesting.
    ///
    /// Clears the filter, recomputes the candidates, and highlights the first
    /// one. With zero candidates (every catalog label already selected) the
    /// menu still opens, with nothing highlighted, so the "all labels used"
    /// indicator can show.
    pub fn open(&mut self, catalog: &[Label], selected: &[Label]) {
        let available = available_labels(catalog, selected, "");
        self.highlighted = available.first().map(|label| label.name.clone());
        self.filter_value.clear();
        self.mode = Mode::Suggesting;
        debug!(candidates = available.len(), "Label picker opened");
    }

    /// Collapse back to the resting state.
    ///
    /// Resets the filter and the highlight. The candidate list is derived,
    /// so it reverts to the full unfiltered set automatically.
    pub fn dismiss(&mut self) {
        self.mode = Mode::Collapsed;
        self.filter_value.clear();
        self.highlighted = None;
        self.creating = false;
    }

    /// A create request issued by this picker succeeded; the owner has
    /// already attached the created label. Collapse and reset.
    pub fn create_succeeded(&mut self) {
        self.creating = false;
        if self.is_suggesting() {
            self.dismiss();
        }
    }

    /// A create request failed. The failure itself is surfaced by the
    /// owner's error reporting; the picker just lifts the in-flight guard
    /// and stays open so the user can retry or bail out.
    pub fn create_failed(&mut self) {
        self.creating = false;
    }

    /// Handle keyboard input while the menu is open.
    ///
    /// Escape dismisses, Enter attaches the highlighted candidate, the arrow
    /// keys move the highlight, and Ctrl+n requests creation of a label named
    /// after the filter text. Those shortcuts require a highlight (except
    /// Ctrl+n); without one they are inert and only ordinary text editing
    /// works. Returns an action for the owning view, or `None`.
    pub fn handle_input(
        &mut self,
        key: KeyEvent,
        catalog: &[Label],
        selected: &[Label],
    ) -> Option<PickerAction> {
        if self.mode == Mode::Collapsed {
            return None;
        }

        // While a create request is in flight, refuse further submissions.
        // Typing and navigation stay live; the menu is not locked.
        if self.creating && matches!(key.code, KeyCode::Enter) {
            return None;
        }
        if self.creating && key.code == KeyCode::Char('n') && key.modifiers == KeyModifiers::CONTROL
        {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) if self.highlighted.is_some() => {
                self.dismiss();
                Some(PickerAction::Dismissed)
            }
            (KeyCode::Enter, KeyModifiers::NONE) if self.highlighted.is_some() => {
                self.select_highlighted(catalog)
            }
            (KeyCode::Up, _) if self.highlighted.is_some() => {
                self.navigate(ArrowDirection::Up, catalog, selected);
                None
            }
            (KeyCode::Down, _) if self.highlighted.is_some() => {
                self.navigate(ArrowDirection::Down, catalog, selected);
                None
            }
            (KeyCode::Char('n'), KeyModifiers::CONTROL) => self.request_create(catalog),
            (KeyCode::Backspace, _) => {
                if self.filter_value.pop().is_some() {
                    self.filter_changed(catalog, selected);
                }
                None
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.filter_value.push(c);
                self.filter_changed(catalog, selected);
                None
            }
            _ => None,
        }
    }

    /// Move the highlight cursor.
    fn navigate(&mut self, direction: ArrowDirection, catalog: &[Label], selected: &[Label]) {
        let available = self.candidates(catalog, selected);
        self.highlighted = move_highlight(self.highlighted.as_deref(), &available, direction);
    }

    /// Re-derive candidates after the filter text changed and re-validate the
    /// highlight against them.
    ///
    /// Clearing the text entirely is a full reset: the candidate list reverts
    /// to the whole unfiltered set and nothing is highlighted, while the menu
    /// stays open. Otherwise a highlight that fell out of the narrowed list
    /// moves to the first candidate, or to `None` when none are left.
    fn filter_changed(&mut self, catalog: &[Label], selected: &[Label]) {
        if self.filter_value.is_empty() {
            self.highlighted = None;
            return;
        }

        let available = self.candidates(catalog, selected);
        let still_present = self
            .highlighted
            .as_deref()
            .is_some_and(|key| available.iter().any(|label| matches_cursor(label, key)));

        if !still_present {
            self.highlighted = available.first().map(|label| label.name.clone());
        }
    }

    /// Resolve the highlight to a catalog label and emit it.
    ///
    /// Resolution is by `id` first (navigation writes ids), then by unique
    /// `name` (opening and re-validation write names). A cursor that resolves
    /// to nothing is a silent no-op with no state change; under the stated
    /// invariants it should not occur.
    fn select_highlighted(&mut self, catalog: &[Label]) -> Option<PickerAction> {
        let key = self.highlighted.as_deref()?;
        let label = catalog
            .iter()
            .find(|label| label.id == key)
            .or_else(|| catalog.iter().find(|label| label.name == key))?
            .clone();

        debug!(label = %label.name, "Label selected");
        self.dismiss();
        Some(PickerAction::Add(label))
    }

    /// Request creation of a label named after the filter text.
    ///
    /// No-op when the trimmed text is empty, when a label with that exact
    /// name already exists in the catalog (select it instead), or while a
    /// previous request is still in flight.
    fn request_create(&mut self, catalog: &[Label]) -> Option<PickerAction> {
        let name = self.filter_value.trim();
        if name.is_empty() || self.creating {
            return None;
        }
        if catalog.iter().any(|label| label.name == name) {
            return None;
        }

        debug!(%name, "Label creation requested");
        self.creating = true;
        Some(PickerAction::Create(name.to_string()))
    }

    /// Render the picker: the toggle when collapsed, the filter input plus
    /// suggestion menu when open.
    pub fn render(&self, frame: &mut Frame, area: Rect, catalog: &[Label], selected: &[Label]) {
        match self.mode {
            Mode::Collapsed => self.render_toggle(frame, area),
            Mode::Suggesting => self.render_suggesting(frame, area, catalog, selected),
        }
    }

    /// Render the resting-state toggle line.
    fn render_toggle(&self, frame: &mut Frame, area: Rect) {
        let toggle = Line::from(vec![
            Span::styled(
                "[+ Add Label]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  press 'a' to open", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(toggle), area);
    }

    /// Render the open input and menu.
    fn render_suggesting(
        &self,
        frame: &mut Frame,
        area: Rect,
        catalog: &[Label],
        selected: &[Label],
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Filter input
                Constraint::Min(3),    // Suggestion menu
            ])
            .split(area);

        let input_text = if self.filter_value.is_empty() {
            Span::styled(
                "Type to filter, press Enter to add a label",
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::styled(self.filter_value.as_str(), Style::default().fg(Color::White))
        };
        let input_line = Line::from(vec![
            Span::styled("Label: ", Style::default().fg(Color::Cyan)),
            input_text,
        ]);
        frame.render_widget(Paragraph::new(input_line), chunks[0]);

        let available = self.candidates(catalog, selected);
        let all_used = selected.len() == catalog.len() && !catalog.is_empty();
        picker_menu::render_menu(
            frame,
            chunks[1],
            &available,
            self.highlighted.as_deref(),
            &self.filter_value,
            all_used,
            self.creating,
        );
    }
}
