//! Suggestion menu rendering for the label picker.
//!
//! Purely presentational: the caller computes the candidate list and the
//! highlight, this module only draws them. Rows show the label name tinted
//! with its color property, plus contextual footer hints for creating a
//! label and for the exhausted-catalog case.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::api::types::Label;

/// Fallback tint for labels without a color property.
const DEFAULT_LABEL_COLOR: Color = Color::Gray;

/// Render the suggestion menu.
///
/// `highlighted` is a cursor key matched against each candidate's name or id.
/// `all_used` flags that every catalog label is already attached, which shows
/// an indicator instead of an empty list. While `creating` is set the create
/// hint switches to a progress note.
#[allow(clippy::too_many_arguments)]
pub fn render_menu(
    frame: &mut Frame,
    area: Rect,
    available: &[Label],
    highlighted: Option<&str>,
    filter: &str,
    all_used: bool,
    creating: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Labels ");

    if available.is_empty() {
        let message = empty_message(filter, all_used, creating);
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let items: Vec<ListItem> = available
        .iter()
        .map(|label| ListItem::new(label_row(label, filter)))
        .collect();

    let selected = highlighted
        .and_then(|key| available.iter().position(|l| l.name == key || l.id == key));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

/// Body shown when there are no candidates to list.
fn empty_message(filter: &str, all_used: bool, creating: bool) -> Vec<Line<'static>> {
    if all_used && filter.is_empty() {
        return vec![Line::from(Span::styled(
            "All labels have been added",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    if filter.is_empty() {
        return vec![Line::from(Span::styled(
            "No labels yet",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    vec![
        Line::from(Span::styled(
            format!("No labels match \"{}\"", filter),
            Style::default().fg(Color::DarkGray),
        )),
        create_hint(filter, creating),
    ]
}

/// Footer hint offering Ctrl+n creation of the typed name.
fn create_hint(filter: &str, creating: bool) -> Line<'static> {
    if creating {
        return Line::from(Span::styled(
            format!("Creating label \"{}\"...", filter),
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(vec![
        Span::styled("Ctrl+n", Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(" to create label \"{}\"", filter),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

/// A single candidate row: colored swatch plus name.
fn label_row(label: &Label, filter: &str) -> Line<'static> {
    let tint = label
        .color()
        .and_then(parse_hex_color)
        .unwrap_or(DEFAULT_LABEL_COLOR);

    let mut spans = vec![Span::styled("● ", Style::default().fg(tint))];

    // Underline the matched substring so the narrowing is visible.
    match (!filter.is_empty())
        .then(|| label.name.find(filter))
        .flatten()
    {
        Some(start) => {
            let end = start + filter.len();
            spans.push(Span::raw(label.name[..start].to_string()));
            spans.push(Span::styled(
                label.name[start..end].to_string(),
                Style::default().add_modifier(Modifier::UNDERLINED),
            ));
            spans.push(Span::raw(label.name[end..].to_string()));
        }
        None => spans.push(Span::raw(label.name.clone())),
    }

    Line::from(spans)
}

/// Render an inline list of attached labels as colored chips.
pub fn render_selected(frame: &mut Frame, area: Rect, selected: &[Label]) {
    let mut spans = vec![Span::styled("Labels: ", Style::default().fg(Color::Cyan))];

    if selected.is_empty() {
        spans.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
    } else {
        for (i, label) in selected.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let tint = label
                .color()
                .and_then(parse_hex_color)
                .unwrap_or(DEFAULT_LABEL_COLOR);
            spans.push(Span::styled(
                format!("[{}]", label.name),
                Style::default().fg(tint),
            ));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Parse a `#RRGGBB` color property into a terminal color.
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().to_string()
    }

    fn label(id: &str, name: &str) -> Label {
        Label::new(id, name)
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#326BBA"), Some(Color::Rgb(0x32, 0x6B, 0xBA)));
        assert_eq!(parse_hex_color("326BBA"), None);
        assert_eq!(parse_hex_color("#32B"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn test_render_lists_candidate_names() {
        let backend = TestBackend::new(40, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let available = vec![label("1", "bug"), label("2", "docs")];

        terminal
            .draw(|frame| {
                render_menu(frame, frame.area(), &available, Some("bug"), "", false, false);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("bug"));
        assert!(text.contains("docs"));
    }

    #[test]
    fn test_render_all_used_indicator() {
        let backend = TestBackend::new(40, 8);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render_menu(frame, frame.area(), &[], None, "", true, false);
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("All labels have been added"));
    }

    #[test]
    fn test_render_create_hint_for_unmatched_filter() {
        let backend = TestBackend::new(44, 8);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render_menu(frame, frame.area(), &[], None, "urgent", false, false);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("No labels match"));
        assert!(text.contains("Ctrl+n"));
    }

    #[test]
    fn test_render_creating_progress_note() {
        let backend = TestBackend::new(44, 8);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render_menu(frame, frame.area(), &[], None, "urgent", false, true);
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("Creating label"));
    }

    #[test]
    fn test_render_selected_chips() {
        let backend = TestBackend::new(40, 2);
        let mut terminal = Terminal::new(backend).unwrap();
        let selected = vec![label("1", "bug"), label("2", "docs")];

        terminal
            .draw(|frame| {
                render_selected(frame, frame.area(), &selected);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("[bug]"));
        assert!(text.contains("[docs]"));
    }

    #[test]
    fn test_render_selected_empty() {
        let backend = TestBackend::new(40, 2);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render_selected(frame, frame.area(), &[]);
            })
            .unwrap();

        assert!(buffer_text(&terminal).contains("none"));
    }
}
