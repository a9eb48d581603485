//! Rendering. Pure function of `State`; no network, no mutation beyond the
//! scroll clamps the layout forces.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::actions::nav::repo_choices;
use crate::highlight::highlight_file;
use crate::state::{AuthPhase, Focus, Role, Screen, State, estimate_tokens};

mod theme {
    use ratatui::style::Color;

    pub const ACCENT: Color = Color::Rgb(96, 165, 250); // cool blue
    pub const SUCCESS: Color = Color::Rgb(134, 188, 111);
    pub const WARNING: Color = Color::Rgb(229, 192, 123);

    pub const TEXT: Color = Color::Rgb(235, 235, 235);
    pub const TEXT_MUTED: Color = Color::Rgb(140, 140, 150);

    pub const BG_BASE: Color = Color::Rgb(24, 26, 30);
    pub const BG_SURFACE: Color = Color::Rgb(34, 37, 43);

    pub const BORDER: Color = Color::Rgb(58, 62, 70);
    pub const BORDER_FOCUS: Color = Color::Rgb(96, 165, 250);

    pub const USER: Color = Color::Rgb(96, 165, 250);
    pub const ASSISTANT: Color = Color::Rgb(200, 200, 205);
}

mod chars {
    pub const DIR_CLOSED: &str = "▸";
    pub const DIR_OPEN: &str = "▾";
    pub const FILE: &str = "·";
    pub const CRUMB_SEP: &str = " › ";
}

pub fn render(frame: &mut Frame, state: &mut State) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme::BG_BASE)), area);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    match state.screen {
        Screen::Repos => render_repos(frame, state, main_layout[0]),
        Screen::Explorer => render_explorer(frame, state, main_layout[0]),
    }
    render_status_bar(frame, state, main_layout[1]);
}

// ============================================================================
// Repos screen
// ============================================================================

fn render_repos(frame: &mut Frame, state: &State, area: Rect) {
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("  RoleHub AI", Style::default().fg(theme::ACCENT).bold())),
        Line::from(""),
        Line::from(Span::styled(format!("  {}", auth_label(&state.auth)), Style::default().fg(theme::TEXT_MUTED))),
        Line::from(""),
    ];

    let choices = repo_choices(state);
    if state.repos_loading && choices.is_empty() {
        lines.push(Line::from(Span::styled("  Loading repositories...", Style::default().fg(theme::TEXT_MUTED))));
    } else if choices.is_empty() {
        lines.push(Line::from(Span::styled("  No repositories found.", Style::default().fg(theme::TEXT_MUTED))));
    }
    for (i, (label, _)) in choices.iter().enumerate() {
        let style = if i == state.repo_cursor {
            Style::default().fg(theme::TEXT).bg(theme::BG_SURFACE).bold()
        } else {
            Style::default().fg(theme::TEXT)
        };
        lines.push(Line::from(Span::styled(format!("  {}", label), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  ↑/↓ select · Enter open · Ctrl+Q quit",
        Style::default().fg(theme::TEXT_MUTED),
    )));

    frame.render_widget(Paragraph::new(lines), area);
}

fn auth_label(auth: &AuthPhase) -> String {
    match auth {
        AuthPhase::Uninitialized | AuthPhase::Loading => "Signing in...".to_string(),
        AuthPhase::Ready(Some(user)) => format!("Signed in as {}", user.username),
        AuthPhase::Ready(None) => "Signed out (public repos only)".to_string(),
    }
}

// ============================================================================
// Explorer screen
// ============================================================================

fn render_explorer(frame: &mut Frame, state: &mut State, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(20), Constraint::Length(46)])
        .split(area);

    render_tree(frame, state, columns[0]);
    render_file_view(frame, state, columns[1]);
    render_chat(frame, state, columns[2]);
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { theme::BORDER_FOCUS } else { theme::BORDER };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(theme::TEXT)))
}

fn render_tree(frame: &mut Frame, state: &State, area: Rect) {
    let block = pane_block("Files", state.focus == Focus::Tree);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    if !state.tree.root_loaded() {
        lines.push(Line::from(Span::styled("Loading...", Style::default().fg(theme::TEXT_MUTED))));
    }

    let rows = state.tree.visible();
    let viewport = inner.height as usize;
    // Keep the cursor on screen
    let first = state.tree_cursor.saturating_sub(viewport.saturating_sub(1));
    for (row_index, &(id, depth)) in rows.iter().enumerate().skip(first).take(viewport) {
        let node = state.tree.node(id);
        let icon = match node.kind {
            crate::github::EntryKind::Dir if node.open => chars::DIR_OPEN,
            crate::github::EntryKind::Dir => chars::DIR_CLOSED,
            _ => chars::FILE,
        };
        let fetching = state.tree.is_fetching(&node.path);
        let suffix = if fetching { " …" } else { "" };

        let selected = row_index == state.tree_cursor && state.focus == Focus::Tree;
        let style = if selected {
            Style::default().fg(theme::TEXT).bg(theme::BG_SURFACE).bold()
        } else if node.kind == crate::github::EntryKind::Dir {
            Style::default().fg(theme::ACCENT)
        } else {
            Style::default().fg(theme::TEXT)
        };

        lines.push(Line::from(Span::styled(
            format!("{}{} {}{}", "  ".repeat(depth), icon, node.name, suffix),
            style,
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Path segments joined for the file-view title.
fn breadcrumb(path: &str) -> String {
    path.split('/').collect::<Vec<_>>().join(chars::CRUMB_SEP)
}

fn render_file_view(frame: &mut Frame, state: &mut State, area: Rect) {
    let title = match &state.selected_file {
        Some(file) => breadcrumb(&file.path),
        None => "Viewer".to_string(),
    };
    let block = pane_block(&title, state.focus == Focus::File);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let highlighted = match &state.selected_file {
        Some(file) => highlight_file(&file.path, &file.content),
        None => {
            let placeholder =
                if state.file_pending.is_some() { "Loading..." } else { "Select a file to view its content" };
            frame.render_widget(
                Paragraph::new(Span::styled(placeholder, Style::default().fg(theme::TEXT_MUTED))),
                inner,
            );
            return;
        }
    };
    let max_scroll = highlighted.len().saturating_sub(inner.height as usize).min(u16::MAX as usize) as u16;
    state.file_scroll = state.file_scroll.min(max_scroll);

    let lines: Vec<Line> = highlighted
        .into_iter()
        .skip(state.file_scroll as usize)
        .take(inner.height as usize)
        .map(|spans| Line::from(spans.into_iter().map(|(color, text)| Span::styled(text, Style::default().fg(color))).collect::<Vec<_>>()))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

// ============================================================================
// Chat pane
// ============================================================================

/// Greedy display-width wrap. Breaks on whitespace where possible, hard-cuts
/// otherwise; always yields at least one line per input line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for raw_line in text.split('\n') {
        if raw_line.width() <= width {
            out.push(raw_line.to_string());
            continue;
        }
        let start = out.len();
        let mut current = String::new();
        for word in raw_line.split(' ') {
            let mut word = word;
            // Hard-split words wider than the line
            while word.width() > width {
                let cut = word
                    .char_indices()
                    .scan(0usize, |acc, (i, c)| {
                        *acc += c.to_string().width();
                        if *acc > width { None } else { Some(i + c.len_utf8()) }
                    })
                    .last()
                    .unwrap_or(word.len());
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                out.push(word[..cut].to_string());
                word = &word[cut..];
            }
            let needed = if current.is_empty() { word.width() } else { current.width() + 1 + word.width() };
            if needed > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() || out.len() == start {
            out.push(current);
        }
    }
    out
}

/// Scroll offset from the top given total content height, viewport height,
/// and the user's distance-from-bottom. Distance 0 pins to the newest line.
pub fn scroll_offset(total: usize, viewport: usize, back: u16) -> (u16, u16) {
    let max_scroll = total.saturating_sub(viewport).min(u16::MAX as usize) as u16;
    let back = back.min(max_scroll);
    (max_scroll - back, back)
}

fn render_chat(frame: &mut Frame, state: &mut State, area: Rect) {
    let block = pane_block("Ask to AI", state.focus == Focus::Chat);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chat_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    let history_area = chat_layout[0];
    let input_area = chat_layout[1];

    let width = history_area.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    for msg in &state.messages {
        let (prefix, color) = match msg.role {
            Role::User => ("You: ", theme::USER),
            Role::Assistant => ("AI: ", theme::ASSISTANT),
        };
        for (i, wrapped) in wrap_text(&msg.content, width.saturating_sub(prefix.len())).into_iter().enumerate() {
            let lead = if i == 0 { prefix } else { "     " };
            lines.push(Line::from(vec![
                Span::styled(lead, Style::default().fg(color).bold()),
                Span::styled(wrapped, Style::default().fg(theme::TEXT)),
            ]));
        }
        lines.push(Line::from(""));
    }
    if state.pending {
        if state.draft.is_empty() {
            lines.push(Line::from(Span::styled("thinking...", Style::default().fg(theme::TEXT_MUTED))));
        } else {
            for wrapped in wrap_text(&state.draft, width.saturating_sub(5)) {
                lines.push(Line::from(vec![
                    Span::styled("AI: ", Style::default().fg(theme::ASSISTANT).bold()),
                    Span::styled(wrapped, Style::default().fg(theme::TEXT)),
                ]));
            }
        }
    }

    let (offset, clamped_back) = scroll_offset(lines.len(), history_area.height as usize, state.chat_scroll_back);
    state.chat_scroll_back = clamped_back;
    frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), history_area);

    // Input line
    let prompt = "> ";
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(prompt, Style::default().fg(theme::ACCENT).bold()),
            Span::styled(state.input.clone(), Style::default().fg(theme::TEXT)),
        ])),
        input_area,
    );
    if state.focus == Focus::Chat {
        let cursor_x = input_area.x + prompt.width() as u16 + state.input[..state.input_cursor].width() as u16;
        frame.set_cursor_position((cursor_x.min(input_area.right().saturating_sub(1)), input_area.y));
    }
}

// ============================================================================
// Status bar
// ============================================================================

fn render_status_bar(frame: &mut Frame, state: &State, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();

    if let Some(repo) = &state.repo {
        spans.push(Span::styled(format!(" {} ", repo), Style::default().fg(theme::ACCENT).bold()));
    }

    if state.snapshot_pending {
        spans.push(Span::styled("ctx: loading… ", Style::default().fg(theme::WARNING)));
    } else if let Some(snapshot) = &state.snapshot {
        spans.push(Span::styled(
            format!("ctx: ~{} tok ", estimate_tokens(snapshot)),
            Style::default().fg(theme::SUCCESS),
        ));
    }

    if state.pending {
        spans.push(Span::styled("streaming… ", Style::default().fg(theme::WARNING)));
    } else if state.last_output_tokens > 0 {
        spans.push(Span::styled(
            format!("out: {} tok ", state.last_output_tokens),
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }
    if state.doc_pending {
        spans.push(Span::styled(
            format!("doc: {} chars ", state.doc_buffer.len()),
            Style::default().fg(theme::WARNING),
        ));
    }

    if let Some(notice) = &state.notice {
        spans.push(Span::styled(notice.clone(), Style::default().fg(theme::TEXT_MUTED)));
    } else if state.screen == Screen::Explorer {
        spans.push(Span::styled(
            "Tab focus · Enter open/send · Ctrl+G doc · Esc back",
            Style::default().fg(theme::TEXT_MUTED),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_SURFACE)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breadcrumb_joins_segments() {
        assert_eq!(breadcrumb("src/ui/mod.rs"), "src › ui › mod.rs");
        assert_eq!(breadcrumb("README.md"), "README.md");
    }

    #[test]
    fn wrap_respects_width_and_preserves_short_lines() {
        assert_eq!(wrap_text("short", 10), vec!["short"]);
        let wrapped = wrap_text("alpha beta gamma", 7);
        assert!(wrapped.iter().all(|l| l.width() <= 7));
        assert_eq!(wrapped.join(" "), "alpha beta gamma");
    }

    #[test]
    fn wrap_hard_splits_long_words() {
        let wrapped = wrap_text("abcdefghij", 4);
        assert_eq!(wrapped, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_keeps_empty_lines() {
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn scroll_pins_to_bottom_at_distance_zero() {
        // 30 lines in a 10-line viewport: bottom-pinned offset is 20
        assert_eq!(scroll_offset(30, 10, 0), (20, 0));
        assert_eq!(scroll_offset(30, 10, 5), (15, 5));
        // distance clamps to the top
        assert_eq!(scroll_offset(30, 10, 99), (0, 20));
        // content shorter than the viewport never scrolls
        assert_eq!(scroll_offset(3, 10, 4), (0, 0));
    }

    #[test]
    fn follow_survives_content_growth_only_when_at_bottom() {
        // at bottom: growth keeps the offset pinned to the new bottom
        let (before, _) = scroll_offset(30, 10, 0);
        let (after, _) = scroll_offset(35, 10, 0);
        assert!(after > before);
        // scrolled up: the anchor distance is preserved instead
        let (_, back) = scroll_offset(35, 10, 5);
        assert_eq!(back, 5);
    }
}
