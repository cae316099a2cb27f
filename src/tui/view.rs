// File: src/tui/view.rs
use crate::dom::Element;
use crate::presenter::{FilterType, SortType};
use crate::tui::state::AppState;
use crate::view::TripInfo;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

pub fn draw(f: &mut Frame, state: &mut AppState) {
    let full_help_text = vec![
        Line::from(vec![
            Span::styled(
                " GLOBAL ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" ?:Toggle Help  r:Reload  q:Quit"),
        ]),
        Line::from(vec![
            Span::styled(
                " LIST ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Up/Down:Move  n:New  s:Sort  v:Filter"),
        ]),
        Line::from(vec![
            Span::styled(
                " EVENT ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Enter/e:Edit  f:Favorite"),
        ]),
        Line::from(vec![
            Span::styled(
                " FORM ",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(
                " Tab:Next field  Left/Right:Type/Offer  Space:Toggle offer  Enter:Save  Del:Delete  Up:Close  Esc:Cancel",
            ),
        ]),
    ];

    let footer_height = if state.show_full_help {
        Constraint::Length(full_help_text.len() as u16 + 2)
    } else {
        Constraint::Length(3)
    };

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), footer_height])
        .split(f.area());

    // --- Trip header ---
    let (header, sort, filter) = match &state.board {
        Some(board) => (
            TripInfo::from_events(board.events()),
            board.sort(),
            board.filter(),
        ),
        None => (None, SortType::Day, FilterType::Everything),
    };
    let header_line = match header {
        Some(info) => Line::from(vec![
            Span::styled(info.route, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("   {}   ", info.dates)),
            Span::styled(
                format!("Total: €{}", info.total_cost),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        None => Line::from("No trip yet"),
    };
    f.render_widget(
        Paragraph::new(header_line).block(Block::default().borders(Borders::ALL).title(" Trip ")),
        v_chunks[0],
    );

    // --- Event list ---
    let (items, count): (Vec<ListItem>, usize) = match &state.board {
        Some(board) => {
            let cursor = board.cursor();
            let nodes = board.container().nodes();
            let items = nodes
                .iter()
                .enumerate()
                .map(|(i, node)| ListItem::new(Text::from(node.lines(i == cursor))))
                .collect();
            (items, nodes.len())
        }
        None => (Vec::new(), 0),
    };

    let title = if state.loading {
        " Events (Loading...) ".to_string()
    } else {
        format!(
            " Events ({}) [sort: {:?}] [filter: {:?}] ",
            count, sort, filter
        )
    };

    let empty = count == 0 && !state.loading;
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)));
    f.render_stateful_widget(list, v_chunks[1], &mut state.list_state);
    if empty {
        let hint = match filter {
            FilterType::Everything => "Click n to create your first point",
            FilterType::Future => "There are no future events now",
            FilterType::Past => "There are no past events now",
        };
        let inner = Block::default().borders(Borders::ALL).inner(v_chunks[1]);
        f.render_widget(
            Paragraph::new(hint)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
    }

    // --- Footer ---
    let footer_area = v_chunks[2];
    f.render_widget(Clear, footer_area);

    if state.show_full_help {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(footer_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Keyboard Shortcuts (Press ? to minimize) ")
            .border_style(Style::default().fg(Color::Cyan));
        let p = Paragraph::new(full_help_text)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, h_chunks[0]);
        let status = Paragraph::new(state.message.clone())
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        f.render_widget(status, h_chunks[1]);
    } else {
        let f_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(footer_area);
        let status = Paragraph::new(state.message.clone())
            .style(Style::default().fg(Color::Cyan))
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
                    .title(" Status "),
            );
        let help_str = if state.is_form_focused() {
            "Tab:Field Ret:Save Del:Delete Up:Close Esc:Cancel"
        } else {
            "Ret:Edit f:Fav n:New s:Sort v:Filter ?:Help q:Quit"
        };
        let help = Paragraph::new(help_str)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                    .title(" Actions "),
            );
        f.render_widget(status, f_chunks[0]);
        f.render_widget(help, f_chunks[1]);
    }
}
