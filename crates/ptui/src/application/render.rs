#[cfg(test)]
#[path = "render_test.rs"]
mod tests;

use ratatui::layout::Alignment;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Margin;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;
use tracing::Level;

use crate::domain::models::InputMode;
use crate::domain::models::Tenant;
use crate::domain::services::AppState;
use crate::domain::services::Selection;

const LOG_HEIGHT: u16 = 10;
const TEXT_MARGIN: Margin = Margin {
    horizontal: 2,
    vertical: 1,
};

pub fn render(frame: &mut Frame, app_state: &AppState) {
    let area = frame.area();

    let mut title = "Physna TUI".to_string();
    if let Some(tenant) = &app_state.tenant {
        title = format!("{title} - {}", tenant.display_name());
    }

    let app_container = Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    frame.render_widget(app_container, area);

    let inner = area.inner(Margin {
        horizontal: 1,
        vertical: 1,
    });

    if showing_tenants(app_state) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(LOG_HEIGHT),
                Constraint::Length(1),
            ])
            .split(inner);

        tenants_section(frame, app_state, chunks[0]);
        log_section(frame, app_state, chunks[1]);
        status_section(frame, app_state, chunks[2]);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(LOG_HEIGHT),
                Constraint::Length(1),
            ])
            .split(inner);

        search_section(frame, app_state, chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(20), Constraint::Percentage(80)])
            .split(chunks[1]);

        folders_section(frame, app_state, content_chunks[0]);
        models_section(frame, app_state, content_chunks[1]);
        log_section(frame, app_state, chunks[2]);
        status_section(frame, app_state, chunks[3]);
    }

    help_section(frame, app_state);
}

fn showing_tenants(app_state: &AppState) -> bool {
    return app_state.mode == InputMode::TenantSelect
        || (app_state.mode == InputMode::Help
            && app_state.previous_mode == InputMode::TenantSelect);
}

fn pane_style(app_state: &AppState, mode: InputMode) -> Style {
    if app_state.mode == mode {
        return Style::default().fg(Color::Yellow);
    }

    return Style::default();
}

fn pane(title: String, style: Style) -> Block<'static> {
    return Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(style);
}

fn render_list(
    frame: &mut Frame,
    items: Vec<ListItem>,
    block: Block,
    selection: &Selection,
    area: Rect,
) {
    let list = List::new(items)
        .block(block)
        .highlight_symbol("->")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = ListState::default().with_selected(selection.index());
    frame.render_stateful_widget(list, area, &mut state);
}

pub fn format_tenant_item(tenant: &Tenant) -> String {
    match tenant.name.as_ref().filter(|name| !name.trim().is_empty()) {
        Some(name) => return format!("{name} ({}) - {}", tenant.id, tenant.url),
        None => return format!("{} - {}", tenant.id, tenant.url),
    }
}

fn tenants_section(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let area = centered_rect(80, 80, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let items = app_state
        .tenants
        .iter()
        .map(|tenant| {
            let mut item = ListItem::new(format_tenant_item(tenant));
            if app_state.tenant.as_ref().map(|t| &t.id) == Some(&tenant.id) {
                item = item.style(Style::default().fg(Color::Green));
            }
            return item;
        })
        .collect::<Vec<ListItem>>();

    render_list(
        frame,
        items,
        pane(
            "Tenants".to_string(),
            pane_style(app_state, InputMode::TenantSelect),
        ),
        &app_state.tenant_selection,
        chunks[0],
    );

    let hint = Paragraph::new("<Enter> connect  <h> help  <q> exit")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, chunks[1]);
}

fn search_section(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let style = pane_style(app_state, InputMode::Search);
    frame.render_widget(pane("Search".to_string(), style), area);

    let edit_area = area.inner(TEXT_MARGIN);

    // Columns, not characters: wide glyphs take two cells.
    let cursor_column = Span::raw(app_state.search_field.text_before_cursor()).width();
    let visible_columns = usize::from(edit_area.width.saturating_sub(1));
    let scroll = cursor_column.saturating_sub(visible_columns);

    let search = Paragraph::new(app_state.search_field.text())
        .style(style)
        .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX)));
    frame.render_widget(search, edit_area);

    if app_state.mode == InputMode::Search {
        let offset = u16::try_from(cursor_column - scroll).unwrap_or(u16::MAX);
        let x = edit_area
            .x
            .saturating_add(offset)
            .min(edit_area.right().saturating_sub(1));
        frame.set_cursor_position((x, edit_area.y));
    }
}

fn folders_section(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let items = app_state
        .folders
        .iter()
        .map(|folder| return ListItem::new(folder.to_string()))
        .collect::<Vec<ListItem>>();

    render_list(
        frame,
        items,
        pane(
            "Folders".to_string(),
            pane_style(app_state, InputMode::Folder),
        ),
        &app_state.folder_selection,
        area,
    );
}

fn models_section(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let mut models_area = area;
    if app_state.mode == InputMode::Match {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        models_area = chunks[0];
        matches_section(frame, app_state, chunks[1]);
    }

    let mut title = "Models".to_string();
    if let Some(query) = &app_state.models_query {
        title = format!("Models of {}", query.describe());
    }

    let items = app_state
        .models
        .iter()
        .map(|model| {
            return ListItem::new(Line::from(vec![
                Span::raw(model.name.to_string()),
                Span::styled(
                    format!("  [{}]", model.state),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        })
        .collect::<Vec<ListItem>>();

    render_list(
        frame,
        items,
        pane(title, pane_style(app_state, InputMode::Model)),
        &app_state.model_selection,
        models_area,
    );
}

fn matches_section(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let mut title = "Matches".to_string();
    if let Some(model) = &app_state.matches_for {
        title = format!("Matches for {}", model.name);
    }

    let items = app_state
        .matches
        .iter()
        .map(|model_match| {
            return ListItem::new(format!(
                "{:>6.2}%  {}",
                model_match.percentage, model_match.model.name
            ));
        })
        .collect::<Vec<ListItem>>();

    render_list(
        frame,
        items,
        pane(title, pane_style(app_state, InputMode::Match)),
        &app_state.match_selection,
        area,
    );
}

fn level_style(level: Level) -> Style {
    if level == Level::ERROR {
        return Style::default().fg(Color::Red);
    }
    if level == Level::WARN {
        return Style::default().fg(Color::Yellow);
    }
    if level == Level::INFO {
        return Style::default().fg(Color::Green);
    }

    return Style::default().fg(Color::Gray);
}

fn log_section(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let height = usize::from(area.height.saturating_sub(2));
    let lines = app_state
        .log_buffer
        .tail(height)
        .into_iter()
        .map(|line| {
            return Line::from(vec![
                Span::raw(format!("{}|", line.timestamp)),
                Span::styled(format!("{:<5}", line.level.as_str()), level_style(line.level)),
                Span::raw(format!("|{}", line.message)),
            ]);
        })
        .collect::<Vec<Line>>();

    let log = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Log")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        )
        .style(Style::default().fg(Color::White));
    frame.render_widget(log, area);
}

fn status_section(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let status_color = if app_state.status_is_error {
        Color::Red
    } else {
        Color::Green
    };

    let text = Line::from(vec![
        Span::styled(
            format!(" {} ", app_state.mode.label()),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::styled(
            format!(" {}", app_state.status_line),
            Style::default().fg(status_color),
        ),
    ]);

    let status_area = area.inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    frame.render_widget(Paragraph::new(text), status_area);
}

/// Rect using `percent_x` by `percent_y` of `r`, centred in it.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    return Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1];
}

fn help_section(frame: &mut Frame, app_state: &AppState) {
    let Some(help) = &app_state.help else {
        return;
    };

    let area = centered_rect(50, 50, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
        area,
    );

    let text = Paragraph::new(help.text()).wrap(Wrap { trim: false });
    frame.render_widget(text, area.inner(TEXT_MARGIN));
}
