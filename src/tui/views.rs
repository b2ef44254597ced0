//! TUI views and rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::controller::{Phase, Snapshot};
use crate::domain::{LaneId, Vehicle, VehicleClass};

/// How many queued vehicles the lane table lists per lane.
const LANE_PREVIEW: usize = 5;

/// Main render function
pub fn render(snapshot: &Snapshot, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(7),  // Lane table
            Constraint::Length(9),  // Recent vehicles
            Constraint::Min(12),    // Junction diagram
            Constraint::Length(3),  // Footer
        ])
        .split(frame.area());

    render_header(snapshot, frame, chunks[0]);
    render_lanes(snapshot, frame, chunks[1]);
    render_recent(snapshot, frame, chunks[2]);
    render_junction(snapshot, frame, chunks[3]);
    render_footer(frame, chunks[4]);
}

/// Render the header bar
fn render_header(snapshot: &Snapshot, frame: &mut Frame, area: Rect) {
    let phase_style = match snapshot.phase {
        Phase::AllRed => Style::default().fg(Color::Red),
        Phase::Green => Style::default().fg(Color::Green),
        Phase::EmergencyGreen => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Trafficd ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(snapshot.phase.to_string(), phase_style),
        Span::raw(" │ "),
        Span::styled(
            format!("{} served", snapshot.stats.total_served),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("{} emergencies", snapshot.stats.emergency_served),
            Style::default().fg(Color::Red),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("{} preemptions", snapshot.stats.preemptions),
            Style::default().fg(Color::Yellow),
        ),
    ])])
    .block(Block::default().borders(Borders::ALL).title(" Traffic Control "));

    frame.render_widget(header, area);
}

/// Render the per-lane queue table
fn render_lanes(snapshot: &Snapshot, frame: &mut Frame, area: Rect) {
    let rows: Vec<Row> = snapshot
        .lanes
        .iter()
        .map(|lane| {
            let go = snapshot.served_lane == Some(lane.lane);
            let state_cell = if go {
                Cell::from("GO").style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            } else {
                Cell::from("STOP").style(Style::default().fg(Color::Red))
            };
            let status_cell = if lane.priority {
                Cell::from("EMERGENCY!").style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            } else {
                Cell::from("Normal").style(Style::default().fg(Color::DarkGray))
            };

            Row::new(vec![
                Cell::from(lane.lane.to_string()),
                state_cell,
                Cell::from(lane.count().to_string()),
                status_cell,
                Cell::from(queue_preview(&lane.vehicles)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Min(20),
        ],
    )
    .header(Row::new(vec!["LANE", "STATE", "QUEUE", "STATUS", "VEHICLES"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(Block::default().borders(Borders::ALL).title(" Lanes "));

    frame.render_widget(table, area);
}

/// Render the crossing vehicle and the rolling history
fn render_recent(snapshot: &Snapshot, frame: &mut Frame, area: Rect) {
    let mut rows: Vec<Row> = Vec::with_capacity(snapshot.history.len() + 1);

    match &snapshot.crossing {
        Some(vehicle) => rows.push(
            Row::new(vec![
                vehicle.id.to_string(),
                vehicle.lane.to_string(),
                vehicle.class.label().to_string(),
                "CROSSING...".to_string(),
            ])
            .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        ),
        None => rows.push(Row::new(vec![
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
            "IDLE".to_string(),
        ])),
    }

    for vehicle in &snapshot.history {
        let style = if vehicle.class.is_priority() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        rows.push(
            Row::new(vec![
                vehicle.id.to_string(),
                vehicle.lane.to_string(),
                vehicle.class.label().to_string(),
                "COMPLETED".to_string(),
            ])
            .style(style),
        );
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(12),
        ],
    )
    .header(Row::new(vec!["VEHICLE ID", "LANE", "TYPE", "STATUS"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(Block::default().borders(Borders::ALL).title(" Recently Processed "));

    frame.render_widget(table, area);
}

/// Render the ASCII junction diagram with the green approach highlighted
fn render_junction(snapshot: &Snapshot, frame: &mut Frame, area: Rect) {
    let lane_style = |lane: LaneId| {
        if snapshot.served_lane == Some(lane) {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red)
        }
    };
    let n = lane_style(LaneId::North);
    let s = lane_style(LaneId::South);
    let e = lane_style(LaneId::East);
    let w = lane_style(LaneId::West);

    let center = match &snapshot.crossing {
        Some(vehicle) if vehicle.class.is_priority() => Span::styled(
            format!("* {:>4} *", vehicle_tag(vehicle)),
            Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
        ),
        Some(vehicle) => Span::styled(
            format!("[ {:>4} ]", vehicle_tag(vehicle)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        None => Span::raw("        "),
    };

    let pad = "                ";
    let bar = "════════════════";
    let mut lines = vec![Line::from(""), Line::from(vec![Span::raw(pad), Span::styled("║   ║", n)])];
    lines.push(Line::from(vec![Span::raw(pad), Span::styled("║ | ║", n)]));
    lines.push(Line::from(vec![Span::raw(pad), Span::styled("║ ↓ ║", n)]));
    lines.push(Line::from(vec![
        Span::styled(bar, w),
        Span::styled("╝   ╚", n),
        Span::styled(bar, e),
    ]));
    lines.push(Line::from(vec![
        Span::styled(" - - - - >  ", w),
        center,
        Span::styled("  < - - - - ", e),
    ]));
    lines.push(Line::from(vec![
        Span::styled(bar, w),
        Span::styled("╗   ╔", s),
        Span::styled(bar, e),
    ]));
    lines.push(Line::from(vec![Span::raw(pad), Span::styled("║ ↑ ║", s)]));
    lines.push(Line::from(vec![Span::raw(pad), Span::styled("║ | ║", s)]));
    lines.push(Line::from(vec![Span::raw(pad), Span::styled("║   ║", s)]));

    let junction = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Junction "));
    frame.render_widget(junction, area);
}

/// Render the controls footer
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::raw("Controls: "),
        Span::styled("[1-4]", Style::default().fg(Color::Cyan)),
        Span::raw(" add car │ "),
        Span::styled("[a-d]", Style::default().fg(Color::Cyan)),
        Span::raw(" add ambulance │ "),
        Span::styled("[q]", Style::default().fg(Color::Cyan)),
        Span::raw(" quit"),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

/// Short tag for one vehicle: class initial plus the two-digit id tail.
fn vehicle_tag(vehicle: &Vehicle) -> String {
    let initial = match vehicle.class {
        VehicleClass::Regular => 'C',
        VehicleClass::Ambulance => 'A',
        VehicleClass::Police => 'P',
        VehicleClass::FireTruck => 'F',
    };
    format!("{}{:02}", initial, vehicle.id % 100)
}

/// First few queued vehicles as tags, elided past [`LANE_PREVIEW`].
fn queue_preview(vehicles: &[Vehicle]) -> String {
    let mut preview: Vec<String> = vehicles.iter().take(LANE_PREVIEW).map(vehicle_tag).collect();
    if vehicles.len() > LANE_PREVIEW {
        preview.push("...".to_string());
    }
    preview.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(id: u32, class: VehicleClass) -> Vehicle {
        Vehicle {
            id,
            class,
            lane: LaneId::North,
            arrival_time: 0,
            wait_score: 0,
        }
    }

    #[test]
    fn test_vehicle_tag() {
        assert_eq!(vehicle_tag(&vehicle(7, VehicleClass::Regular)), "C07");
        assert_eq!(vehicle_tag(&vehicle(1042, VehicleClass::Ambulance)), "A42");
        assert_eq!(vehicle_tag(&vehicle(13, VehicleClass::Police)), "P13");
        assert_eq!(vehicle_tag(&vehicle(99, VehicleClass::FireTruck)), "F99");
    }

    #[test]
    fn test_queue_preview_elides_past_limit() {
        let vehicles: Vec<Vehicle> = (1..=7).map(|id| vehicle(id, VehicleClass::Regular)).collect();
        let preview = queue_preview(&vehicles);

        assert!(preview.starts_with("C01 C02"));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.matches(' ').count(), 5);
    }

    #[test]
    fn test_queue_preview_empty() {
        assert_eq!(queue_preview(&[]), "");
    }
}
