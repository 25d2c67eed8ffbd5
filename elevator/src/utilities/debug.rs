use std::io::{self, stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand};

use shared_resources::config::ElevatorConfig;

use super::elevator_status::{BankSnapshot, ElevatorStatus};

pub struct Debug {
    stdout: Stdout,
    floors: ElevatorConfig,
    lines_printed: u16,
    message: Option<String>,
}

impl Debug {
    pub fn new(floors: ElevatorConfig) -> Self {
        Debug {
            stdout: stdout(),
            floors: floors,
            lines_printed: 0,
            message: None,
        }
    }

    /// Shown under the tables until replaced.
    pub fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    pub fn printstatus(&mut self, snapshot: &BankSnapshot) -> io::Result<()> {
        if self.lines_printed > 0 {
            self.stdout.execute(cursor::MoveUp(self.lines_printed))?;
        }
        self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;

        let lines = render(&self.floors, snapshot, self.message.as_deref());
        for line in &lines {
            writeln!(self.stdout, "{}", line)?;
        }
        self.stdout.flush()?;
        self.lines_printed = lines.len() as u16;
        Ok(())
    }
}

fn car_cell(car: &ElevatorStatus, floor: u8) -> String {
    if car.floor != floor {
        String::from(if car.cab_calls.contains(&floor) { "*" } else { "" })
    } else if car.door_open {
        String::from("[ ]")
    } else {
        String::from("[#]")
    }
}

fn separator(columns: usize) -> String {
    let mut line = String::from("+");
    for _ in 0..columns {
        line.push_str("------------+");
    }
    line
}

fn row(cells: &[String]) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push_str(&format!(" {0:<10} |", cell));
    }
    line
}

/// Floors top to bottom with the hall buttons and where each car is,
/// followed by one line per car.
pub fn render(floors: &ElevatorConfig, snapshot: &BankSnapshot, message: Option<&str>) -> Vec<String> {
    let columns = 3 + snapshot.elevators.len();
    let mut lines = Vec::new();

    let mut header = vec![String::from("FLOOR"), String::from("HALL UP"), String::from("HALL DOWN")];
    header.extend(snapshot.elevators.iter().map(|car| format!("CAR {}", car.id)));
    lines.push(separator(columns));
    lines.push(row(&header));

    for floor in floors.floors().rev() {
        let buttons = snapshot.hall_buttons.get(floors.index(floor)).copied().unwrap_or([false, false]);
        let mut cells = vec![floor.to_string(), buttons[0].to_string(), buttons[1].to_string()];
        cells.extend(snapshot.elevators.iter().map(|car| car_cell(car, floor)));
        lines.push(separator(columns));
        lines.push(row(&cells));
    }
    lines.push(separator(columns));
    lines.push(String::new());

    lines.push(separator(5));
    lines.push(row(&[
        String::from("CAR"),
        String::from("STATE"),
        String::from("FLOOR"),
        String::from("DIRECTION"),
        String::from("DOOR"),
    ]));
    for car in &snapshot.elevators {
        lines.push(separator(5));
        lines.push(row(&[
            car.id.to_string(),
            car.behaviour.as_string(),
            car.floor.to_string(),
            car.direction.as_string().unwrap_or_else(|| String::from("-")),
            String::from(if car.door_open { "open" } else { "closed" }),
        ]));
    }
    lines.push(separator(5));

    if let Some(message) = message {
        lines.push(message.to_string());
    }
    lines
}
