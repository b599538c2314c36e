//! Presentation collaborator: a console table renderer
//!
//! The core hands a finished batch to a [`Presenter`] once per drain;
//! the presenter must be synchronous and non-blocking. The console
//! implementation mirrors the monitor's table columns: Server, Online,
//! IP:Port, Map, Platform, Ping. A failed server stays in the table as
//! a distinct non-numeric row rather than disappearing.

use shared::{QueryOutcome, ResultBatch, ServerAddress};

pub const COLUMNS: [&str; 6] = ["Server", "Online", "IP:Port", "Map", "Platform", "Ping"];
const WIDTHS: [usize; 6] = [28, 8, 24, 18, 18, 10];

/// Receives one complete batch per drained cycle.
pub trait Presenter {
    fn present(&mut self, batch: &ResultBatch);
}

/// Renders batches as a fixed-width table on stdout.
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Presenter for ConsolePresenter {
    fn present(&mut self, batch: &ResultBatch) {
        println!("{}", format_line(&COLUMNS.map(String::from)));
        for (address, outcome) in batch.iter() {
            println!("{}", format_line(&row_cells(address, outcome)));
        }
        println!();
    }
}

fn format_line(cells: &[String; 6]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(WIDTHS) {
        line.push_str(&format!("{:<width$}  ", cell, width = width));
    }
    line.trim_end().to_string()
}

/// One table row per outcome. Failure rows keep the address column but
/// render every status column as non-numeric placeholders.
pub fn row_cells(address: &ServerAddress, outcome: &QueryOutcome) -> [String; 6] {
    match outcome {
        QueryOutcome::Success(status) => [
            status.name.clone(),
            format!("{}/{}", status.players, status.max_players),
            address.to_string(),
            status.map.clone(),
            status.platform.clone(),
            format!("{} ms", status.ping_ms),
        ],
        QueryOutcome::Failure { reason, .. } => [
            "connection failed".to_string(),
            "N/A".to_string(),
            address.to_string(),
            "N/A".to_string(),
            "N/A".to_string(),
            reason.to_string(),
        ],
    }
}
