//! Coloured terminal output for the CLI.
//!
//! Styling is dropped when stdout is not a terminal.

use owo_colors::{OwoColorize, Style};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::OnceLock;

static PALETTE: OnceLock<Palette> = OnceLock::new();

struct Palette {
    accent: Style,
    success: Style,
    error: Style,
    dim: Style,
}

impl Palette {
    fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self {
                accent: Style::new(),
                success: Style::new(),
                error: Style::new(),
                dim: Style::new(),
            };
        }
        Self {
            accent: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            dim: Style::new().bright_black(),
        }
    }
}

fn palette() -> &'static Palette {
    PALETTE.get_or_init(Palette::detect)
}

pub fn success(label: &str) {
    println!("✅ {}", label.style(palette().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("❌ {}", label.style(palette().error.clone()));
}

pub fn info(label: &str, value: &str) {
    println!("   {} {}", format!("{label}:").style(palette().dim.clone()), value);
}

/// Startup banner for `serve`.
pub fn serving(addr: &SocketAddr, database: &Path, todos: usize) {
    let url = format!("http://{addr}");
    println!("🌍 Server running at {}", url.style(palette().accent.clone()));
    info("Database", &database.display().to_string());
    info("Todos", &todos.to_string());
}
