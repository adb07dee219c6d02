/// Presentation layer: crossterm terminal renderer.
///
/// Each map cell takes two terminal columns so wide glyphs (`⬛`) and
/// narrow ones line up. Cells are blanked then drawn in place; the whole
/// frame is batched with `queue!` and flushed once. A full clear happens
/// only when a new level starts (`clear()`).
///
/// Layout:
///   rows 0..H   the board
///   row  H+1    level / clock / goals
///   row  H+2    message (obstacle text, save result, ...)
///   row  H+3    key help

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::color::ObjectColor;
use crate::sim::play::Level;
use super::input::HELP_LINE;

const CELL_COLS: u16 = 2;

/// What the board alone does not know.
pub struct StatusInfo<'a> {
    pub level_number: usize,
    pub level_count: usize,
    pub notice: &'a str,
}

pub struct Renderer {
    out: BufWriter<Stdout>,
    active: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            out: BufWriter::new(io::stdout()),
            active: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, terminal::EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        self.active = true;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::All))
    }

    pub fn render(&mut self, level: &Level, status: &StatusInfo) -> io::Result<()> {
        let map = level.map();

        for y in 0..map.height() {
            for x in 0..map.width() {
                let (cx, cy) = (x as i32, y as i32);
                let color = map.get(cx, cy).map_or(ObjectColor::Black, |o| o.color);
                let glyph = map.glyph(cx, cy).unwrap_or(" ");
                let col = cell_column(x);
                queue!(
                    self.out,
                    MoveTo(col, y as u16),
                    Print("  "),
                    MoveTo(col, y as u16),
                    SetForegroundColor(term_color(color)),
                    Print(glyph)
                )?;
            }
        }

        let base = map.height() as u16;
        let secs = level.elapsed_secs();
        let summary = format!(
            "Level {}/{}  {}   Time {:02}:{:02}   Goals {}/{}",
            status.level_number, status.level_count, map.level_name(),
            secs / 60, secs % 60,
            level.goals_filled(), level.goal_count(),
        );
        let message = if status.notice.is_empty() { level.message() } else { status.notice };

        queue!(
            self.out,
            ResetColor,
            MoveTo(0, base + 1), Clear(ClearType::UntilNewLine), Print(summary),
            SetForegroundColor(Color::Yellow),
            MoveTo(0, base + 2), Clear(ClearType::UntilNewLine), Print(message),
            SetForegroundColor(Color::DarkGrey),
            MoveTo(0, base + 3), Clear(ClearType::UntilNewLine), Print(HELP_LINE),
            ResetColor
        )?;
        self.out.flush()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Terminal column of map column `x`; clamps instead of wrapping.
fn cell_column(x: usize) -> u16 {
    u16::try_from(x).unwrap_or(u16::MAX).saturating_mul(CELL_COLS)
}

pub fn term_color(c: ObjectColor) -> Color {
    match c {
        ObjectColor::Black       => Color::Black,
        ObjectColor::DarkBlue    => Color::DarkBlue,
        ObjectColor::DarkGreen   => Color::DarkGreen,
        ObjectColor::DarkCyan    => Color::DarkCyan,
        ObjectColor::DarkRed     => Color::DarkRed,
        ObjectColor::DarkMagenta => Color::DarkMagenta,
        ObjectColor::DarkYellow  => Color::DarkYellow,
        ObjectColor::Gray        => Color::Grey,
        ObjectColor::DarkGray    => Color::DarkGrey,
        ObjectColor::Blue        => Color::Blue,
        ObjectColor::Green       => Color::Green,
        ObjectColor::Cyan        => Color::Cyan,
        ObjectColor::Red         => Color::Red,
        ObjectColor::Magenta     => Color::Magenta,
        ObjectColor::Yellow      => Color::Yellow,
        ObjectColor::White       => Color::White,
    }
}
