/// Start-up save selection on a plain (cooked-mode) terminal.
///
/// Runs before the renderer takes over the screen, so it reads whole lines
/// from stdin. Output errors are ignored: a prompt that cannot print can
/// still read an answer.

use std::io::{self, BufRead, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::sim::document::Banner;
use crate::sim::session::{SaveEntry, SavePrompt};

pub struct TerminalPrompt<R: BufRead> {
    banner: Banner,
    input: R,
}

impl TerminalPrompt<io::StdinLock<'static>> {
    pub fn stdin(banner: Banner) -> Self {
        TerminalPrompt::new(banner, io::stdin().lock())
    }
}

impl<R: BufRead> TerminalPrompt<R> {
    pub fn new(banner: Banner, input: R) -> Self {
        TerminalPrompt { banner, input }
    }

    fn show_banner(&self) {
        let mut out = io::stdout();
        let _ = execute!(
            out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            SetForegroundColor(Color::Red),
            Print(format!("{}\n", self.banner.main_title)),
            Print("====================================\n"),
            SetForegroundColor(Color::DarkGreen),
            Print(format!("{}\n\n", self.banner.subtitle)),
            ResetColor
        );
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}

impl<R: BufRead> SavePrompt for TerminalPrompt<R> {
    fn no_saves(&mut self) {
        self.show_banner();
        print!("Press Enter to start the game: ");
        let _ = io::stdout().flush();
        let _ = self.read_line();
    }

    fn list(&mut self, saves: &[SaveEntry]) {
        self.show_banner();
        println!("Would you like to load a game save?");
        for (i, save) in saves.iter().enumerate() {
            println!("{}: {}", i + 1, save.file_name);
        }
    }

    fn read_choice(&mut self, count: usize) -> Option<String> {
        print!("\nEnter the number of the save file to load (1 / {}) or 0 to just play: ", count);
        let _ = io::stdout().flush();
        self.read_line()
    }

    fn reject(&mut self, reason: &str) {
        println!("{}", reason);
    }
}
