use std::io::Write;

use scout_agent::PollObserver;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_LABEL: &str = "polling the agent for a PR...";

/// Frames `body` in a titled box sized to its widest line.
pub fn render_panel(title: &str, body: &str) -> String {
    let lines = body.lines().collect::<Vec<_>>();
    let inner_width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.chars().count() + 2);

    let mut rendered = String::new();
    let title_fill = inner_width.saturating_sub(title.chars().count() + 1);
    rendered.push_str(&format!("╭─ {title} {}╮\n", "─".repeat(title_fill)));
    for line in &lines {
        let pad = inner_width - line.chars().count();
        rendered.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }
    rendered.push_str(&format!("╰{}╯", "─".repeat(inner_width + 2)));
    rendered
}

/// Braille spinner redrawn in place once per poll tick.
pub struct SpinnerObserver<W: Write> {
    out: W,
    frame: usize,
    drawn: bool,
}

impl<W: Write> SpinnerObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frame: 0,
            drawn: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PollObserver for SpinnerObserver<W> {
    fn on_tick(&mut self, _tick: usize) {
        let frame = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        // Cosmetic output; a broken terminal must not abort the poll.
        let _ = write!(self.out, "\r{frame}  {SPINNER_LABEL}");
        let _ = self.out.flush();
        self.frame = self.frame.wrapping_add(1);
        self.drawn = true;
    }

    fn on_finish(&mut self) {
        if self.drawn {
            let _ = write!(self.out, "\r\x1b[2K");
            let _ = self.out.flush();
        }
    }
}
