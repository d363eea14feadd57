//! Step-oriented console output
//!
//! Human-facing progress goes to stdout with an icon per line; colors come from
//! `anstyle` and are dropped when `NO_COLOR` is set or stdout is not a terminal.
//! Diagnostics for developers go through `tracing` instead.

use anstyle::{AnsiColor, Color, Style};
use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Semantic color of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
  Plain,
  Info,
  Success,
  Warning,
  Failure,
  Muted,
}

impl Tone {
  fn style(self) -> Style {
    let fg = |c: AnsiColor| Style::new().fg_color(Some(Color::Ansi(c)));
    match self {
      Tone::Plain => Style::new(),
      Tone::Info => fg(AnsiColor::Cyan),
      Tone::Success => fg(AnsiColor::Green).bold(),
      Tone::Warning => fg(AnsiColor::Yellow),
      Tone::Failure => fg(AnsiColor::Red).bold(),
      Tone::Muted => Style::new().dimmed(),
    }
  }
}

fn color_enabled() -> bool {
  static ENABLED: OnceLock<bool> = OnceLock::new();
  *ENABLED.get_or_init(|| std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal())
}

/// Wrap text in the tone's ANSI codes when color output is enabled
pub fn paint(tone: Tone, text: &str) -> String {
  if !color_enabled() || tone == Tone::Plain {
    return text.to_string();
  }
  let style = tone.style();
  format!("{}{}{}", style.render(), text, style.render_reset())
}

/// `842ms` below one second, `3.25s` above
pub fn format_ms(elapsed: Duration) -> String {
  let ms = elapsed.as_millis();
  if ms < 1000 {
    format!("{}ms", ms)
  } else {
    format!("{:.2}s", elapsed.as_secs_f64())
  }
}

pub fn banner(message: &str) {
  println!("🚀 {}", paint(Tone::Info, message));
}

pub fn info(message: &str) {
  println!("ℹ️  {}", message);
}

pub fn warn(message: &str) {
  println!("⚠️  {}", paint(Tone::Warning, message));
}

pub fn skipped(label: &str, reason: &str) {
  println!("⏭️  {} {}", label, paint(Tone::Muted, &format!("skipped ({})", reason)));
}

pub fn elapsed(label: &str, elapsed: Duration) {
  println!("⏱️  {} {}", paint(Tone::Success, label), format_ms(elapsed));
}

/// Run `f` as a named step, printing start and outcome with elapsed time
pub fn step<T, E>(label: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
  println!("🧭 {}", label);
  let start = Instant::now();
  let result = f();
  let took = format_ms(start.elapsed());
  match &result {
    Ok(_) => println!("✅ {} {}", paint(Tone::Success, label), paint(Tone::Muted, &format!("({})", took))),
    Err(_) => eprintln!(
      "❌ {} {}",
      paint(Tone::Failure, &format!("{} failed", label)),
      paint(Tone::Muted, &format!("({})", took))
    ),
  }
  result
}
