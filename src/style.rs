//! Terminal output: colored status lines, boxed previews and a spinner for
//! the completion request.
//!
//! Color is disabled when `NO_COLOR` is set or stdout is not a color terminal.

use std::{
   io::{self, IsTerminal, Write},
   sync::{OnceLock, mpsc},
   thread,
   time::Duration,
};

use owo_colors::OwoColorize;

static COLOR_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn colors_enabled() -> bool {
   *COLOR_ENABLED.get_or_init(|| {
      if std::env::var_os("NO_COLOR").is_some() {
         return false;
      }
      supports_color::on(supports_color::Stream::Stdout).is_some_and(|level| level.has_basic)
   })
}

fn paint(s: &str, styled: impl FnOnce(&str) -> String) -> String {
   if colors_enabled() { styled(s) } else { s.to_string() }
}

pub fn success(s: &str) -> String {
   paint(s, |s| s.green().bold().to_string())
}

pub fn warning(s: &str) -> String {
   paint(s, |s| s.yellow().to_string())
}

pub fn error(s: &str) -> String {
   paint(s, |s| s.red().bold().to_string())
}

pub fn info(s: &str) -> String {
   paint(s, |s| s.cyan().to_string())
}

pub fn bold(s: &str) -> String {
   paint(s, |s| s.bold().to_string())
}

/// Print a warning on stderr, clearing a half-drawn spinner line first.
pub fn warn(msg: &str) {
   if io::stdout().is_terminal() {
      print!("\r\x1b[K");
      io::stdout().flush().ok();
   }
   eprintln!("{} {}", warning(icons::WARNING), warning(msg));
}

/// Print an informational line on stderr.
pub fn print_info(msg: &str) {
   eprintln!("{} {msg}", info(icons::INFO));
}

/// Print a fatal error on stderr.
pub fn print_error(msg: &str) {
   eprintln!("{} {}", error(icons::ERROR), error(msg));
}

/// Terminal width, capped at 100 columns.
pub fn term_width() -> usize {
   terminal_size::terminal_size()
      .map_or(80, |(w, _)| w.0 as usize)
      .min(100)
}

pub mod box_chars {
   pub const TOP_LEFT: char = '\u{256D}';
   pub const TOP_RIGHT: char = '\u{256E}';
   pub const BOTTOM_LEFT: char = '\u{2570}';
   pub const BOTTOM_RIGHT: char = '\u{256F}';
   pub const HORIZONTAL: char = '\u{2500}';
   pub const VERTICAL: char = '\u{2502}';
}

pub mod icons {
   pub const SUCCESS: &str = "\u{2713}";
   pub const WARNING: &str = "\u{26A0}";
   pub const ERROR: &str = "\u{2717}";
   pub const INFO: &str = "\u{2139}";
}

/// Greedy word wrap. A single word longer than `max_width` gets its own line.
fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
   let mut lines = Vec::new();
   let mut current = String::new();

   for word in line.split_whitespace() {
      if current.is_empty() {
         current.push_str(word);
      } else if current.chars().count() + 1 + word.chars().count() <= max_width {
         current.push(' ');
         current.push_str(word);
      } else {
         lines.push(std::mem::take(&mut current));
         current.push_str(word);
      }
   }

   if !current.is_empty() || lines.is_empty() {
      lines.push(current);
   }
   lines
}

/// Frame `content` in a rounded box with `title` centered in the top border.
pub fn boxed_message(title: &str, content: &str, width: usize) -> String {
   use box_chars::*;

   let inner_width = width.saturating_sub(4);
   let border_width = width.saturating_sub(2);
   let padding = border_width.saturating_sub(title.chars().count() + 2);
   let left_pad = padding / 2;
   let horizontal = |n: usize| HORIZONTAL.to_string().repeat(n);

   let mut out = String::new();
   out.push(TOP_LEFT);
   out.push_str(&horizontal(left_pad));
   out.push(' ');
   out.push_str(&bold(title));
   out.push(' ');
   out.push_str(&horizontal(padding - left_pad));
   out.push(TOP_RIGHT);
   out.push('\n');

   for line in content.lines() {
      for wrapped in wrap_line(line, inner_width) {
         let pad = inner_width.saturating_sub(wrapped.chars().count());
         out.push(VERTICAL);
         out.push(' ');
         out.push_str(&wrapped);
         out.push_str(&" ".repeat(pad));
         out.push(' ');
         out.push(VERTICAL);
         out.push('\n');
      }
   }

   out.push(BOTTOM_LEFT);
   out.push_str(&horizontal(border_width));
   out.push(BOTTOM_RIGHT);
   out
}

const SPINNER_FRAMES: &[char] = &[
   '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
   '\u{2807}', '\u{280F}',
];

/// Run `f` behind a spinner and finish the line with a success or failure
/// mark. Without color support the message is printed once instead.
pub fn with_spinner_result<F, T, E>(message: &str, f: F) -> Result<T, E>
where
   F: FnOnce() -> Result<T, E>,
{
   if !colors_enabled() {
      println!("{message}");
      return f();
   }

   let (tx, rx) = mpsc::channel::<bool>();
   let msg = message.to_string();

   let spinner = thread::spawn(move || {
      let mut idx = 0;
      loop {
         match rx.try_recv() {
            Ok(ok) => {
               let icon = if ok {
                  icons::SUCCESS.green().to_string()
               } else {
                  icons::ERROR.red().to_string()
               };
               print!("\r\x1b[K{icon} {msg}\n");
               io::stdout().flush().ok();
               break;
            },
            Err(mpsc::TryRecvError::Disconnected) => break,
            Err(mpsc::TryRecvError::Empty) => {},
         }
         print!("\r{} {}", SPINNER_FRAMES[idx].cyan(), msg);
         io::stdout().flush().ok();
         idx = (idx + 1) % SPINNER_FRAMES.len();
         thread::sleep(Duration::from_millis(80));
      }
   });

   let result = f();
   tx.send(result.is_ok()).ok();
   spinner.join().ok();
   result
}
