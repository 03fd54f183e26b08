// UI layer: spinners around network calls, terminal output for each
// command and the paged description view.

use crate::practice::KataListing;
use crate::submit::Submission;
use anyhow::Result;
use crossterm::style::{self, Stylize};
use crossterm::tty::IsTty;
use indicatif::{ProgressBar, ProgressStyle};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Spinner drawn on stderr while `f` runs; cleared afterwards.
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    let template = ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(template);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}

pub fn print_listings(listings: &[KataListing]) {
    for listing in listings {
        println!("{}", listing.line());
    }
}

pub fn print_submission(submission: &Submission) {
    match submission {
        Submission::Accepted { solutions_url } => {
            println!(
                "Good job! View other people's solutions here: {}",
                solutions_url.as_str().blue().underlined()
            );
        }
        Submission::Rejected => {
            println!("{}", "The solution wasn't submitted correctly...".red());
        }
    }
}

/// Show text through `$PAGER` (default `less -R`) when stdout is a
/// terminal; print it directly otherwise or if the pager can't start.
pub fn page(lines: &[String]) -> Result<()> {
    let mut text = lines.join("\n");
    text.push('\n');

    let stdout = std::io::stdout();
    if !stdout.is_tty() {
        stdout.lock().write_all(text.as_bytes())?;
        return Ok(());
    }

    let pager = std::env::var("PAGER").unwrap_or_else(|_| "less -R".into());
    let mut parts = pager.split_whitespace();
    let Some(program) = parts.next() else {
        stdout.lock().write_all(text.as_bytes())?;
        return Ok(());
    };

    match Command::new(program).args(parts).stdin(Stdio::piped()).spawn() {
        Ok(mut child) => {
            if let Some(mut stdin) = child.stdin.take() {
                // The user may quit before reading everything.
                if let Err(e) = stdin.write_all(text.as_bytes()) {
                    log::debug!("pager closed early: {}", e);
                }
            }
            child.wait()?;
        }
        Err(e) => {
            log::debug!("could not start pager `{}`: {}", program, e);
            stdout.lock().write_all(text.as_bytes())?;
        }
    }
    Ok(())
}

/// Render markdown into styled terminal lines.
pub fn markdown_lines(markdown: &str) -> Vec<String> {
    let mut writer = MarkdownWriter::default();
    for event in Parser::new(markdown) {
        writer.event(event);
    }
    writer.finish()
}

#[derive(Default)]
struct MarkdownWriter {
    lines: Vec<String>,
    current: String,
    strong: usize,
    emphasis: usize,
    heading: bool,
    code_block: bool,
    /// Next number of each open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
}

impl MarkdownWriter {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.code_block => {
                for line in text.lines() {
                    self.lines.push(format!("    {}", line.dark_yellow()));
                }
            }
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => {
                let code: &str = &code;
                self.current.push_str(&code.yellow().to_string());
            }
            Event::SoftBreak => self.current.push(' '),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push("─".repeat(40).dark_grey().to_string());
                self.blank();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush();
                self.heading = true;
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.code_block = true;
                if let CodeBlockKind::Fenced(info) = kind {
                    if !info.is_empty() {
                        let info: &str = &info;
                        self.lines.push(format!("  {}", info.dark_grey()));
                    }
                }
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.current = format!("{}{}", "  ".repeat(depth), marker);
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = false;
                self.blank();
            }
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::CodeBlock => {
                self.code_block = false;
                self.blank();
            }
            TagEnd::Item => self.flush(),
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        let mut content = style::style(text);
        if self.heading || self.strong > 0 {
            content = content.bold();
        }
        if self.heading {
            content = content.underlined();
        }
        if self.emphasis > 0 {
            content = content.italic();
        }
        self.current.push_str(&content.to_string());
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}
