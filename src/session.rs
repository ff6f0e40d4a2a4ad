use std::io::{self, Write};

use tracing::debug;

use crate::config::{self, Config};
use crate::eval;
use crate::history::History;
use crate::radix::{self, Base};
use crate::render::Screen;

// Capacity of the in-progress token; further digits are dropped.
const MAX_TOKEN: usize = 64;
const MAX_COMMAND: usize = 127;

/// One decoded keystroke, independent of the input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Enter,
    Backspace,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Command,
    /// A result was just rendered; shapes the very next keystroke only.
    PostResult,
}

/// The keystroke-driven calculator session: the token being typed, the
/// expression assembled so far, the command being entered, and the history
/// of everything evaluated.
pub struct Session {
    config: Config,
    token: String,
    expression: String,
    command: String,
    mode: Mode,
    history: History,
}

impl Session {
    pub fn new(config: Config) -> Session {
        Session {
            config,
            token: String::new(),
            expression: String::new(),
            command: String::new(),
            mode: Mode::Normal,
            history: History::default(),
        }
    }

    /// Feeds one keystroke through the state machine, rendering to `screen`.
    pub fn press<W: Write>(&mut self, key: Keystroke, screen: &mut Screen<W>) -> io::Result<()> {
        if self.mode == Mode::PostResult {
            self.mode = Mode::Normal;
            if !self.starts_fresh(key) {
                // Junk right after a result: swallow it, show the idle prompt.
                return self.render_prompt(screen);
            }
        }
        if self.mode == Mode::Command {
            self.command_key(key, screen)
        } else {
            self.normal_key(key, screen)
        }
    }

    // Keys that begin fresh work right after a result was displayed.
    fn starts_fresh(&self, key: Keystroke) -> bool {
        match key {
            Keystroke::Enter | Keystroke::Backspace | Keystroke::Escape => true,
            Keystroke::Char(c) => {
                matches!(c, ':' | '+' | '-' | '*' | '/')
                    || radix::is_digit_in(c, self.config.input_base)
            }
        }
    }

    fn normal_key<W: Write>(&mut self, key: Keystroke, screen: &mut Screen<W>) -> io::Result<()> {
        match key {
            Keystroke::Escape => {
                self.token.clear();
                self.expression.clear();
                self.render_prompt(screen)
            }
            Keystroke::Backspace => {
                self.token.pop();
                self.render_prompt(screen)
            }
            Keystroke::Enter => self.evaluate(screen),
            Keystroke::Char(':') => {
                self.mode = Mode::Command;
                self.command.clear();
                Ok(())
            }
            Keystroke::Char(c @ ('+' | '-' | '*' | '/')) => {
                self.commit_token();
                self.expression.push(c);
                self.render_prompt(screen)
            }
            Keystroke::Char(c) => {
                if radix::is_digit_in(c, self.config.input_base) && self.token.len() < MAX_TOKEN {
                    self.token.push(c);
                }
                // Anything else is dropped; the prompt redraws either way.
                self.render_prompt(screen)
            }
        }
    }

    // Moves the in-progress token into the expression, normalized through
    // base 10 (uppercased, leading zeros stripped). An empty token commits
    // an implicit zero operand.
    fn commit_token(&mut self) {
        if self.token.is_empty() {
            self.expression.push('0');
        } else if let Ok(normalized) = radix::normalize(&self.token, self.config.input_base) {
            debug!(token = %self.token, %normalized, "commit");
            self.expression.push_str(&normalized);
        }
        self.token.clear();
    }

    fn evaluate<W: Write>(&mut self, screen: &mut Screen<W>) -> io::Result<()> {
        if !self.token.is_empty() {
            self.commit_token();
        }
        if self.expression.is_empty() {
            self.expression.push('0');
        }
        match eval::evaluate_in_base(&self.expression, self.config.input_base) {
            Ok(value) => {
                debug!(expression = %self.expression, value, "evaluated");
                self.history
                    .push(&self.expression, self.config.input_base, value);
                screen.result(&self.config, &self.expression, value)?;
                self.expression.clear();
                self.mode = Mode::PostResult;
                Ok(())
            }
            Err(error) => {
                debug!(expression = %self.expression, %error, "evaluation failed");
                screen.report_unevaluable(&self.expression);
                self.expression.clear();
                Ok(())
            }
        }
    }

    fn command_key<W: Write>(&mut self, key: Keystroke, screen: &mut Screen<W>) -> io::Result<()> {
        match key {
            Keystroke::Enter => {
                let command = std::mem::take(&mut self.command);
                self.mode = Mode::Normal;
                self.dispatch_command(&command, screen)
            }
            Keystroke::Char(c) => {
                if self.command.len() < MAX_COMMAND {
                    self.command.push(c);
                }
                Ok(())
            }
            // No editing inside a command; these keys mean nothing here.
            Keystroke::Backspace | Keystroke::Escape => Ok(()),
        }
    }

    fn dispatch_command<W: Write>(
        &mut self,
        command: &str,
        screen: &mut Screen<W>,
    ) -> io::Result<()> {
        debug!(%command, "command");
        match command.as_bytes().first().copied() {
            Some(b'i') => {
                if let Ok(base) = command[1..].parse::<Base>() {
                    self.config.input_base = base;
                    // Text typed under the old base would silently reparse.
                    self.token.clear();
                    self.expression.clear();
                }
                self.render_prompt(screen)
            }
            Some(b'o') => {
                if command.len() > 1 {
                    if let Ok(bases) = config::parse_base_list(&command[1..]) {
                        self.config.output_bases = bases;
                    }
                    self.token.clear();
                    self.expression.clear();
                }
                self.render_prompt(screen)
            }
            Some(b'h') if command.len() == 1 => {
                // The listing stays up until the next keystroke redraws.
                screen.history(self.history.entries())
            }
            _ => self.render_prompt(screen),
        }
    }

    fn render_prompt<W: Write>(&self, screen: &mut Screen<W>) -> io::Result<()> {
        screen.prompt(&self.config, &self.expression, &self.token)
    }
}
