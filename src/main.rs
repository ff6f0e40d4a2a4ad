mod batch;
mod config;
mod eval;
mod history;
mod radix;
mod render;
mod session;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Result;
use clap::Parser;
use termion::event::Key;
use termion::input::TermRead;
use termion::raw::IntoRawMode;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::radix::Base;
use crate::render::Screen;
use crate::session::{Keystroke, Session};

const EXIT_INVALID_ARGS: i32 = 17;
const EXIT_OPEN_FILE: i32 = 13;

#[derive(Parser, Debug)]
#[command(name = "basehop", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Base numerals are read in (2-36)
    #[arg(long, value_parser = parse_base_arg)]
    inputbase: Option<Base>,

    /// Comma-separated list of bases results are displayed in
    #[arg(long, value_parser = parse_obases_arg)]
    obases: Option<BaseList>,

    /// Evaluate expressions line by line from a file instead
    #[arg(long, value_parser = parse_file_arg)]
    file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct BaseList(Vec<Base>);

fn parse_base_arg(s: &str) -> Result<Base, String> {
    s.parse()
        .map_err(|_| String::from("expected a base between 2 and 36"))
}

fn parse_obases_arg(s: &str) -> Result<BaseList, String> {
    config::parse_base_list(s)
        .map(BaseList)
        .map_err(|e| e.to_string())
}

fn parse_file_arg(s: &str) -> Result<PathBuf, String> {
    if s.is_empty() {
        Err(String::from("file name must not be empty"))
    } else {
        Ok(PathBuf::from(s))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::try_parse().unwrap_or_else(|_| {
        eprintln!("Usage: basehop [--obases 2..36] [--inputbase 2..36] [--file string]");
        process::exit(EXIT_INVALID_ARGS);
    });

    let mut config = Config::default();
    if let Some(base) = cli.inputbase {
        config.input_base = base;
    }
    if let Some(BaseList(bases)) = cli.obases {
        config.output_bases = bases;
    }

    let outcome = match cli.file {
        Some(path) => run_batch(&path, &config),
        None => run_interactive(config),
    };
    if let Err(error) = outcome {
        eprintln!("basehop: {error:#}");
        process::exit(1);
    }
}

fn run_batch(path: &Path, config: &Config) -> Result<()> {
    let file = File::open(path).unwrap_or_else(|_| {
        eprintln!("basehop: can't read from file \"{}\"", path.display());
        process::exit(EXIT_OPEN_FILE);
    });
    let stdout = io::stdout();
    let mut screen = Screen::new(stdout.lock(), false);
    screen.banner(config, false)?;
    batch::run(BufReader::new(file), config, &mut screen)?;
    screen.farewell()?;
    Ok(())
}

fn run_interactive(config: Config) -> Result<()> {
    let stdout = io::stdout();
    if termion::is_tty(&io::stdin()) {
        // Raw mode is scoped to the guard; dropping it restores the terminal
        // on every exit path.
        let raw = stdout.lock().into_raw_mode()?;
        let mut screen = Screen::new(raw, true);
        drive(config, &mut screen)
    } else {
        let mut screen = Screen::new(stdout.lock(), false);
        drive(config, &mut screen)
    }
}

fn drive<W: Write>(config: Config, screen: &mut Screen<W>) -> Result<()> {
    screen.banner(&config, true)?;
    let mut session = Session::new(config);
    for key in io::stdin().keys() {
        match decode_key(key?) {
            Some(Input::Key(key)) => session.press(key, screen)?,
            Some(Input::EndOfSession) => break,
            None => continue,
        }
    }
    screen.farewell()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Key(Keystroke),
    EndOfSession,
}

fn decode_key(key: Key) -> Option<Input> {
    match key {
        Key::Char('\n') => Some(Input::Key(Keystroke::Enter)),
        Key::Char(c) => Some(Input::Key(Keystroke::Char(c))),
        Key::Backspace => Some(Input::Key(Keystroke::Backspace)),
        Key::Esc => Some(Input::Key(Keystroke::Escape)),
        Key::Ctrl('d') | Key::Ctrl('c') => Some(Input::EndOfSession),
        // Arrows, function keys and remaining chords mean nothing here.
        _ => None,
    }
}
