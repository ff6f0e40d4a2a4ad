use std::io::{self, Write};

use colored::Colorize;

use crate::config::Config;
use crate::history::Entry;
use crate::radix;

/// Output sink for everything the calculator shows.
///
/// With `raw` set the sink drives a raw-mode terminal: renders clear the
/// screen and home the cursor first, and lines end in `\r\n` since raw mode
/// turns off output post-processing. Without it (piped input, file mode)
/// nothing is cleared and lines end in plain `\n`.
pub struct Screen<W: Write> {
    out: W,
    raw: bool,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W, raw: bool) -> Screen<W> {
        Screen { out, raw }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn clear(&mut self) -> io::Result<()> {
        if self.raw {
            write!(
                self.out,
                "{}{}",
                termion::clear::All,
                termion::cursor::Goto(1, 1)
            )?;
        }
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        if self.raw {
            write!(self.out, "{text}\r\n")
        } else {
            writeln!(self.out, "{text}")
        }
    }

    pub fn banner(&mut self, config: &Config, interactive: bool) -> io::Result<()> {
        self.clear()?;
        self.line("Welcome to basehop.")?;
        self.line(&format!("Input base: {}", config.input_base))?;
        let bases: Vec<String> = config
            .output_bases
            .iter()
            .map(ToString::to_string)
            .collect();
        self.line(&format!("Output bases: {}", bases.join(", ")))?;
        if interactive {
            self.line("Please enter your numbers and expressions.")?;
        }
        self.out.flush()
    }

    /// Live view: the accumulated expression, the token being typed, and the
    /// token's magnitude in every output base (zero while the token is empty).
    pub fn prompt(&mut self, config: &Config, expression: &str, token: &str) -> io::Result<()> {
        self.clear()?;
        self.line(&format!(
            "Expression (base {}): {}",
            config.input_base, expression
        ))?;
        self.line(&format!("Input (base {}): {}", config.input_base, token))?;
        let value = radix::parse_magnitude(token, config.input_base).unwrap_or(0);
        self.base_lines(config, value)?;
        self.out.flush()
    }

    pub fn result(&mut self, config: &Config, expression: &str, value: u64) -> io::Result<()> {
        self.clear()?;
        self.line(&format!(
            "Expression (base {}): {}",
            config.input_base, expression
        ))?;
        self.line(&format!(
            "Result (base {}): {}",
            config.input_base,
            radix::format_magnitude(value, config.input_base)
        ))?;
        self.base_lines(config, value)?;
        self.out.flush()
    }

    fn base_lines(&mut self, config: &Config, value: u64) -> io::Result<()> {
        for &base in &config.output_bases {
            self.line(&format!(
                "Base {}: {}",
                base,
                radix::format_magnitude(value, base)
            ))?;
        }
        Ok(())
    }

    pub fn history(&mut self, entries: &[Entry]) -> io::Result<()> {
        self.clear()?;
        for entry in entries {
            self.line(&format!(
                "Expression (base {}): {}",
                entry.base, entry.expression
            ))?;
            self.line(&format!(
                "Result (base {}): {}",
                entry.base,
                radix::format_magnitude(entry.result, entry.base)
            ))?;
        }
        self.out.flush()
    }

    pub fn farewell(&mut self) -> io::Result<()> {
        self.line("Thank you for using basehop!")?;
        self.out.flush()
    }

    /// Failed evaluations go to stderr and never end the session.
    pub fn report_unevaluable(&mut self, expression: &str) {
        let message = format!("Cannot evaluate the expression \"{expression}\"");
        if self.raw {
            let _ = write!(io::stderr(), "{}\r\n", message.red());
        } else {
            eprintln!("{}", message.red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radix::Base;

    fn rendered(f: impl FnOnce(&mut Screen<Vec<u8>>)) -> String {
        let mut screen = Screen::new(Vec::new(), false);
        f(&mut screen);
        String::from_utf8(screen.into_inner()).unwrap()
    }

    #[test]
    fn prompt_shows_token_in_every_output_base() {
        let config = Config::default();
        let out = rendered(|s| s.prompt(&config, "12+", "34").unwrap());
        assert_eq!(
            out,
            "Expression (base 10): 12+\n\
             Input (base 10): 34\n\
             Base 2: 100010\n\
             Base 10: 34\n\
             Base 16: 22\n"
        );
    }

    #[test]
    fn empty_token_renders_as_zero() {
        let config = Config::default();
        let out = rendered(|s| s.prompt(&config, "", "").unwrap());
        assert!(out.contains("Base 2: 0\n"));
        assert!(out.contains("Base 10: 0\n"));
        assert!(out.contains("Base 16: 0\n"));
    }

    #[test]
    fn result_block_lists_all_bases() {
        let mut config = Config::default();
        config.input_base = Base::HEX;
        let out = rendered(|s| s.result(&config, "FF", 255).unwrap());
        assert_eq!(
            out,
            "Expression (base 16): FF\n\
             Result (base 16): FF\n\
             Base 2: 11111111\n\
             Base 10: 255\n\
             Base 16: FF\n"
        );
    }

    #[test]
    fn banner_lists_configuration() {
        let config = Config::default();
        let out = rendered(|s| s.banner(&config, true).unwrap());
        assert_eq!(
            out,
            "Welcome to basehop.\n\
             Input base: 10\n\
             Output bases: 2, 10, 16\n\
             Please enter your numbers and expressions.\n"
        );
    }

    #[test]
    fn file_mode_banner_omits_the_typing_hint() {
        let config = Config::default();
        let out = rendered(|s| s.banner(&config, false).unwrap());
        assert!(!out.contains("Please enter"));
    }

    #[test]
    fn history_listing_uses_each_entrys_base() {
        let entries = vec![
            Entry {
                expression: "FF".into(),
                base: Base::HEX,
                result: 255,
            },
            Entry {
                expression: "10".into(),
                base: Base::BINARY,
                result: 2,
            },
        ];
        let out = rendered(|s| s.history(&entries).unwrap());
        assert_eq!(
            out,
            "Expression (base 16): FF\n\
             Result (base 16): FF\n\
             Expression (base 2): 10\n\
             Result (base 2): 10\n"
        );
    }

    #[test]
    fn raw_mode_clears_and_uses_crlf() {
        let mut screen = Screen::new(Vec::new(), true);
        let config = Config::default();
        screen.prompt(&config, "", "").unwrap();
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert!(out.starts_with("\x1b[2J"));
        assert!(out.contains("Input (base 10): \r\n"));

        let mut screen = Screen::new(Vec::new(), true);
        screen.farewell().unwrap();
        assert_eq!(
            String::from_utf8(screen.into_inner()).unwrap(),
            "Thank you for using basehop!\r\n"
        );
    }
}
