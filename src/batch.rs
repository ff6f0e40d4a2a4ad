use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::config::Config;
use crate::eval;
use crate::render::Screen;

/// Evaluates `input` line by line, printing the same result block the
/// interactive session shows. A line that fails to evaluate is reported and
/// the batch continues; an entirely empty input is itself reported as an
/// unevaluable (empty) expression.
pub fn run<R: BufRead, W: Write>(
    input: R,
    config: &Config,
    screen: &mut Screen<W>,
) -> io::Result<()> {
    let mut saw_line = false;
    for line in input.lines() {
        let line = line?;
        let expression = line.trim_end_matches(['\n', '\r']);
        saw_line = true;
        debug!(%expression, "batch line");
        match eval::evaluate_in_base(expression, config.input_base) {
            Ok(value) => screen.result(config, expression, value)?,
            Err(_) => screen.report_unevaluable(expression),
        }
    }
    if !saw_line {
        screen.report_unevaluable("");
    }
    Ok(())
}
