use thiserror::Error;

use crate::radix::Base;

/// The base numerals are read in, and the ordered set of bases every
/// magnitude gets displayed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_base: Base,
    pub output_bases: Vec<Base>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_base: Base::DECIMAL,
            output_bases: vec![Base::BINARY, Base::DECIMAL, Base::HEX],
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid output base list")]
pub struct InvalidBaseList;

/// Parses a comma-separated output-base list: digits-only tokens, each in
/// 2-36, no duplicates. An empty token anywhere rejects the list, which rules
/// out leading, trailing and consecutive commas in one stroke. Shared by the
/// command line and the `:o` command so both accept exactly the same language.
pub fn parse_base_list(text: &str) -> Result<Vec<Base>, InvalidBaseList> {
    let mut bases = Vec::new();
    for token in text.split(',') {
        let base: Base = token.parse().map_err(|_| InvalidBaseList)?;
        if bases.contains(&base) {
            return Err(InvalidBaseList);
        }
        bases.push(base);
    }
    Ok(bases)
}
