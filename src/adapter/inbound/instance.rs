//! Text instance readers.
//!
//! Two whitespace-separated layouts are supported:
//!
//! - [`InstanceFormat::Trigeiro`]: `nI nP`, a capacity line (one value for all
//!   periods or one per period), one `a h m f` line per item, then `nP` lines
//!   of `nI` demands. Resource usage is forced to 1 and production cost to 0.
//! - [`InstanceFormat::Large`]: `nI nP`, per-item `idx f` and `idx h` lines,
//!   `nI * nP` lines `i t d`, two precomputed blocks that are skipped,
//!   per-item `idx a` lines and `nP` lines `t cap`. Setup usage and
//!   production cost are zero.
//!
//! Blank lines are ignored. Errors carry the 1-based line number.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::domain::{InstanceParams, ProblemData};
use crate::error::{InstanceError, Result};

/// Supported instance layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstanceFormat {
    #[default]
    Trigeiro,
    Large,
}

impl fmt::Display for InstanceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigeiro => write!(f, "trigeiro"),
            Self::Large => write!(f, "large"),
        }
    }
}

impl FromStr for InstanceFormat {
    type Err = InstanceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trigeiro" | "small" => Ok(Self::Trigeiro),
            "large" => Ok(Self::Large),
            other => Err(InstanceError::UnknownFormat(other.to_string())),
        }
    }
}

/// Read and validate an instance file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not match `format`, or
/// describes an invalid instance.
pub fn read_instance<P: AsRef<Path>>(path: P, format: InstanceFormat) -> Result<ProblemData> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    parse_instance(&content, &path.display().to_string(), format)
}

/// Parse instance text. `source` names the input in error messages.
///
/// # Errors
///
/// See [`read_instance`].
pub fn parse_instance(content: &str, source: &str, format: InstanceFormat) -> Result<ProblemData> {
    let mut lines = Lines::new(content, source);
    let params = match format {
        InstanceFormat::Trigeiro => parse_trigeiro(&mut lines)?,
        InstanceFormat::Large => parse_large(&mut lines)?,
    };
    debug!(
        source,
        %format,
        items = params.items,
        periods = params.periods,
        "parsed instance"
    );
    Ok(ProblemData::try_new(params)?)
}

fn parse_trigeiro(lines: &mut Lines<'_>) -> Result<InstanceParams> {
    let (items, periods) = lines.dimensions()?;
    let mut params = InstanceParams::uniform(items, periods);

    let capacity = lines.numbers("capacity", 1)?;
    params.capacity = match capacity.len() {
        1 => vec![capacity[0]; periods],
        n if n == periods => capacity,
        n => {
            return Err(lines
                .malformed(format!("expected 1 or {periods} capacity values, found {n}"))
                .into())
        }
    };

    for j in 0..items {
        let row = lines.numbers("item parameters 'a h m f'", 4)?;
        params.holding_cost[j] = vec![row[1]; periods];
        params.setup_usage[j] = vec![row[2]; periods];
        params.setup_cost[j] = vec![row[3]; periods];
    }

    for t in 0..periods {
        let row = lines.numbers("period demands", items)?;
        for (j, demand) in row.into_iter().take(items).enumerate() {
            params.demand[j][t] = demand;
        }
    }

    Ok(params)
}

fn parse_large(lines: &mut Lines<'_>) -> Result<InstanceParams> {
    let (items, periods) = lines.dimensions()?;
    let mut params = InstanceParams::uniform(items, periods);

    for j in 0..items {
        params.setup_cost[j] = vec![lines.numbers("'idx f'", 2)?[1]; periods];
    }
    for j in 0..items {
        params.holding_cost[j] = vec![lines.numbers("'idx h'", 2)?[1]; periods];
    }
    for j in 0..items {
        for t in 0..periods {
            params.demand[j][t] = lines.numbers("'i t d'", 3)?[2];
        }
    }

    // cumulative demand and cumulative holding cost, recomputed on load
    let block = items * periods * (periods + 1) / 2;
    lines.skip(2 * block, "precomputed cumulative block")?;

    for j in 0..items {
        params.resource_usage[j] = vec![lines.numbers("'idx a'", 2)?[1]; periods];
    }
    for t in 0..periods {
        params.capacity[t] = lines.numbers("'t cap'", 2)?[1];
    }

    Ok(params)
}

/// Non-blank line cursor with line numbers for diagnostics.
struct Lines<'a> {
    source: &'a str,
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    line: usize,
}

impl<'a> Lines<'a> {
    fn new(content: &'a str, source: &'a str) -> Self {
        Self {
            source,
            inner: content.lines().enumerate(),
            line: 0,
        }
    }

    fn next_line(&mut self, expected: &str) -> std::result::Result<&'a str, InstanceError> {
        for (index, text) in self.inner.by_ref() {
            if !text.trim().is_empty() {
                self.line = index + 1;
                return Ok(text);
            }
        }
        Err(InstanceError::UnexpectedEof {
            path: self.source.to_string(),
            expected: expected.to_string(),
        })
    }

    fn skip(&mut self, count: usize, expected: &str) -> std::result::Result<(), InstanceError> {
        for _ in 0..count {
            self.next_line(expected)?;
        }
        Ok(())
    }

    fn dimensions(&mut self) -> std::result::Result<(usize, usize), InstanceError> {
        let text = self.next_line("'nI nP' header")?;
        let mut tokens = text.split_whitespace();
        let items = self.parse::<usize>(tokens.next(), "item count")?;
        let periods = self.parse::<usize>(tokens.next(), "period count")?;
        Ok((items, periods))
    }

    /// Parse a line of at least `min` numbers.
    fn numbers(
        &mut self,
        expected: &str,
        min: usize,
    ) -> std::result::Result<Vec<f64>, InstanceError> {
        let text = self.next_line(expected)?;
        let values = text
            .split_whitespace()
            .map(|token| self.parse::<f64>(Some(token), "a number"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if values.len() < min {
            return Err(self.malformed(format!(
                "expected {expected} ({min} values), found {}",
                values.len()
            )));
        }
        Ok(values)
    }

    fn parse<T: FromStr>(
        &self,
        token: Option<&str>,
        expected: &'static str,
    ) -> std::result::Result<T, InstanceError> {
        let token = token.ok_or_else(|| self.malformed(format!("missing {expected}")))?;
        token.parse().map_err(|_| InstanceError::InvalidToken {
            path: self.source.to_string(),
            line: self.line,
            token: token.to_string(),
            expected,
        })
    }

    fn malformed(&self, reason: String) -> InstanceError {
        InstanceError::Malformed {
            path: self.source.to_string(),
            line: self.line,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const TRIGEIRO: &str = "\
2 3
100
1 1 10 50
1 2 5 80

10 20
0 15
30 5
";

    #[test]
    fn trigeiro_replicates_capacity_and_transposes_demand() {
        let data = parse_instance(TRIGEIRO, "t.dat", InstanceFormat::Trigeiro).unwrap();

        assert_eq!(data.n_items(), 2);
        assert_eq!(data.n_periods(), 3);
        assert_eq!(data.capacity(2), 100.0);
        assert_eq!(data.demand(0, 2), 30.0);
        assert_eq!(data.demand(1, 0), 20.0);
        assert_eq!(data.setup_cost(1, 1), 80.0);
        assert_eq!(data.setup_usage(0, 0), 10.0);
        assert_eq!(data.holding_cost(1, 2), 2.0);
        assert_eq!(data.resource_usage(1, 0), 1.0);
        assert_eq!(data.production_cost(0, 0), 0.0);
    }

    #[test]
    fn trigeiro_accepts_per_period_capacity() {
        let text = TRIGEIRO.replacen("100", "90 100 110", 1);
        let data = parse_instance(&text, "t.dat", InstanceFormat::Trigeiro).unwrap();
        assert_eq!(data.capacity(0), 90.0);
        assert_eq!(data.capacity(2), 110.0);
    }

    #[test]
    fn invalid_token_reports_line() {
        let text = TRIGEIRO.replacen("1 2 5 80", "1 2 x 80", 1);
        let err = parse_instance(&text, "t.dat", InstanceFormat::Trigeiro).unwrap_err();
        assert!(matches!(
            err,
            Error::Instance(InstanceError::InvalidToken { line: 4, .. })
        ));
    }

    #[test]
    fn truncated_file_is_unexpected_eof() {
        let err = parse_instance("2 3\n100\n", "t.dat", InstanceFormat::Trigeiro).unwrap_err();
        assert!(matches!(err, Error::Instance(InstanceError::UnexpectedEof { .. })));
    }

    #[test]
    fn large_skips_cumulative_blocks() {
        // 1 item, 2 periods: cumulative blocks have 3 lines each
        let text = "\
1 2
0 40
0 2
0 0 5
0 1 7
x
x
x
x
x
x
0 3
0 50
1 60
";
        let data = parse_instance(text, "l.dat", InstanceFormat::Large).unwrap();
        assert_eq!(data.setup_cost(0, 1), 40.0);
        assert_eq!(data.holding_cost(0, 0), 2.0);
        assert_eq!(data.demand(0, 1), 7.0);
        assert_eq!(data.resource_usage(0, 1), 3.0);
        assert_eq!(data.capacity(1), 60.0);
        assert_eq!(data.setup_usage(0, 0), 0.0);
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("Large".parse::<InstanceFormat>().unwrap(), InstanceFormat::Large);
        assert_eq!("small".parse::<InstanceFormat>().unwrap(), InstanceFormat::Trigeiro);
        assert!("csv".parse::<InstanceFormat>().is_err());
    }
}
