use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::commands::CommandReport;
use crate::error::CliError;

pub fn render(report: &CommandReport, format: OutputFormat) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Text => writeln!(stdout, "{}", report.text)?,
        OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string_pretty(&report.data)?)?,
    }
    stdout.flush()?;
    Ok(())
}

/// Two decimals for amounts of at least one cent, full precision below.
pub fn format_price(value: f64) -> String {
    if value >= 0.01 {
        format!("{value:.2}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_show_cents_unless_smaller_than_a_cent() {
        assert_eq!(format_price(966.27), "966.27");
        assert_eq!(format_price(4.0), "4.00");
        assert_eq!(format_price(0.0015), "0.0015");
    }
}
