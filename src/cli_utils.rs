/// CLI utilities for consistent output formatting
use std::io::IsTerminal;
use std::time::Duration;

use crate::gate::GateOutcome;

/// Get a colored prefix
///
/// Returns bright cyan if stderr is a TTY, plain text otherwise.
pub fn prefix() -> &'static str {
    if std::io::stderr().is_terminal() {
        "\x1b[96m[trang-gate]\x1b[0m"
    } else {
        "[trang-gate]"
    }
}

/// Compact single-line summary of one step, e.g. `schema | SKIPPED ✓ | 0.01s`
pub fn summary_line(step: &str, outcome: GateOutcome, duration: Duration) -> String {
    let label = match outcome {
        GateOutcome::Skipped => "SKIPPED ✓",
        GateOutcome::Regenerated => "REGENERATED ✓",
    };
    format!("{} | {} | {:.2}s", step, label, duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line("schema", GateOutcome::Skipped, Duration::from_millis(10)),
            "schema | SKIPPED ✓ | 0.01s"
        );
        assert_eq!(
            summary_line("xsd", GateOutcome::Regenerated, Duration::from_millis(1500)),
            "xsd | REGENERATED ✓ | 1.50s"
        );
    }
}
