//! Command-line argument parsing and processing.
//!
//! The host takes a handful of flags: a custom configuration directory, debug
//! output, simulated time, and file logging. Anything else prints the help.

use crate::common::constants::DEFAULT_SIMULATION_MULTIPLIER;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the watchface host against the real clock
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_to_file: bool,
    },
    /// Run against a simulated clock from `start_time` to `end_time`
    Simulate {
        debug_enabled: bool,
        start_time: String,
        end_time: String,
        /// Simulated seconds per real second; `0.0` runs as fast as possible
        multiplier: f64,
        log_to_file: bool,
        config_dir: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Rough `YYYY-MM-DD HH:MM:SS` shape check; the time source parses it fully.
fn looks_like_datetime(s: &str) -> bool {
    s.len() == 19
        && s.chars().nth(4) == Some('-')
        && s.chars().nth(7) == Some('-')
        && s.chars().nth(10) == Some(' ')
        && s.chars().nth(13) == Some(':')
        && s.chars().nth(16) == Some(':')
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut log_to_file = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;
        let mut simulation: Option<(String, String, f64)> = None;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = args_vec[i].as_str();
            match arg_str {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--log" => log_to_file = true,
                "--config" | "-c" => {
                    if let Some(dir) = args_vec.get(i + 1) {
                        config_dir = Some(dir.clone());
                        i += 1;
                    } else {
                        log_warning!("Missing directory for --config");
                        unknown_arg_found = true;
                    }
                }
                "--simulate" | "-S" => {
                    // --simulate <start> <end> [multiplier | --fast-forward]
                    let (Some(start), Some(end)) = (args_vec.get(i + 1), args_vec.get(i + 2))
                    else {
                        log_warning!(
                            "Missing arguments for --simulate. Usage: --simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" [multiplier | --fast-forward]"
                        );
                        unknown_arg_found = true;
                        i += 1;
                        continue;
                    };
                    i += 2;

                    if !looks_like_datetime(start) || !looks_like_datetime(end) {
                        log_error!("Invalid simulation time. Use YYYY-MM-DD HH:MM:SS");
                        unknown_arg_found = true;
                        i += 1;
                        continue;
                    }

                    let mut multiplier = DEFAULT_SIMULATION_MULTIPLIER;
                    match args_vec.get(i + 1).map(String::as_str) {
                        Some("--fast-forward") => {
                            multiplier = 0.0;
                            i += 1;
                        }
                        Some(next) if !next.starts_with('-') => {
                            match next.parse::<f64>() {
                                Ok(mult) if (0.1..=3600.0).contains(&mult) => multiplier = mult,
                                _ => {
                                    log_error!(
                                        "Invalid multiplier: {}. Must be between 0.1 and 3600.",
                                        next
                                    );
                                    unknown_arg_found = true;
                                }
                            }
                            i += 1;
                        }
                        _ => {}
                    }

                    simulation = Some((start.clone(), end.clone(), multiplier));
                }
                _ => {
                    if arg_str.starts_with('-') {
                        log_warning!("Unknown option: {arg_str}");
                    } else {
                        log_warning!("Unexpected argument: {arg_str}");
                    }
                    unknown_arg_found = true;
                }
            }
            i += 1;
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if let Some((start_time, end_time, multiplier)) = simulation {
            CliAction::Simulate {
                debug_enabled,
                start_time,
                end_time,
                multiplier,
                log_to_file,
                config_dir,
            }
        } else {
            CliAction::Run {
                debug_enabled,
                config_dir,
                log_to_file,
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    crate::logger::write_output(&format!("┗ {}\n", env!("CARGO_PKG_DESCRIPTION")));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("gaptime [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("    --log              Write output to a log file instead of the terminal");
    log_indented!("-S, --simulate         Run with simulated time (for testing schedules)");
    log_indented!("                       Usage: --simulate <start> <end> [multiplier | --fast-forward]");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Companion protocol:");
    log_indented!("Update batches are read as JSON objects, one per line, on stdin");
    log_indented!("Refresh requests are written as {{\"requestRefresh\":1}} on stdout");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_args() {
        let parsed = ParsedArgs::parse(vec!["gaptime"]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
                log_to_file: false,
            }
        );
    }

    #[test]
    fn test_parse_debug_and_config() {
        let parsed = ParsedArgs::parse(vec!["gaptime", "-d", "--config", "/tmp/watch"]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: true,
                config_dir: Some("/tmp/watch".to_string()),
                log_to_file: false,
            }
        );
    }

    #[test]
    fn test_parse_config_without_dir() {
        let parsed = ParsedArgs::parse(vec!["gaptime", "--config"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(
            ParsedArgs::parse(vec!["gaptime", "--help"]).action,
            CliAction::ShowHelp
        );
        assert_eq!(
            ParsedArgs::parse(vec!["gaptime", "-V"]).action,
            CliAction::ShowVersion
        );
        // Version wins over help
        assert_eq!(
            ParsedArgs::parse(vec!["gaptime", "-h", "--version"]).action,
            CliAction::ShowVersion
        );
    }

    #[test]
    fn test_parse_unknown_option() {
        assert_eq!(
            ParsedArgs::parse(vec!["gaptime", "--frobnicate"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["gaptime", "stray"]).action,
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_simulate_default_multiplier() {
        let parsed = ParsedArgs::parse(vec![
            "gaptime",
            "--simulate",
            "2024-06-01 23:00:00",
            "2024-06-02 01:00:00",
        ]);
        assert_eq!(
            parsed.action,
            CliAction::Simulate {
                debug_enabled: false,
                start_time: "2024-06-01 23:00:00".to_string(),
                end_time: "2024-06-02 01:00:00".to_string(),
                multiplier: DEFAULT_SIMULATION_MULTIPLIER,
                log_to_file: false,
                config_dir: None,
            }
        );
    }

    #[test]
    fn test_parse_simulate_fast_forward_with_log() {
        let parsed = ParsedArgs::parse(vec![
            "gaptime",
            "-S",
            "2024-06-01 23:00:00",
            "2024-06-02 01:00:00",
            "--fast-forward",
            "--log",
        ]);
        match parsed.action {
            CliAction::Simulate {
                multiplier,
                log_to_file,
                ..
            } => {
                assert_eq!(multiplier, 0.0);
                assert!(log_to_file);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_parse_simulate_explicit_multiplier() {
        let parsed = ParsedArgs::parse(vec![
            "gaptime",
            "--simulate",
            "2024-06-01 23:00:00",
            "2024-06-02 01:00:00",
            "600",
        ]);
        assert!(matches!(
            parsed.action,
            CliAction::Simulate { multiplier, .. } if multiplier == 600.0
        ));
    }

    #[test]
    fn test_parse_simulate_rejects_bad_input() {
        let bad_time = ParsedArgs::parse(vec!["gaptime", "--simulate", "yesterday", "today"]);
        assert_eq!(bad_time.action, CliAction::ShowHelpDueToError);

        let missing = ParsedArgs::parse(vec!["gaptime", "--simulate", "2024-06-01 23:00:00"]);
        assert_eq!(missing.action, CliAction::ShowHelpDueToError);

        let bad_mult = ParsedArgs::parse(vec![
            "gaptime",
            "--simulate",
            "2024-06-01 23:00:00",
            "2024-06-02 01:00:00",
            "9000",
        ]);
        assert_eq!(bad_mult.action, CliAction::ShowHelpDueToError);
    }
}
