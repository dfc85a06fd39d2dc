//! Main application entry point.
//!
//! Parses the command line, handles help and version output, and hands
//! everything else to the [`Gaptime`] builder:
//! - Normal startup: `Gaptime::new(debug_enabled).run()`
//! - Simulation: `Gaptime::new(debug_enabled).with_simulation(start, end, mult).run()`

use gaptime::Gaptime;
use gaptime::args::{self, CliAction, ParsedArgs};
use gaptime::common::constants::EXIT_FAILURE;
use gaptime::config::set_config_dir;
use gaptime::log_error_exit;

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let result = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            log_to_file,
        } => set_config_dir(config_dir).and_then(|()| {
            Gaptime::new(debug_enabled)
                .log_to_file(log_to_file)
                .run()
        }),
        CliAction::Simulate {
            debug_enabled,
            start_time,
            end_time,
            multiplier,
            log_to_file,
            config_dir,
        } => set_config_dir(config_dir).and_then(|()| {
            Gaptime::new(debug_enabled)
                .with_simulation(start_time, end_time, multiplier)
                .log_to_file(log_to_file)
                .run()
        }),
    };

    if let Err(e) = result {
        log_error_exit!("{e:#}");
        std::process::exit(EXIT_FAILURE);
    }
}
