#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `RANGEFOLD_DEMO_*` prefix.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Rangefold Demo — interactive min/max range tree

USAGE:
    rangefold-demo [OPTIONS]

OPTIONS:
    --size=N       Number of elements, all initially zero (default: 100)
    --help, -h     Show this help message
    --version, -V  Show version

COMMANDS (read from stdin, one per line):
    s I J V        Set every element in [I, J] to V
    a I J V        Add V to every element in [I, J]
    m I J          Print the minimum over [I, J]
    M I J          Print the maximum over [I, J]
    q              Quit

ENVIRONMENT VARIABLES:
    RANGEFOLD_DEMO_SIZE    Override --size";

/// Parsed command-line options.
pub struct Opts {
    /// Number of elements in the demo tree.
    pub size: usize,
}

impl Default for Opts {
    fn default() -> Self {
        Self { size: 100 }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Prints help/version and exits for `--help`/`--version`; exits with
    /// an error message on malformed flags.
    pub fn parse() -> Self {
        let mut opts = Self::default();

        if let Ok(size) = env::var("RANGEFOLD_DEMO_SIZE") {
            match size.parse::<usize>() {
                Ok(n) if n > 0 => opts.size = n,
                _ => {
                    eprintln!("RANGEFOLD_DEMO_SIZE must be a positive integer, got '{size}'");
                    process::exit(2);
                }
            }
        }

        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--help" | "-h" => {
                    println!("{HELP_TEXT}");
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("rangefold-demo {VERSION}");
                    process::exit(0);
                }
                _ => {
                    if let Some(value) = arg.strip_prefix("--size=") {
                        match value.parse::<usize>() {
                            Ok(n) if n > 0 => opts.size = n,
                            _ => {
                                eprintln!("--size must be a positive integer, got '{value}'");
                                process::exit(2);
                            }
                        }
                    } else {
                        eprintln!("unknown option '{arg}' (try --help)");
                        process::exit(2);
                    }
                }
            }
        }

        opts
    }
}
