#![forbid(unsafe_code)]

//! Interactive demo: a min/max range tree driven from stdin.
//!
//! Starts with `--size` zero elements and accepts `s`/`a` range updates and
//! `m`/`M` range queries, one command per line. Invalid commands and
//! rejected ranges print a message and the loop continues.

mod cli;

use std::io::{self, BufRead, Write};
use std::process;

use rangefold::RangeTree;
use rangefold::presets::{MinMax, Patch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Set { i: usize, j: usize, value: i64 },
    Add { i: usize, j: usize, delta: i64 },
    Min { i: usize, j: usize },
    Max { i: usize, j: usize },
    Quit,
}

fn next_index(tokens: &mut std::str::SplitWhitespace<'_>, name: &str) -> Result<usize, String> {
    tokens
        .next()
        .ok_or_else(|| format!("missing {name}"))?
        .parse::<usize>()
        .map_err(|_| format!("{name} must be a non-negative integer"))
}

/// Parse one input line. `Ok(None)` means a blank line.
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut tokens = line.split_whitespace();
    let Some(code) = tokens.next() else {
        return Ok(None);
    };

    let cmd = match code {
        "s" | "a" => {
            let i = next_index(&mut tokens, "I")?;
            let j = next_index(&mut tokens, "J")?;
            let value = tokens
                .next()
                .ok_or("missing V")?
                .parse::<i64>()
                .map_err(|_| "V must be an integer".to_string())?;
            if code == "s" {
                Command::Set { i, j, value }
            } else {
                Command::Add { i, j, delta: value }
            }
        }
        "m" => {
            let i = next_index(&mut tokens, "I")?;
            let j = next_index(&mut tokens, "J")?;
            Command::Min { i, j }
        }
        "M" => {
            let i = next_index(&mut tokens, "I")?;
            let j = next_index(&mut tokens, "J")?;
            Command::Max { i, j }
        }
        "q" | "quit" => Command::Quit,
        other => return Err(format!("invalid command '{other}' (try --help)")),
    };

    if tokens.next().is_some() {
        return Err("trailing input after command".to_string());
    }
    Ok(Some(cmd))
}

fn main() {
    let opts = cli::Opts::parse();

    let seed = vec![0i64; opts.size];
    let mut tree: RangeTree<MinMax, Patch> = match RangeTree::build(opts.size, &seed) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("failed to build tree: {e}");
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("stdin error: {e}");
                break;
            }
        }

        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };
        tracing::debug!(?cmd, "dispatching");

        let outcome = match cmd {
            Command::Set { i, j, value } => tree.update(i, j, Patch::Set(value)).map(|()| None),
            Command::Add { i, j, delta } => tree.update(i, j, Patch::Add(delta)).map(|()| None),
            Command::Min { i, j } => tree.query(i, j).map(|agg| Some(agg.min)),
            Command::Max { i, j } => tree.query(i, j).map(|agg| Some(agg.max)),
            Command::Quit => break,
        };
        match outcome {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => {}
            Err(e) => println!("error: {e}"),
        }
    }
}
