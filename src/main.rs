//! CLI tool to check, dump, and tokenize source files.

use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: zhlex <command> [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  check   Check that source file(s) parse");
        eprintln!("  dump    Print the canonical AST of each file");
        eprintln!("  tokens  Print one line per token");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  zhlex check main.zh");
        eprintln!("  RUST_LOG=debug zhlex dump main.zh");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    let files = &args[2..];

    if !matches!(command, "check" | "dump" | "tokens") {
        eprintln!("Unknown command: {command}");
        return ExitCode::from(2);
    }
    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };
        let source = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let result = match command {
            "check" => zhlex::parse_str(source).map(|program| {
                eprintln!("{path}: valid ({} statement(s))", program.stmts.len());
            }),
            "dump" => zhlex::parse_str(source).map(|program| {
                println!("{}", zhlex::format(&program));
            }),
            _ => zhlex::tokenize(source)
                .map(|tokens| {
                    for token in &tokens {
                        let span = token.span;
                        println!(
                            "{}:{}..{}\t{:?}\t{}",
                            span.line, span.start, span.end, token.kind, token.text
                        );
                    }
                })
                .map_err(zhlex::Error::from),
        };

        if let Err(e) = result {
            eprintln!("{path}: error {:#06x}: {e}", e.code());
            had_error = true;
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
