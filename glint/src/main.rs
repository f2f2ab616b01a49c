use std::fs;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Once;

use glint::{PrintHandler, Session};
use glint_source::Source;

const USAGE: &str = "Usage: glint [--dump-tokens] [--dump-ast] [--help] [SCRIPT]";

static TRACING_INIT: Once = Once::new();

#[derive(Debug, Default)]
struct Options {
    dump_tokens: bool,
    dump_ast: bool,
    help: bool,
    script: Option<String>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    for arg in args {
        match arg.as_str() {
            "--dump-tokens" => options.dump_tokens = true,
            "--dump-ast" => options.dump_ast = true,
            "--help" | "-h" => options.help = true,
            flag if flag.starts_with('-') => return Err(format!("unknown option `{}`", flag)),
            _ if options.script.is_some() => return Err("expected at most one script".to_string()),
            _ => options.script = Some(arg),
        }
    }
    Ok(options)
}

/// Logs go to stderr, and only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {}\n{}", message, USAGE);
            process::exit(64);
        }
    };
    if options.help {
        println!("{}", USAGE);
        return;
    }

    let mut session = Session::new(PrintHandler::Stdout)
        .dump_tokens(options.dump_tokens)
        .dump_ast(options.dump_ast);

    match &options.script {
        Some(path) => process::exit(run_file(&mut session, path)),
        None => {
            if let Err(err) = repl(&mut session) {
                eprintln!("error: {}", err);
                process::exit(74);
            }
        }
    }
}

/// Runs a script and returns the exit status.
fn run_file(session: &mut Session, path: &str) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read `{}`: {}", path, err);
            return 66;
        }
    };
    match session.run(&source) {
        Ok(()) => 0,
        Err(err) => {
            eprint!("{}", err.render(&Source::new(&source)));
            err.exit_code()
        }
    }
}

fn repl(session: &mut Session) -> io::Result<()> {
    let mut stdout = io::stdout();
    let stdin = io::stdin();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            return Ok(());
        }
        if input.trim().is_empty() {
            continue;
        }

        if let Err(err) = session.run_line(&input) {
            eprint!("{}", err.render(&Source::new(&input)));
        }
    }
}
