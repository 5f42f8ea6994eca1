mod debug_report;

use parley::{Chatbot, Context, Options, Request, Role};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let bot = Chatbot::new(config.options.clone());
    let outcome = match &config.mode {
        Mode::OneShot(input) => {
            one_shot(&bot, input, &config);
            Ok(())
        }
        Mode::Repl => repl(&bot, &config),
        Mode::Json => json_lines(&bot),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `PARLEY_LOG`, then `RUST_LOG`, default `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("PARLEY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(true).init();
}

enum Mode {
    OneShot(String),
    Repl,
    Json,
}

struct CliConfig {
    mode: Mode,
    options: Options,
    explain: bool,
    color: bool,
}

fn one_shot(bot: &Chatbot, input: &str, config: &CliConfig) {
    let (reply, details) = bot.handle_verbose(input, &Context::default());
    if config.explain {
        debug_report::print_dispatch(input, &details, config.color);
    }
    println!("{}", reply.a);
}

fn repl(bot: &Chatbot, config: &CliConfig) -> io::Result<()> {
    let interactive = io::stdin().is_terminal();
    let mut stdout = io::stdout();
    if interactive {
        println!("parley {}. Type exit to quit, :history to show the conversation.", env!("CARGO_PKG_VERSION"));
    }

    let mut lines = io::stdin().lock().lines();
    loop {
        if interactive {
            write!(stdout, "You: ")?;
            stdout.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match line.trim().to_lowercase().as_str() {
            "exit" | "quit" => break,
            ":history" => {
                print_history(bot);
                continue;
            }
            _ => {}
        }

        let (reply, details) = bot.handle_verbose(&line, &Context::default());
        if config.explain {
            debug_report::print_dispatch(&line, &details, config.color);
        }
        println!("Bot: {}", reply.a);
    }
    Ok(())
}

fn print_history(bot: &Chatbot) {
    let history = bot.history();
    if history.is_empty() {
        println!("(no history)");
    }
    for turn in history {
        let who = match turn.role {
            Role::User => "You",
            Role::Bot => "Bot",
        };
        println!("[{}] {who}: {}", turn.timestamp.format("%H:%M:%S"), turn.text);
    }
}

/// One `{"q": ...}` object per input line, one `{"a": ...}` object per output
/// line. Lines that are not valid requests get an `{"error": ...}` line.
fn json_lines(bot: &Chatbot) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let out = match serde_json::from_str::<Request>(&line) {
            Ok(request) => serde_json::to_value(bot.handle(&request.q)),
            Err(err) => {
                tracing::warn!(target: "parley::cli", error = %err, "invalid request line");
                Ok(serde_json::json!({ "error": format!("invalid request: {err}") }))
            }
        }
        .map_err(io::Error::other)?;
        writeln!(stdout, "{out}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn parse_args() -> Result<CliConfig, String> {
    parse_args_from(std::env::args().skip(1), io::stdout().is_terminal())
}

fn parse_args_from(argv: impl Iterator<Item = String>, color_default: bool) -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut json = false;
    let mut explain = false;
    let mut color = color_default;
    let mut options = Options::default();
    let mut args = argv;

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("parley {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--explain" => explain = true,
            "--input" | "-i" => {
                let value = value_for(&flag, inline, &mut args)?;
                set_input(&mut input, value)?;
            }
            "--timeout" => {
                let value = value_for(&flag, inline, &mut args)?;
                options.runner.timeout = parse_timeout(&value)?;
            }
            "--no-isolation" => {
                options.runner.isolate_network = false;
                options.runner.isolate_filesystem = false;
            }
            "--interpreter" => {
                let value = value_for(&flag, inline, &mut args)?;
                options.runner.interpreter = PathBuf::from(value);
            }
            "--history" => {
                let value = value_for(&flag, inline, &mut args)?;
                options.session_capacity =
                    value.parse().map_err(|_| format!("error: invalid --history '{value}' (expected a count)"))?;
            }
            "--seed" => {
                let value = value_for(&flag, inline, &mut args)?;
                options.seed =
                    Some(value.parse().map_err(|_| format!("error: invalid --seed '{value}' (expected an integer)"))?);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    set_input(&mut input, rest)?;
                }
                break;
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                set_input(&mut input, rest)?;
                break;
            }
        }
    }

    let mode = match (input, json) {
        (Some(_), true) => return Err("error: --json reads requests from stdin and takes no input".to_string()),
        (None, true) => Mode::Json,
        (Some(text), false) => Mode::OneShot(text),
        (None, false) => Mode::Repl,
    };

    Ok(CliConfig { mode, options, explain, color })
}

fn value_for(
    flag: &str,
    inline: Option<String>,
    args: &mut impl Iterator<Item = String>,
) -> Result<String, String> {
    inline.or_else(|| args.next()).ok_or_else(|| format!("error: {flag} expects a value"))
}

fn set_input(input: &mut Option<String>, value: String) -> Result<(), String> {
    if input.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *input = Some(value);
    Ok(())
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    match value.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 && secs <= 3600.0 => Ok(Duration::from_secs_f64(secs)),
        _ => Err(format!("error: invalid --timeout '{value}' (expected seconds, e.g. 2 or 0.5)")),
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "parley {version}

Rule-based chatbot: greetings, arithmetic, sandboxed code, DFA/PDA/CFG/regex demos.

Usage:
  parley [OPTIONS] [--] <input...>     Answer one message and exit.
  parley [OPTIONS] --input <text>
  parley [OPTIONS]                     Chat on stdin (type exit or quit to leave).
  parley --json                        Read {{\"q\": ...}} lines, write {{\"a\": ...}} lines.

Options:
  -i, --input <text>         Message to answer.
  --timeout <secs>           Wall-clock limit for running code. Default: {timeout:?}
  --interpreter <path>       Interpreter used to run code. Default: {interpreter}
  --no-isolation             Run code without the network namespace and Landlock
                             rules, for hosts whose kernel refuses them.
  --history <n>              Turns kept in the session history. Default: {history}
  --seed <n>                 Seed joke and fact selection.
  --json                     JSON lines mode.
  --explain                  Print which rules were tried for each message.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Commands:
  regex:<pattern>; string:<text>   dfa:<bits>   pda:<expr>   cfg:<sentence>

Environment:
  PARLEY_LOG, RUST_LOG       Log filter (tracing EnvFilter syntax). Default: warn

Exit codes:
  0  Success.
  1  I/O error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        timeout = parley::RunnerConfig::default().timeout,
        interpreter = parley::RunnerConfig::default().interpreter.display(),
        history = Options::default().session_capacity,
    )
}
