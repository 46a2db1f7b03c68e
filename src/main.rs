use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use findql::config::{ConfigError, ShellConfig};
use findql::{parse_at, symbols, Query};

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> (ShellConfig, Option<ConfigError>) {
    match ShellConfig::from_json_file(ShellConfig::default_path()) {
        Ok(config) => (config, None),
        Err(err) => (ShellConfig::default(), Some(err)),
    }
}

fn to_json(query: &Query, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(query)
    } else {
        serde_json::to_string(query)
    };
    json.context("failed to serialize query")
}

/// Parses one statement and prints it, or prints the error with a pointer
/// into the statement. Returns whether parsing succeeded.
fn run_query(config: &ShellConfig, input: &str) -> Result<bool> {
    match parse_at(input, config.reference_time()) {
        Ok(query) => {
            println!("{}", to_json(&query, config.pretty)?);
            Ok(true)
        }
        Err(err) => {
            if err.is_internal() {
                warn!("symbol table fault: {err}");
            }
            eprintln!("{}", err.render(input));
            Ok(false)
        }
    }
}

fn repl(config: &ShellConfig) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to start line editor")?;
    if let Some(path) = &config.history_file {
        if editor.load_history(path).is_err() {
            info!("no history at {}", path.display());
        }
    }

    println!("findql: enter FIND statements, Ctrl-D to quit");
    loop {
        match editor.readline("findql> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;
                run_query(config, line)?;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("failed to read line"),
        }
    }

    if let Some(path) = &config.history_file {
        editor
            .save_history(path)
            .with_context(|| format!("failed to save history to {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let (config, config_error) = load_config();
    init_logging(&config.log_filter);
    match config_error {
        Some(ConfigError::NotFound(path)) => info!("no config at {}, using defaults", path.display()),
        Some(err) => warn!("{err}, using defaults"),
        None => info!("loaded config from {}", ShellConfig::default_path().display()),
    }

    symbols::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        return repl(&config);
    }

    let input = args.join(" ");
    if !run_query(&config, &input)? {
        std::process::exit(1);
    }
    Ok(())
}
