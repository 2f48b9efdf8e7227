//! Command dispatch for the `autoyes` binary.

use std::process::Command as ProcessCommand;
use std::time::Duration;

use clap::CommandFactory;
use log::{debug, warn};

use autoyes::channel::CompiledPattern;
use autoyes::error::{Error, SessionError};
use autoyes::patterns::GENERIC;
use autoyes::session::exit_code_from_status;
use autoyes::{CategoryRegistry, Config, SESSION_ENV_VAR, SessionBuilder, SessionConfig, SessionMode};

use crate::cli::{Cli, Command, SessionOpts};

const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Exit code when the command could not be found or executed.
const NOT_FOUND_EXIT_CODE: i32 = 127;

/// Run the selected command and return the process exit code.
pub async fn dispatch(command: Option<Command>) -> i32 {
    let nested = is_nested();
    match command {
        None => {
            print_help();
            0
        }
        Some(Command::On(opts)) => cmd_on(&opts, nested).await,
        Some(Command::Off) => {
            if nested {
                println!("autoyes session is active; type 'exit' to leave it");
            } else {
                println!("autoyes session is not active");
            }
            0
        }
        Some(Command::Status) => {
            println!("autoyes: {}", if nested { "active" } else { "inactive" });
            0
        }
        Some(Command::Run { opts, command }) => cmd_run(&opts, command, nested).await,
        Some(Command::List) => {
            cmd_list(&CategoryRegistry::builtin());
            0
        }
        Some(Command::Patterns { categories }) => cmd_patterns(&categories),
        Some(Command::AddPattern { pattern }) => cmd_add_pattern(&pattern),
        Some(Command::DelPattern { pattern }) => cmd_del_pattern(&pattern),
        Some(Command::Wrap(argv)) => cmd_wrap(argv, nested).await,
    }
}

fn is_nested() -> bool {
    std::env::var(SESSION_ENV_VAR).is_ok_and(|value| value == "1")
}

fn print_help() {
    if let Err(err) = Cli::command().print_help() {
        warn!("failed to print help: {}", err);
    }
}

fn load_config() -> Result<Config, i32> {
    Config::load().map_err(|err| {
        eprintln!("autoyes: {err}");
        1
    })
}

/// Merge the persisted config with command-line flags. Flags win.
fn session_config(config: &Config, opts: &SessionOpts) -> SessionConfig {
    let mut session = config.session_config();
    if let Some(response) = &opts.response {
        session.response = response.clone();
    }
    if let Some(cooldown) = opts.cooldown {
        session.cooldown = Duration::try_from_secs_f64(cooldown).unwrap_or(Duration::ZERO);
    }
    session.verbose |= opts.verbose;
    session.extra_patterns.extend(opts.patterns.iter().cloned());
    session.categories = opts.profiles.clone();
    if opts.no_pty {
        session.mode = Some(SessionMode::Pipe);
    }
    session
}

fn error_exit_code(err: &Error) -> i32 {
    match err {
        Error::Session(SessionError::SpawnFailed { .. }) => NOT_FOUND_EXIT_CODE,
        _ => 1,
    }
}

async fn run_session(builder: SessionBuilder) -> i32 {
    let result = match builder.spawn() {
        Ok(session) => {
            debug!("session running in {} mode", session.mode());
            session.run().await
        }
        Err(err) => Err(err),
    };
    result.unwrap_or_else(|err| {
        eprintln!("autoyes: {err}");
        error_exit_code(&err)
    })
}

/// Run `argv` without a proxy. Used inside an existing session.
fn run_direct(argv: &[String]) -> i32 {
    let Some((program, args)) = argv.split_first() else {
        eprintln!("autoyes: no command specified");
        return 1;
    };
    debug!("already inside a session, running {:?} directly", argv);
    match ProcessCommand::new(program).args(args).status() {
        Ok(status) => exit_code_from_status(status),
        Err(err) => {
            eprintln!("autoyes: failed to run '{program}': {err}");
            NOT_FOUND_EXIT_CODE
        }
    }
}

async fn cmd_on(opts: &SessionOpts, nested: bool) -> i32 {
    if nested {
        println!("autoyes session is already active");
        return 0;
    }
    let config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    let session = session_config(&config, opts);
    let registry = CategoryRegistry::builtin();
    let profiles = registry.resolve_categories(&session.categories);

    println!("{GREEN}[autoyes] session started (response: '{}'){RESET}", session.response);
    println!("{GREEN}[autoyes] profiles: {}{RESET}", profiles.join(", "));
    println!("{GREEN}[autoyes] type 'exit' to end the session{RESET}");

    let code = run_session(SessionBuilder::shell().config(session).registry(registry)).await;
    println!("{GREEN}[autoyes] session ended{RESET}");
    code
}

async fn cmd_run(opts: &SessionOpts, command: Vec<String>, nested: bool) -> i32 {
    let argv = strip_separator(command);
    if argv.is_empty() {
        eprintln!("autoyes: no command specified");
        return 1;
    }
    if nested {
        return run_direct(&argv);
    }
    let config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    run_session(SessionBuilder::new(argv).config(session_config(&config, opts))).await
}

async fn cmd_wrap(argv: Vec<String>, nested: bool) -> i32 {
    let registry = CategoryRegistry::builtin();
    let Some((name, args)) = argv.split_first() else {
        print_help();
        return 1;
    };
    let Some(profile) = registry.resolve_profile(name) else {
        eprintln!("autoyes: unknown command '{name}'");
        print_help();
        return 1;
    };
    let real = wrap_command(&registry, profile, args);
    if nested {
        return run_direct(&real);
    }
    let config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    let mut session = config.session_config();
    session.verbose = true;
    session.categories = vec![profile.to_string()];

    println!(
        "{GREEN}[autoyes] wrapping '{}' with profile: {GENERIC}, {profile}{RESET}",
        real.join(" ")
    );
    run_session(SessionBuilder::new(real).config(session).registry(registry.clone())).await
}

/// Real argv for a wrapped tool: the part after `--` if present, otherwise
/// the profile's binary followed by `args`.
fn wrap_command(registry: &CategoryRegistry, profile: &str, args: &[String]) -> Vec<String> {
    if let Some(pos) = args.iter().position(|arg| arg == "--") {
        let explicit = args[pos + 1..].to_vec();
        if !explicit.is_empty() {
            return explicit;
        }
    }
    let mut real = registry.command_for(profile);
    real.extend(args.iter().filter(|arg| *arg != "--").cloned());
    real
}

fn strip_separator(mut command: Vec<String>) -> Vec<String> {
    if command.first().is_some_and(|arg| arg == "--") {
        command.remove(0);
    }
    command
}

fn cmd_list(registry: &CategoryRegistry) {
    println!("{:<12} {:<16} {:<35} {:>8}", "PROFILE", "COMMAND", "DESCRIPTION", "PATTERNS");
    println!("{}", "-".repeat(74));
    for category in registry.categories() {
        let (command, description) = if category.name == GENERIC {
            ("-".to_string(), format!("{} (always loaded)", category.description))
        } else {
            (category.binary().join(" "), category.description.clone())
        };
        println!(
            "{:<12} {:<16} {:<35} {:>8}",
            category.name,
            command,
            description,
            category.patterns.len()
        );
    }
    println!();
    println!(
        "{} profiles, {} patterns",
        registry.names().count(),
        registry.pattern_count()
    );
    println!("tip: `autoyes <profile> [ARGS...]` wraps a tool, e.g. `autoyes claude`");
}

fn cmd_patterns(requested: &[String]) -> i32 {
    let config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    let registry = CategoryRegistry::builtin();
    let names: Vec<String> = if requested.is_empty() {
        registry.names().map(str::to_string).collect()
    } else {
        requested.to_vec()
    };

    for name in &names {
        let Some(category) = registry.get(name) else {
            eprintln!("autoyes: unknown category '{name}'");
            continue;
        };
        println!(
            "[{}] {} ({})",
            category.name,
            category.description,
            category.patterns.len()
        );
        for entry in &category.patterns {
            let response = entry.response.as_deref().unwrap_or(&config.response);
            println!("  {} -> '{}'", entry.source, response);
        }
        println!();
    }

    println!("[custom] user-defined ({})", config.custom_patterns.len());
    for source in &config.custom_patterns {
        println!("  {} -> '{}'", source, config.response);
    }
    0
}

fn cmd_add_pattern(pattern: &str) -> i32 {
    if let Err(err) = CompiledPattern::new(pattern, None) {
        eprintln!("autoyes: {err}");
        return 1;
    }
    let mut config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    if config.add_pattern(pattern) {
        if let Err(err) = config.save() {
            eprintln!("autoyes: {err}");
            return 1;
        }
        println!("added pattern: {pattern}");
    } else {
        println!("pattern already present: {pattern}");
    }
    0
}

fn cmd_del_pattern(pattern: &str) -> i32 {
    let mut config = match load_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    if !config.remove_pattern(pattern) {
        println!("pattern not found: {pattern}");
        return 1;
    }
    if let Err(err) = config.save() {
        eprintln!("autoyes: {err}");
        return 1;
    }
    println!("removed pattern: {pattern}");
    0
}
