mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::add::AddOptions;
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_REGISTRY_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "dskit",
    version,
    about = "Install design-system components from a remote registry into your project"
)]
struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Registry base URL (overrides DSKIT_REGISTRY_URL and the config file).
    #[arg(long, global = true)]
    registry: Option<String>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write components.json and set up the component and utils directories.
    Init {
        /// Skip prompts and use the default configuration.
        #[arg(short, long, default_value_t = false)]
        yes: bool,
        /// Overwrite an existing components.json without asking.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Add components and their registry dependencies to the project.
    Add {
        /// Component names to install.
        names: Vec<String>,
        /// Install every component in the registry.
        #[arg(short, long, default_value_t = false, conflicts_with = "names")]
        all: bool,
        /// Skip selection and confirmation prompts.
        #[arg(short, long, default_value_t = false)]
        yes: bool,
        /// Do not run the package manager for npm dependencies.
        #[arg(long, default_value_t = false)]
        skip_deps: bool,
    },
    /// List the components available in the registry.
    List,
    /// Regenerate registry.json from components/<name>/config.json files.
    SyncRegistry {
        /// Registry directory.
        #[arg(default_value = "registry")]
        dir: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("config error:") {
        EXIT_CONFIG_ERROR
    } else if msg.starts_with("registry error:") {
        EXIT_REGISTRY_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("DSKIT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let root = match cli.cwd {
        Some(dir) => dir,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("error: cannot determine current directory: {e}");
                return ExitCode::from(EXIT_FAILURE);
            }
        },
    };
    let registry = cli.registry.as_deref();
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Init { yes, force } => commands::init::run(&root, yes, force, json_output),
        Commands::Add {
            names,
            all,
            yes,
            skip_deps,
        } => commands::add::run(
            &root,
            registry,
            &names,
            AddOptions {
                all,
                yes,
                skip_deps,
            },
            json_output,
        ),
        Commands::List => commands::list::run(&root, registry, json_output),
        Commands::SyncRegistry { dir } => commands::sync_registry::run(&dir, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}
