mod activate;
mod commands;
mod error;
mod exec;
mod inspect;
mod keys;
mod logging;
mod models;
mod planner;
mod push;
mod settings;
mod ssh_config;
mod tui;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::Context;
use push::PushStrategy;
use settings::Paths;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "gitsw",
    about = "Switch between GitHub SSH identities before running git",
    version
)]
struct Cli {
    /// Account handle to use instead of the active one
    #[arg(short = 'a', long, global = true)]
    account: Option<String>,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Config file location
    #[arg(long, global = true, env = "GITSW_CONFIG")]
    config: Option<PathBuf>,

    /// SSH directory holding keys and the client config
    #[arg(long, global = true, env = "GITSW_SSH_DIR")]
    ssh_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new identity
    Add,
    /// List identities
    List,
    /// Make an identity active (global git user + SSH routing)
    Use {
        /// Account handle (interactive selection when omitted)
        handle: Option<String>,
    },
    /// Remove an identity
    Remove {
        /// Account handle (interactive selection when omitted)
        handle: Option<String>,
        /// Delete the key files if gitsw generated them
        #[arg(long)]
        delete_key: bool,
    },
    /// Show repository state and branch comparison
    Status,
    /// Push the current branch
    Push {
        /// Strategy to run without asking
        #[arg(short, long, value_enum)]
        strategy: Option<PushStrategy>,
    },
    /// Check that the identity's key authenticates with GitHub
    Test,
    /// Run any git command as an identity
    #[command(trailing_var_arg = true)]
    Git {
        /// Arguments passed to git (e.g. clone, push, pull ...)
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> error::Result<u8> {
    utils::check_git_installed()?;
    let paths = Paths::resolve(cli.config, cli.ssh_dir)?;
    let mut ctx = Context::load(paths, std::env::current_dir()?)?;

    // Git-driving commands honour -a by running as that identity.
    let executor = |ctx: &Context| match &cli.account {
        Some(handle) => ctx.executor_for(handle),
        None => {
            ctx.require_active()?;
            ctx.executor()
        }
    };

    match cli.command {
        None => commands::menu::run(&mut ctx, cli.account.as_deref())?,
        Some(Commands::Add) => commands::add::run(&mut ctx)?,
        Some(Commands::List) => commands::list::run(&ctx)?,
        Some(Commands::Use { handle }) => commands::switch::run(&mut ctx, handle.or(cli.account.clone()))?,
        Some(Commands::Remove { handle, delete_key }) => {
            commands::remove::run(&mut ctx, handle, delete_key.then_some(true))?
        }
        Some(Commands::Status) => {
            let git = ctx.executor().unwrap_or_else(|_| exec::Executor::new(&ctx.cwd, None));
            commands::status::run(&ctx, &git)?
        }
        Some(Commands::Push { strategy }) => {
            let git = executor(&ctx)?;
            commands::push::run(&ctx, &git, strategy)?
        }
        Some(Commands::Test) => commands::connection::run(&ctx, cli.account.clone())?,
        Some(Commands::Git { args }) => {
            let code = commands::git::run(&ctx, cli.account.clone(), args)?;
            return Ok(u8::try_from(code).unwrap_or(1));
        }
    }
    Ok(0)
}
