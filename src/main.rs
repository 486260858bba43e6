use clap::{Arg, ArgAction, Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use gwtree::Result;
use gwtree::commands::{create, list, remove};
use gwtree::config::GwtreeConfig;
use gwtree::error::GwtreeError;
use gwtree::ui;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GWTREE_LOG";

#[derive(Parser)]
#[command(name = "gwtree")]
#[command(about = "Git worktree manager for parallel development")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new git worktree (default)
    Create,
    /// List all git worktrees
    #[command(visible_alias = "ls")]
    List,
    /// Remove a git worktree
    #[command(visible_alias = "rm")]
    Remove,
}

/// `-v/--version` instead of clap's `-V`
fn cli_command() -> Command {
    Cli::command().disable_version_flag(true).arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .action(ArgAction::Version)
            .help("Output the version number"),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Shown for --help and --version too
    ui::banner();

    let matches = cli_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    init_tracing();

    let result = match cli.command.unwrap_or(Commands::Create) {
        Commands::Create => {
            let config = GwtreeConfig::discover(&std::env::current_dir()?);
            create::create_worktree(&config)
        }
        Commands::List => list::list_worktrees(),
        Commands::Remove => remove::remove_worktree(),
    };

    match result {
        Ok(_) => Ok(()),
        Err(e) => match e.downcast_ref::<GwtreeError>() {
            Some(GwtreeError::NotAGitRepository { .. }) => {
                ui::cancel("Error: Not in a git repository");
                std::process::exit(1);
            }
            Some(err @ GwtreeError::DirectoryExists { .. }) => {
                ui::cancel(&err.to_string());
                std::process::exit(1);
            }
            _ => Err(e),
        },
    }
}
