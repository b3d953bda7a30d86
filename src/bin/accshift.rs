use std::path::PathBuf;
use std::process;

use accshift_core::common::config::{Config, config_file, data_dir};
use accshift_core::common::log;
use accshift_core::model::{AccountId, FolderId, Platform};
use accshift_core::organizer::{FileBlobStore, Organizer};
use clap::{Parser, Subcommand};

/// Inspect and organize the account folders used by the switcher.
#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the persisted store (overrides default).
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the configuration and the persisted store for problems.
    Validate,
    /// Print a platform's folder hierarchy.
    Tree { platform: String },
    /// Reconcile a platform against the account ids that actually exist.
    Sync { platform: String, accounts: Vec<String> },
    /// Create a folder and print its id.
    Create {
        platform: String,
        name: String,

        /// Parent folder id; omitted means the platform root.
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
    },
    /// Rename a folder.
    Rename { id: String, name: String },
    /// Delete a folder, dissolving its contents into its parent.
    Delete { id: String },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() {
    let opt = Cli::parse();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging();
    install_panic_hook();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let config = if config_path.exists() {
        Config::read(&config_path).unwrap()
    } else {
        Config::default()
    };

    let store_dir = opt.data_dir.clone().unwrap_or_else(data_dir);
    let mut organizer = Organizer::load(FileBlobStore::new(store_dir));

    match opt.command {
        Commands::Validate => {
            let mut issues = config.validate();
            issues.extend(organizer.store().validate());
            if issues.is_empty() {
                println!("Validation passed");
            } else {
                for issue in issues {
                    eprintln!("{}", issue);
                }
                process::exit(1);
            }
        }
        Commands::Tree { platform } => {
            print!("{}", organizer.draw_tree(&Platform::new(platform)));
        }
        Commands::Sync { platform, accounts } => {
            let accounts: Vec<AccountId> = accounts.into_iter().map(AccountId::new).collect();
            organizer.sync_accounts(&Platform::new(platform), &accounts);
        }
        Commands::Create { platform, name, parent } => {
            let parent = parent.map(FolderId::new);
            let folder = organizer.create_folder(&Platform::new(platform), &name, parent.as_ref());
            println!("{}", folder.id);
        }
        Commands::Rename { id, name } => {
            let id = FolderId::new(id);
            if organizer.get_folder(&id).is_none() {
                eprintln!("no folder with id '{}'", id);
                process::exit(1);
            }
            organizer.rename_folder(&id, &name);
        }
        Commands::Delete { id } => {
            let id = FolderId::new(id);
            if organizer.get_folder(&id).is_none() {
                eprintln!("no folder with id '{}'", id);
                process::exit(1);
            }
            organizer.delete_folder(&id);
        }
        Commands::Config => {
            print!("{}", config.to_toml().unwrap());
        }
    }
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of propagating panics to the main thread.
    // See Cargo.toml for why we don't use panic=abort everywhere.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
