mod allocator;
mod cli;
mod db;
mod dedup;
mod error;
mod fmt;
mod importer;
mod models;
mod reconcile;
mod settings;
mod statement;
mod suggest;

use clap::Parser;

use cli::{Cli, Commands, GoalsCommands, ReconcileCommands};

fn main() {
    let cli = Cli::parse();
    let db = cli.db.as_deref();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import { file } => cli::import::run(&file, db),
        Commands::Suggest { description } => cli::suggest::run(&description, db),
        Commands::Promote {
            id,
            income,
            category,
            subcategory,
        } => cli::promote::run(id, income, category.as_deref(), subcategory.as_deref(), db),
        Commands::Reconcile { command } => match command {
            ReconcileCommands::Set { id, off } => cli::reconcile::set(id, off, db),
            ReconcileCommands::Status { month } => cli::reconcile::status(month.as_deref(), db),
            ReconcileCommands::Link { id, expense, income } => {
                cli::reconcile::link(id, expense, income, db)
            }
            ReconcileCommands::Unlink { id } => cli::reconcile::unlink(id, db),
        },
        Commands::Comment { id, text } => cli::reconcile::comment(id, &text, db),
        Commands::Goals { command } => match command {
            GoalsCommands::Add {
                name,
                target,
                priority,
                target_date,
                notes,
            } => cli::goals::add(&name, target, priority, target_date.as_deref(), notes.as_deref(), db),
            GoalsCommands::List { all } => cli::goals::list(all, db),
            GoalsCommands::Complete { id } => cli::goals::complete(id, db),
            GoalsCommands::Retire { id } => cli::goals::retire(id, db),
        },
        Commands::Allocate {
            month,
            leftover,
            commit,
        } => cli::allocate::run(&month, leftover, commit, db),
        Commands::Purge { yes } => cli::purge::run(yes, db),
        Commands::Status => cli::status::run(db),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
