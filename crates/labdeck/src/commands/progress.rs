use colored::Colorize;

use crate::cli::ProgressCommands;
use crate::progress::{self, FileStore, ProgressStore, STORAGE_KEY};

pub fn run(command: ProgressCommands) -> anyhow::Result<()> {
    let mut store = FileStore::open_default()?;
    match command {
        ProgressCommands::Show => show(&store),
        ProgressCommands::Clear => {
            store.remove(STORAGE_KEY)?;
            println!("{} saved progress", "Cleared".green().bold());
            Ok(())
        }
    }
}

fn show(store: &FileStore) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "Progress file:".bold(),
        store.entry_path(STORAGE_KEY).display()
    );
    match progress::load(store)? {
        Some(snapshot) => {
            println!("  {:<12} {}", "experiment".cyan(), snapshot.experiment_id);
            println!("  {:<12} {}", "slide".cyan(), snapshot.current_slide + 1);
            println!("  {:<12} {}", "saved at".cyan(), snapshot.timestamp);
        }
        None => println!("  {}", "(no saved progress)".dimmed()),
    }
    Ok(())
}
