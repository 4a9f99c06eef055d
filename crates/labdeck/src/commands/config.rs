use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::progress::DEFAULT_EXPERIMENT_ID;

pub fn run(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> anyhow::Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("  {}", "(not created yet, showing defaults)".dimmed());
    }
    println!();

    let row = |key: &str, value: Option<String>, fallback: &str| match value {
        Some(v) => println!("  {:<22} {}", key.cyan(), v),
        None => println!("  {:<22} {}", key.cyan(), format!("{fallback} (default)").dimmed()),
    };
    row("defaults.theme", config.theme().map(str::to_string), "light");
    row(
        "defaults.pen_color",
        config.pen_color().map(str::to_string),
        "#000000",
    );
    row(
        "defaults.experiment",
        config.experiment().map(str::to_string),
        DEFAULT_EXPERIMENT_ID,
    );
    row(
        "defaults.export_dir",
        config.export_dir().map(|p| p.display().to_string()),
        ".",
    );
    Ok(())
}

fn set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "Set".green().bold());
    println!("  {}", path.display().to_string().dimmed());
    Ok(())
}
