use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "labdeck")]
#[command(author, version, about)]
#[command(long_about = "Present experiment slide decks written in markdown.\n\n\
    Step through slides and their points, annotate over them, search the\n\
    code and explanations, and capture the annotated page as PNG or PDF.\n\n\
    Examples:\n  \
    labdeck limits.md                 Launch presentation (fullscreen)\n  \
    labdeck limits.md --windowed      Launch in a window\n  \
    labdeck limits.md --exp exp2      Track progress under experiment exp2\n  \
    labdeck export limits.md -f pdf   Write every slide into one PDF")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown deck to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed); skips progress restore
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Experiment id for progress tracking (default: config, then exp1)
    #[arg(long, global = false)]
    pub exp: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Export every slide, fully revealed, as PNG images or one PDF
    Export {
        /// Markdown deck to export
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "export")]
        output_dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Png)]
        format: ExportFormat,

        /// Export width in pixels
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Export height in pixels
        #[arg(long, default_value = "1080")]
        height: u32,
    },

    /// Inspect or clear saved slide progress
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.pen_color, defaults.experiment)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Print the saved progress entry
    Show,

    /// Delete the saved progress entry
    Clear,
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Export {
                file,
                output_dir,
                format,
                width,
                height,
            }) => {
                if !file.exists() {
                    anyhow::bail!("File not found: {}", file.display());
                }
                crate::commands::export::run(file, output_dir, format, width, height)
            }
            Some(Commands::Progress { command }) => crate::commands::progress::run(command),
            Some(Commands::Version) => {
                println!("labdeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(file, self.windowed, self.slide, self.exp)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
