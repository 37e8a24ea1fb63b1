use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-deps")]
#[command(about = "Extract the class-level dependency model of a compiled Java archive")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "FILE", global = true)]
    pub db: Option<PathBuf>,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Analyze {
        archive: PathBuf,

        #[arg(short = 'n', long, value_name = "PREFIX")]
        namespace: Option<String>,

        #[arg(long)]
        save: bool,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    Show {
        project_id: String,

        #[arg(long, value_enum, default_value_t = ModelPart::All)]
        part: ModelPart,
    },
    List,
    Stats,
    Clear,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ModelPart {
    All,
    Internal,
    External,
    Classes,
}
