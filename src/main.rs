use stargazer_insights::{
    logging,
    orchestrator::{self, Pipeline},
    ui, Config,
};
use clap::{Args, Parser, Subcommand};
use colored::*;
use log::error;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List, enrich and categorize the stargazers of REPO_URL, then export CSV files
    Run {
        /// Recompute every stage instead of reusing saved snapshots
        #[arg(long)]
        fresh: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Render the word cloud and pie chart from a previous run's CSV files
    Visualize {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML file overriding the default configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> stargazer_insights::Result<Config> {
        Config::load(self.config.as_deref())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = logging::parse_log_level(&cli.log_level);
    if let Err(e) = logging::init(&level.to_string()) {
        eprintln!("{} {}", "[WARNING]".bright_yellow(), e);
    }

    if let Err(e) = execute(cli.command).await {
        error!("{}", e);
        ui::print_error(&e.to_string());
        process::exit(1);
    }
}

async fn execute(command: Command) -> stargazer_insights::Result<()> {
    match command {
        Command::Run { fresh, config } => {
            let pipeline = Pipeline::new(config.load()?, fresh)?;
            let summary = pipeline.run().await?;

            ui::print_success(&format!(
                "Analysed {} stargazers ({} with details, {} lookups failed)",
                summary.stargazers, summary.details_found, summary.details_failed
            ));
            ui::print_info(&format!("Extracted insights: {}", summary.extracted_csv.display()));
            ui::print_info(&format!("Categorized insights: {}", summary.categorized_csv.display()));
        }
        Command::Visualize { config } => {
            let paths = orchestrator::visualize(&config.load()?)?;
            ui::print_success("Charts saved");
            ui::print_info(&format!("Word cloud: {}", paths.wordcloud.display()));
            ui::print_info(&format!("Pie chart: {}", paths.pie_chart.display()));
        }
    }
    Ok(())
}
