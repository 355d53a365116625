use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use research::ai::OpenAiClient;
use research::fetch::{BatchFetchCoordinator, BrowserFetcher, FetcherExt};
use research::services::{InsightExtractionService, LinkProposalService};
use research::types::config::{FetchConfig, PromptBudget, RetryConfig};
use research::types::report::PipelineOutcome;
use research::{ReportStore, ResearchPipeline, ResearchRequest};

/// Two-stage AI investment research: link proposal, then browser-backed
/// insight extraction.
#[derive(Parser, Debug)]
#[command(name = "research", version, about)]
struct Args {
    /// Company to research
    #[arg(long)]
    company: String,

    /// General investment analysis objective
    #[arg(long)]
    objective: String,

    /// Research angle under the objective; pass exactly four times
    #[arg(long = "sub-objective", short = 's', num_args = 1)]
    sub_objectives: Vec<String>,

    /// Directory for stage report snapshots
    #[arg(long, default_value = "research_outputs")]
    output_dir: String,

    /// Maximum concurrent page fetches
    #[arg(long, default_value_t = 5)]
    concurrency: usize,

    /// Page fetches admitted per second
    #[arg(long, default_value_t = 2)]
    fetch_rate: u32,

    /// Page navigation timeout in seconds
    #[arg(long, default_value_t = 30)]
    nav_timeout: u64,

    /// Model for stage-1 link proposal
    #[arg(long, default_value = "gpt-4o-mini")]
    link_model: String,

    /// Model for stage-2 insight extraction
    #[arg(long, default_value = "gpt-4o")]
    insight_model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let request = ResearchRequest::new(&args.company, &args.objective, args.sub_objectives)
        .context("invalid research request")?;

    // Missing credentials are the one fatal startup error
    let ai = OpenAiClient::from_env().context("AI credentials not configured")?;
    let link_ai = ai.clone().with_model(args.link_model.as_str());
    let insight_ai = ai.with_model(args.insight_model.as_str());

    let fetch_config = FetchConfig::new()
        .with_navigation_timeout(std::time::Duration::from_secs(args.nav_timeout));
    let fetcher = BrowserFetcher::with_config(fetch_config).rate_limited(args.fetch_rate);
    let pipeline = ResearchPipeline::with_components(
        LinkProposalService::with_retry(link_ai, RetryConfig::default()),
        InsightExtractionService::with_config(
            insight_ai,
            RetryConfig::default(),
            PromptBudget::default(),
        ),
        BatchFetchCoordinator::with_concurrency(fetcher, args.concurrency),
        ReportStore::new(&args.output_dir),
    );

    println!(
        "{} {}",
        "Researching".bright_cyan().bold(),
        request.company_name.bold()
    );
    println!("  objective: {}", request.general_objective);
    for sub in &request.sub_objectives {
        println!("  - {sub}");
    }
    println!();

    let outcome = pipeline.run(&request).await?;
    print_summary(&outcome, &args.output_dir);

    Ok(())
}

fn print_summary(outcome: &PipelineOutcome, output_dir: &str) {
    let layer1 = &outcome.layer1;
    println!(
        "{} {}/{} sub-objectives with links proposed",
        "Stage 1:".bright_green().bold(),
        layer1.successful,
        layer1.total_sub_objectives
    );
    for failed in &layer1.failed_objectives {
        println!("  {} {failed}", "failed:".red());
    }

    match &outcome.layer2 {
        Some(layer2) => {
            println!(
                "{} {}/{} sub-objectives analyzed",
                "Stage 2:".bright_green().bold(),
                layer2.successful,
                layer2.total_sub_objectives
            );
            for failed in &layer2.failed_sub_objectives {
                println!("  {} {failed}", "failed:".red());
            }
            for analysis in &layer2.analysis_results {
                println!(
                    "  {} {} pieces from {} sources",
                    analysis.sub_objective.bold(),
                    analysis.information_pieces.len(),
                    analysis.scraped_sources_count
                );
            }
        }
        None => println!(
            "{} stage 2 failed; stage-1 results were kept",
            "Stage 2:".red().bold()
        ),
    }

    println!();
    println!("Reports written to {}", output_dir.bold());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_stage_gets_its_own_default_model() {
        let args = Args::try_parse_from([
            "research",
            "--company",
            "Acme Corp",
            "--objective",
            "Market & Competition",
            "-s",
            "TAM",
            "-s",
            "Competitors",
            "-s",
            "Pricing",
            "-s",
            "Adoption",
        ])
        .unwrap();

        assert_eq!(args.link_model, "gpt-4o-mini");
        assert_eq!(args.insight_model, "gpt-4o");
    }

    #[test]
    fn test_model_overrides_parse_independently() {
        let args = Args::try_parse_from([
            "research",
            "--company",
            "Acme",
            "--objective",
            "Market",
            "-s",
            "a",
            "-s",
            "b",
            "-s",
            "c",
            "-s",
            "d",
            "--insight-model",
            "gpt-4-turbo",
        ])
        .unwrap();

        assert_eq!(args.link_model, "gpt-4o-mini");
        assert_eq!(args.insight_model, "gpt-4-turbo");
    }
}
