use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use tracing::{info, warn};

use review_assistant::ai::OpenAICompletion;
use review_assistant::{
    CollectionConfig, CollectionReport, Column, CorpusBuilder, CorpusRetriever,
    ExtractorSelectors, HttpFetcherConfig, HttpPageFetcher, QueryConfig, QueryPipeline,
    RecordExtractor,
};

use crate::cli::{CollectArgs, QueryArgs};
use crate::config::Config;

pub async fn collect(config: &Config, args: CollectArgs) -> Result<()> {
    let fetcher = HttpPageFetcher::new(
        HttpFetcherConfig::new(&config.search_url_template).with_timeout(config.fetch_timeout),
    )
    .context("Failed to create page fetcher")?;
    let extractor = RecordExtractor::new(&ExtractorSelectors::default())
        .context("Failed to compile extractor selectors")?;

    let columns = match args.columns.as_deref() {
        Some(list) => Column::parse_list(list).context("Invalid --columns")?,
        None => Column::DEFAULT_ORDER.to_vec(),
    };
    let delay = args
        .delay_ms
        .map(std::time::Duration::from_millis)
        .unwrap_or(config.page_delay);

    let collection_config = CollectionConfig::new(
        args.pages.unwrap_or(config.page_range),
        args.output.unwrap_or_else(|| config.output_path.clone()),
    )
    .with_columns(columns)
    .with_delay(delay);

    info!(
        pages = %collection_config.page_range,
        output = %collection_config.output_path.display(),
        "Starting collection"
    );

    let collection = CorpusBuilder::new(fetcher, extractor)
        .build(&collection_config)
        .await
        .with_context(|| {
            format!(
                "Failed to write corpus to {}",
                collection_config.output_path.display()
            )
        })?;

    if !collection.report.is_success() {
        warn!(
            failed_pages = ?collection.report.failed_pages(),
            "Collection finished with page failures"
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&collection.report)?);
    } else {
        print_report(&collection.report, &collection_config);
    }

    Ok(())
}

fn print_report(report: &CollectionReport, config: &CollectionConfig) {
    println!();
    println!(
        "{} {} records from {}/{} pages",
        "Collected".bright_green().bold(),
        report.records_collected,
        report.pages_succeeded,
        report.pages_attempted
    );
    println!("  {} {}", "Output:".dimmed(), config.output_path.display());

    for failure in &report.failures {
        println!(
            "  {} page {}: {}",
            "failed".red(),
            failure.page,
            failure.reason
        );
    }
    for warning in &report.warnings {
        println!(
            "  {} page {}: kept {} of {} records",
            "warning".yellow(),
            warning.page,
            warning.mismatch.kept(),
            warning.mismatch.largest()
        );
    }
}

fn pipeline(config: &Config, args: &QueryArgs) -> Result<QueryPipeline<CorpusRetriever, OpenAICompletion>> {
    let corpus_path = args.corpus.clone().unwrap_or_else(|| config.corpus_path.clone());
    let retriever = CorpusRetriever::from_path(
        &corpus_path,
        args.top_k.unwrap_or(config.retriever_top_k),
    )
    .with_context(|| format!("Failed to load corpus from {}", corpus_path.display()))?;

    let completion = OpenAICompletion::new(config.require_api_key()?)
        .with_model(&config.openai_model)
        .with_base_url(&config.openai_base_url);

    let query_config = QueryConfig::new()
        .with_template(args.template.unwrap_or(config.template))
        .with_stage_timeout(config.query_timeout);

    Ok(QueryPipeline::new(retriever, completion).with_config(&query_config))
}

pub async fn ask(config: &Config, question: &str, args: QueryArgs) -> Result<()> {
    let pipeline = pipeline(config, &args)?;
    info!(model = %config.openai_model, "Answering question");
    println!("{}", pipeline.respond(question).await);
    Ok(())
}

pub async fn chat(config: &Config, args: QueryArgs) -> Result<()> {
    let pipeline = pipeline(config, &args)?;
    info!(model = %config.openai_model, "Starting chat session");

    println!(
        "{}",
        "Ask about the collected products. Type 'exit' to leave.".bright_cyan()
    );

    loop {
        let line = tokio::task::spawn_blocking(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("You")
                .interact_text()
        })
        .await
        .context("Prompt task panicked")??;

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "exit" | "quit") {
            println!("{}", "Goodbye!".bright_blue());
            break;
        }

        println!("{} {}", "Bot:".bright_green().bold(), pipeline.respond(question).await);
    }

    Ok(())
}
