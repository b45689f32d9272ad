use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use review_assistant::{PageRange, TemplateName};

#[derive(Debug, Parser)]
#[command(name = "review", version, about = "Collect product reviews and ask questions about them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape listing pages into the corpus CSV
    Collect(CollectArgs),

    /// Answer a single question
    Ask {
        /// Question text
        question: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Interactive question loop ("exit" or "quit" to leave)
    Chat(QueryArgs),
}

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Inclusive page range, e.g. 2-11
    #[arg(long)]
    pub pages: Option<PageRange>,

    /// Corpus CSV destination
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Milliseconds to wait between page requests
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Comma-separated column order, e.g. title,rating,review
    #[arg(long)]
    pub columns: Option<String>,

    /// Print the collection report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Corpus CSV used for retrieval
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Snippets retrieved per question
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Prompt template name
    #[arg(long)]
    pub template: Option<TemplateName>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_collect() {
        let cli = Cli::parse_from(["review", "collect", "--pages", "2-3", "--delay-ms", "500", "--json"]);
        let Command::Collect(args) = cli.command else {
            panic!("expected collect");
        };
        assert_eq!(args.pages, Some(PageRange::new(2, 3).unwrap()));
        assert_eq!(args.delay_ms, Some(500));
        assert!(args.json);
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from(["review", "ask", "best earbuds?", "--top-k", "3"]);
        let Command::Ask { question, query } = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(question, "best earbuds?");
        assert_eq!(query.top_k, Some(3));
    }
}
