use crate::engine::build_client;
use crate::engine::federal_register::{FederalRegisterClient, DEFAULT_API_URL};
use crate::model::{parse_date, FetchConfig, FetchStrategy, Party, RunConfig};
use crate::orchestrator::{build_summary, PageInputs};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use time::Date;
use tokio::sync::mpsc;
use tracing::info;

/// Snapshot path shared by `fetch --output` and `--current`.
const DEFAULT_CURRENT_SNAPSHOT: &str = "data/trump_executive_orders.json";

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

fn parse_date_arg(s: &str) -> Result<Date, String> {
    parse_date(s).map_err(|e| e.to_string())
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "eo-pace",
    version,
    about = "Executive orders per president over the first days of a term, as a terminal race chart"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Current-term orders: a path or http(s) URL to the snapshot written by `fetch`
    #[arg(long, default_value = DEFAULT_CURRENT_SNAPSHOT)]
    pub current: String,

    /// Historical orders: a path or http(s) URL (array or {"results": [...]})
    #[arg(long, default_value = "data/past_president_executive_orders.json")]
    pub historical: String,

    /// Label used for current-term records
    #[arg(long, default_value = "Donald Trump 2nd")]
    pub current_president: String,

    /// Party of the current president
    #[arg(long, default_value = "Republican")]
    pub current_party: String,

    /// First day of the current term (YYYY-MM-DD)
    #[arg(long, default_value = "2025-01-20", value_parser = parse_date_arg)]
    pub term_start: Date,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub as_of: Option<Date>,

    /// Final day of the sweep; overrides --as-of
    #[arg(long)]
    pub days: Option<u32>,

    /// Print JSON summary and exit (no TUI)
    #[arg(long, global = true)]
    pub json: bool,

    /// Print text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Run silently: suppress all output except errors (for cron usage)
    #[arg(long)]
    pub silent: bool,

    /// Day-counter sweep duration
    #[arg(long, default_value = "5s")]
    pub duration: humantime::Duration,

    /// Time between animation frames
    #[arg(long, default_value = "33ms")]
    pub frame_interval: humantime::Duration,

    /// Delay per typed character
    #[arg(long, default_value = "30ms")]
    pub type_interval: humantime::Duration,

    /// Skip the typing effect and start the chart immediately
    #[arg(long)]
    pub skip_intro: bool,

    /// Narrative generation endpoint (POST {"prompt": ...})
    #[arg(long, default_value = "http://localhost:8000/process")]
    pub narrative_url: String,

    /// Do not request a narrative
    #[arg(long)]
    pub no_narrative: bool,

    /// Prompt template with {days}, {president} and {counts} placeholders
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Timeout applied to every HTTP request
    #[arg(long, default_value = "30s", global = true)]
    pub http_timeout: humantime::Duration,

    /// Export the final summary as JSON
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Write logs to this file (TUI mode logs nowhere otherwise)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Download executive orders from the Federal Register and save them as JSON
    Fetch {
        /// Federal Register president slug
        #[arg(long, default_value = "donald-trump")]
        president: String,

        /// Earliest signing date (YYYY-MM-DD)
        #[arg(long, default_value = "2025-01-20", value_parser = parse_date_arg)]
        from: Date,

        /// Latest signing date (YYYY-MM-DD); defaults to open-ended
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<Date>,

        /// Results per page (1-1000)
        #[arg(long, default_value_t = 1000)]
        per_page: u32,

        /// Only fetch the first page instead of following next_page_url
        #[arg(long)]
        single_page: bool,

        /// Documents endpoint
        #[arg(long, default_value = DEFAULT_API_URL)]
        api_url: String,

        /// Output file; the default is where the chart reads `--current` from
        #[arg(long, short, default_value = DEFAULT_CURRENT_SNAPSHOT)]
        output: PathBuf,
    },
}

impl Cli {
    /// Whether the animated TUI will own the terminal.
    pub fn is_tui(&self) -> bool {
        self.command.is_none() && !self.json && !self.text && !self.silent
    }
}

fn user_agent() -> String {
    format!("eo-pace/{}", env!("CARGO_PKG_VERSION"))
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<RunConfig> {
    let prompt_template = match args.prompt_file.as_deref() {
        Some(p) => Some(
            std::fs::read_to_string(p)
                .with_context(|| format!("read prompt template {}", p.display()))?,
        ),
        None => None,
    };
    Ok(RunConfig {
        current_source: args.current.clone(),
        historical_source: args.historical.clone(),
        current_president: args.current_president.clone(),
        current_party: Party::from_label(&args.current_party),
        term_start: Some(args.term_start),
        as_of: args.as_of,
        final_days_override: args.days,
        duration: Duration::from(args.duration),
        frame_interval: Duration::from(args.frame_interval),
        type_interval: Duration::from(args.type_interval),
        skip_intro: args.skip_intro,
        narrative_url: (!args.no_narrative).then(|| args.narrative_url.clone()),
        prompt_template,
        http_timeout: Duration::from(args.http_timeout),
        user_agent: user_agent(),
        export_json: args.export_json.clone(),
    })
}

pub async fn run(args: Cli) -> Result<()> {
    // Validate that --silent can only be used with --json
    if args.silent && !args.json {
        return Err(anyhow::anyhow!(
            "--silent can only be used with --json. Use --silent --json together."
        ));
    }

    if let Some(Command::Fetch { .. }) = &args.command {
        return run_fetch(&args).await;
    }

    if args.is_tui() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_text(args).await;
        }
    }

    if args.json {
        return run_json(args).await;
    }

    run_text(args).await
}

async fn run_fetch(args: &Cli) -> Result<()> {
    let Some(Command::Fetch {
        president,
        from,
        to,
        per_page,
        single_page,
        api_url,
        output,
    }) = args.command.clone()
    else {
        return Ok(());
    };
    let cfg = FetchConfig {
        api_url,
        president_slug: president,
        signed_from: Some(from),
        signed_to: to,
        per_page,
        strategy: if single_page {
            FetchStrategy::SinglePage
        } else {
            FetchStrategy::Paginated
        },
        http_timeout: Duration::from(args.http_timeout),
        user_agent: user_agent(),
    };
    cfg.validate().context("invalid fetch options")?;

    info!("fetching data from the Federal Register");
    let client = build_client(&cfg.user_agent, cfg.http_timeout)?;
    let outcome = FederalRegisterClient::new(client)
        .fetch(&cfg)
        .await
        .context("fetching executive orders failed")?;

    crate::storage::write_snapshot(&output, &outcome.snapshot)?;

    if args.json {
        let report = serde_json::json!({
            "output": output,
            "orders": outcome.snapshot.count,
            "pages": outcome.pages,
            "reported_count": outcome.reported_count,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!(
            "Fetched {} executive orders ({} page(s)); saved to {}",
            outcome.snapshot.count,
            outcome.pages,
            output.display()
        );
    }
    Ok(())
}

/// Resolve inputs and the narrative without animating.
async fn final_summary(args: &Cli) -> Result<crate::model::PageSummary> {
    let cfg = build_config(args)?;
    let inputs = PageInputs::prepare(cfg).await?;
    let narrative = inputs.fetch_narrative().await;
    Ok(build_summary(
        &inputs.dataset,
        inputs.final_days,
        narrative,
        false,
    ))
}

async fn run_json(args: Cli) -> Result<()> {
    let summary = final_summary(&args).await?;
    handle_exports(&args, &summary)?;
    if !args.silent {
        let (out_tx, out_handle) = spawn_output_writer();
        let out = serde_json::to_string_pretty(&summary)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
        drop(out_tx);
        let _ = out_handle.await;
    }
    Ok(())
}

async fn run_text(args: Cli) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let summary = final_summary(&args).await?;
    handle_exports(&args, &summary)?;
    if summary.undated_records > 0 {
        let _ = out_tx.send(OutputLine::Stderr(format!(
            "warning: {} record(s) had unparsable signing dates and were not counted",
            summary.undated_records
        )));
    }
    for line in crate::text_summary::build_text_summary(&summary).lines {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Handle export operations for both text and JSON modes.
fn handle_exports(args: &Cli, summary: &crate::model::PageSummary) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        crate::storage::export_json(p, summary)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn defaults_build_a_valid_config() {
        let args = Cli::parse_from(["eo-pace"]);
        let cfg = build_config(&args).unwrap();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.term_start, Some(date!(2025 - 01 - 20)));
        assert_eq!(cfg.duration, Duration::from_millis(5000));
        assert_eq!(cfg.current_party, Party::Republican);
        assert_eq!(
            cfg.narrative_url.as_deref(),
            Some("http://localhost:8000/process")
        );
        assert!(args.is_tui());
    }

    #[test]
    fn no_narrative_clears_endpoint() {
        let args = Cli::parse_from(["eo-pace", "--no-narrative", "--text", "--days", "40"]);
        let cfg = build_config(&args).unwrap();
        assert_eq!(cfg.narrative_url, None);
        assert_eq!(cfg.final_days_override, Some(40));
        assert!(!args.is_tui());
    }

    #[test]
    fn fetch_subcommand_parses_dates() {
        let args = Cli::parse_from([
            "eo-pace",
            "fetch",
            "--from",
            "2025-01-20",
            "--to",
            "2025-03-24",
            "--single-page",
        ]);
        match args.command {
            Some(Command::Fetch {
                from,
                to,
                single_page,
                ..
            }) => {
                assert_eq!(from, date!(2025 - 01 - 20));
                assert_eq!(to, Some(date!(2025 - 03 - 24)));
                assert!(single_page);
            }
            None => panic!("expected fetch"),
        }
    }

    #[test]
    fn fetch_writes_where_the_chart_reads() {
        let chart = Cli::parse_from(["eo-pace"]);
        let fetch = Cli::parse_from(["eo-pace", "fetch"]);
        match fetch.command {
            Some(Command::Fetch { output, .. }) => {
                assert_eq!(output, PathBuf::from(&chart.current));
                assert_eq!(output, PathBuf::from("data/trump_executive_orders.json"));
            }
            None => panic!("expected fetch"),
        }
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(Cli::try_parse_from(["eo-pace", "--term-start", "01/20/2025"]).is_err());
    }

    #[tokio::test]
    async fn silent_requires_json() {
        let args = Cli::parse_from(["eo-pace", "--silent"]);
        assert!(run(args).await.is_err());
    }
}
