#![deny(missing_docs)]
//! Ticket readiness command-line interface.
//!
//! Scores Jira tickets for estimation readiness, lists grooming candidates
//! and triages blocked tickets.

mod tracker;

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};
use readiness_core::{
    Analyzer, BlockedQuery, BlockedTicket, GroomingQuery, ReadinessReport, ScoringProfile, Ticket,
    render_blocked, render_candidates, render_json, render_text_batch,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracker::{JiraArgs, JiraClient, TrackerClient, normalize_issue_key};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_CONCURRENCY: usize = 5;
const DEFAULT_SEARCH_LIMIT: usize = 50;
const DEFAULT_BLOCKED_LIMIT: usize = 100;

#[derive(Parser)]
#[command(name = "readiness", version, about = "Ticket readiness analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum ProfileName {
    Standard,
    Fsec,
}

impl ProfileName {
    fn as_str(&self) -> &'static str {
        match self {
            ProfileName::Standard => readiness_core::STANDARD_PROFILE,
            ProfileName::Fsec => readiness_core::FSEC_PROFILE,
        }
    }
}

#[derive(Args, Clone, Debug)]
struct ProfileArgs {
    /// Built-in scoring profile.
    #[arg(long, value_enum, default_value_t = ProfileName::Standard)]
    profile: ProfileName,
    /// JSON profile file; overrides --profile.
    #[arg(long)]
    profile_file: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
    /// Include clarifying questions and actions for each gap.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Clone, Debug)]
struct AnalyzeArgs {
    /// Issue keys to analyze; bare numbers use the default project.
    #[arg(required_unless_present = "ticket_file")]
    keys: Vec<String>,
    /// Analyze ticket snapshots from a JSON file instead of Jira.
    #[arg(long)]
    ticket_file: Option<PathBuf>,
    /// Maximum number of concurrent fetches.
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    #[command(flatten)]
    profile: ProfileArgs,
    #[command(flatten)]
    output: OutputArgs,
    #[command(flatten)]
    jira: JiraArgs,
}

#[derive(Args, Clone, Debug)]
struct CandidatesArgs {
    /// Project key.
    #[arg(short, long)]
    project: Option<String>,
    /// Filter by status (disables the board filter).
    #[arg(short, long)]
    status: Option<String>,
    /// Filter by label.
    #[arg(short, long)]
    label: Option<String>,
    /// Only tickets without story points.
    #[arg(short, long)]
    unestimated: bool,
    /// Filter by issue type (disables the board filter).
    #[arg(short = 't', long)]
    issue_type: Option<String>,
    /// Raw JQL; overrides every other filter.
    #[arg(long)]
    jql: Option<String>,
    /// Build a custom filter even for the board project.
    #[arg(long)]
    no_board_filter: bool,
    /// Maximum number of results.
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,
    /// Run a readiness analysis on every candidate.
    #[arg(long)]
    analyze: bool,
    /// Maximum number of concurrent analyses.
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
    #[command(flatten)]
    profile: ProfileArgs,
    #[command(flatten)]
    output: OutputArgs,
    #[command(flatten)]
    jira: JiraArgs,
}

impl CandidatesArgs {
    fn query(&self) -> GroomingQuery {
        GroomingQuery {
            project: self.project.clone(),
            status: self.status.clone(),
            label: self.label.clone(),
            unestimated: self.unestimated,
            issue_type: self.issue_type.clone(),
            jql: self.jql.clone(),
            board_filter: !self.no_board_filter,
        }
    }
}

#[derive(Args, Clone, Debug)]
struct BlockedArgs {
    /// Project key; defaults to the Jira default project.
    #[arg(short, long)]
    project: Option<String>,
    /// Only tickets created at least this many days ago.
    #[arg(long, default_value_t = 0)]
    min_age_days: u32,
    /// Attach a readiness score to every blocked ticket.
    #[arg(short, long)]
    detailed: bool,
    /// Maximum number of results.
    #[arg(long, default_value_t = DEFAULT_BLOCKED_LIMIT)]
    limit: usize,
    #[command(flatten)]
    profile: ProfileArgs,
    #[command(flatten)]
    output: OutputArgs,
    #[command(flatten)]
    jira: JiraArgs,
}

impl BlockedArgs {
    fn query(&self) -> BlockedQuery {
        BlockedQuery {
            project: self
                .project
                .clone()
                .unwrap_or_else(|| self.jira.default_project.clone()),
            min_age_days: self.min_age_days,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score one or more tickets for estimation readiness.
    Analyze(AnalyzeArgs),
    /// List tickets that need grooming.
    Candidates(CandidatesArgs),
    /// Explain why blocked tickets are blocked.
    Blocked(BlockedArgs),
    /// Print the effective scoring profile as JSON.
    Profile(ProfileArgs),
}

/// Process outcome, mapped to the exit code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Verdict {
    Ready,
    NotReady,
    Failed,
}

impl Verdict {
    fn code(self) -> u8 {
        match self {
            Verdict::Ready => 0,
            Verdict::NotReady => 1,
            Verdict::Failed => 2,
        }
    }

    fn from_reports(reports: &[ReadinessReport], failures: usize) -> Self {
        if failures > 0 {
            Verdict::Failed
        } else if reports.iter().all(|report| report.ready_for_estimation) {
            Verdict::Ready
        } else {
            Verdict::NotReady
        }
    }
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let verdict = match cli.command {
        Commands::Analyze(args) => run_analyze(args).await,
        Commands::Candidates(args) => run_candidates(args).await,
        Commands::Blocked(args) => run_blocked(args).await,
        Commands::Profile(args) => run_profile(args).await,
    };
    match verdict {
        Ok(verdict) => ExitCode::from(verdict.code()),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(Verdict::Failed.code())
        }
    }
}

#[cfg(test)]
fn main() {}

#[cfg_attr(test, allow(dead_code))]
async fn run_analyze(args: AnalyzeArgs) -> CliResult<Verdict> {
    let analyzer = Arc::new(Analyzer::new(load_profile(&args.profile).await?)?);

    if let Some(path) = &args.ticket_file {
        let tickets = load_tickets(path).await?;
        let reports: Vec<_> = tickets
            .iter()
            .map(|ticket| analyzer.analyze(ticket))
            .collect();
        emit_reports(&reports, analyzer.profile(), &args.output).await?;
        return Ok(Verdict::from_reports(&reports, 0));
    }

    let keys = args
        .keys
        .iter()
        .map(|key| normalize_issue_key(key, &args.jira.default_project))
        .collect::<CliResult<Vec<_>>>()?;
    let client = Arc::new(JiraClient::from_args(&args.jira)?);
    let (reports, failures) =
        analyze_keys(client, analyzer.clone(), keys, args.concurrency).await?;
    emit_reports(&reports, analyzer.profile(), &args.output).await?;
    Ok(Verdict::from_reports(&reports, failures))
}

#[cfg_attr(test, allow(dead_code))]
async fn run_candidates(args: CandidatesArgs) -> CliResult<Verdict> {
    let client = Arc::new(JiraClient::from_args(&args.jira)?);
    let profile = if args.analyze {
        Some(load_profile(&args.profile).await?)
    } else {
        None
    };
    list_candidates(client, &args, profile).await
}

async fn list_candidates<C: TrackerClient + Send + Sync + 'static>(
    client: Arc<C>,
    args: &CandidatesArgs,
    profile: Option<ScoringProfile>,
) -> CliResult<Verdict> {
    let query = args.query();
    let jql = query.to_jql();
    if query.jql.is_none() && query.uses_board_filter() {
        info!("using the grooming board filter");
    }
    info!("JQL: {jql}");

    let issues = client.search(&jql, args.limit).await?;
    let today = Local::now().date_naive();
    let candidates: Vec<_> = issues
        .iter()
        .map(|issue| issue.to_candidate(today))
        .collect();

    let Some(profile) = profile else {
        let contents = match args.output.format {
            OutputFormat::Text => render_candidates(&candidates),
            OutputFormat::Json => render_json(&candidates)?,
        };
        emit_output(&args.output, contents).await?;
        return Ok(if candidates.is_empty() {
            Verdict::NotReady
        } else {
            Verdict::Ready
        });
    };

    let analyzer = Arc::new(Analyzer::new(profile)?);
    let keys = candidates
        .iter()
        .map(|candidate| candidate.key.clone())
        .collect();
    let (reports, failures) =
        analyze_keys(client, analyzer.clone(), keys, args.concurrency).await?;
    emit_reports(&reports, analyzer.profile(), &args.output).await?;
    Ok(Verdict::from_reports(&reports, failures))
}

#[cfg_attr(test, allow(dead_code))]
async fn run_blocked(args: BlockedArgs) -> CliResult<Verdict> {
    let client = JiraClient::from_args(&args.jira)?;
    let analyzer = if args.detailed {
        Some(Analyzer::new(load_profile(&args.profile).await?)?)
    } else {
        None
    };
    list_blocked(&client, &args, analyzer.as_ref()).await
}

async fn list_blocked<C: TrackerClient>(
    client: &C,
    args: &BlockedArgs,
    analyzer: Option<&Analyzer>,
) -> CliResult<Verdict> {
    let jql = args.query().to_jql();
    info!("JQL: {jql}");

    let issues = client.search(&jql, args.limit).await?;
    let today = Local::now().date_naive();
    let tickets: Vec<_> = issues
        .into_iter()
        .map(|issue| {
            let candidate = issue.to_candidate(today);
            let history = issue.comment_history(today);
            let ticket = issue.into_ticket();
            let mut blocked =
                BlockedTicket::new(&ticket, candidate.priority, candidate.age_days, &history);
            blocked.readiness_score = analyzer.map(|a| a.analyze(&ticket).total_score);
            blocked
        })
        .collect();

    let contents = match args.output.format {
        OutputFormat::Text => render_blocked(&tickets),
        OutputFormat::Json => render_json(&tickets)?,
    };
    emit_output(&args.output, contents).await?;
    Ok(if tickets.is_empty() {
        Verdict::NotReady
    } else {
        Verdict::Ready
    })
}

#[cfg_attr(test, allow(dead_code))]
async fn run_profile(args: ProfileArgs) -> CliResult<Verdict> {
    let profile = load_profile(&args).await?;
    println!("{}", render_json(&profile)?);
    Ok(Verdict::Ready)
}

/// Fetch and analyze tickets concurrently; reports keep input order.
async fn analyze_keys<C: TrackerClient + Send + Sync + 'static>(
    client: Arc<C>,
    analyzer: Arc<Analyzer>,
    keys: Vec<String>,
    concurrency: usize,
) -> CliResult<(Vec<ReadinessReport>, usize)> {
    let concurrency = if concurrency == 0 { 1 } else { concurrency };
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();

    for (index, key) in keys.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let client = client.clone();
        let analyzer = analyzer.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let result = client
                .fetch_issue(&key)
                .await
                .map(|issue| analyzer.analyze(&issue.into_ticket()));
            (index, key, result)
        });
    }

    let mut results = Vec::new();
    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(report))) => results.push((index, report)),
            Ok((_, key, Err(err))) => {
                error!("failed to analyze {key}: {err}");
                eprintln!("Error: {key}: {err}");
                failures += 1;
            }
            Err(err) => {
                error!("analysis task failed: {err}");
                failures += 1;
            }
        }
    }
    results.sort_by_key(|(index, _)| *index);
    let reports = results.into_iter().map(|(_, report)| report).collect();
    Ok((reports, failures))
}

async fn load_profile(args: &ProfileArgs) -> CliResult<ScoringProfile> {
    match &args.profile_file {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            Ok(ScoringProfile::from_json(&raw)?)
        }
        None => Ok(ScoringProfile::builtin(args.profile.as_str())?),
    }
}

/// A ticket file holds one snapshot or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum TicketFile {
    Many(Vec<Ticket>),
    One(Ticket),
}

async fn load_tickets(path: &Path) -> CliResult<Vec<Ticket>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let tickets = match serde_json::from_str::<TicketFile>(&raw)? {
        TicketFile::Many(tickets) => tickets,
        TicketFile::One(ticket) => vec![ticket],
    };
    if tickets.is_empty() {
        return Err(format!("no tickets in {}", path.display()).into());
    }
    Ok(tickets)
}

async fn emit_reports(
    reports: &[ReadinessReport],
    profile: &ScoringProfile,
    output: &OutputArgs,
) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_text_batch(reports, profile, output.verbose),
        OutputFormat::Json if reports.len() == 1 => render_json(&reports[0])?,
        OutputFormat::Json => render_json(reports)?,
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
        if !contents.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
