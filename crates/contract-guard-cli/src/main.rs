mod settings;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use contract_guard_core::{
    load_catalog, render_report, AnalysisContext, AnalysisReport, BuiltinRuleRepository, Catalog,
    ContractAnalyzer, FileRuleRepository, LoanTerms, OutputFormat, RuleRepository, Role, Sector,
    Severity,
};
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "contract-guard",
    author,
    version,
    about = "Screen contracts for risky clauses and compute effective loan rates"
)]
struct Cli {
    /// Configuration file with default sector, role and rule pack
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze contract text from a file or stdin
    Analyze {
        /// Plain-text contract; reads stdin when omitted
        file: Option<PathBuf>,
        /// Contract sector (generic, loans, education, health_plan, services)
        #[arg(long)]
        sector: Option<Sector>,
        /// Party the analysis is performed for (requester, provider, other)
        #[arg(long)]
        role: Option<Role>,
        /// Extra JSON5 rule pack appended to the built-in catalog
        #[arg(long = "rules", value_name = "FILE")]
        rules_file: Option<PathBuf>,
        /// Emit the report as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// List the rules that would be evaluated
    Rules {
        /// Only show rules that apply to this sector
        #[arg(long)]
        sector: Option<Sector>,
        #[arg(long = "rules", value_name = "FILE")]
        rules_file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Compute the effective periodic rate of an installment loan
    Cost {
        #[arg(long)]
        principal: f64,
        /// Nominal rate per period as a fraction (0.02 = 2%)
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        installments: u32,
        /// Upfront fees, spread evenly over the installments
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Analyze {
            file,
            sector,
            role,
            rules_file,
            json,
        } => {
            let context = AnalysisContext::new(
                sector.unwrap_or(settings.sector),
                role.unwrap_or(settings.role),
            );
            let rules_file = rules_file.or(settings.rules_file);
            analyze(file.as_deref(), context, rules_file.as_deref(), json).await?
        }
        Commands::Rules {
            sector,
            rules_file,
            json,
        } => {
            let rules_file = rules_file.or(settings.rules_file);
            list_rules(sector, rules_file.as_deref(), json).await?
        }
        Commands::Cost {
            principal,
            rate,
            installments,
            fee,
            json,
        } => cost(LoanTerms::new(principal, rate, installments, fee), json)?,
    }
    Ok(())
}

async fn catalog(rules_file: Option<&Path>) -> Result<Catalog> {
    match rules_file {
        Some(path) => load_catalog(&FileRuleRepository::new(path))
            .await
            .with_context(|| format!("failed to load rules from {}", path.display())),
        None => Ok(Catalog::new(BuiltinRuleRepository.load_rules().await?)?),
    }
}

async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("failed to read contract text from stdin")?;
            Ok(buffer)
        }
    }
}

async fn analyze(
    file: Option<&Path>,
    context: AnalysisContext,
    rules_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let catalog = catalog(rules_file).await?;
    let analyzer = ContractAnalyzer::new(Arc::new(catalog))?;
    let text = read_input(file).await?;
    let report = AnalysisReport::new(context, analyzer.analyze(&text, &context));
    info!(
        matches = report.matches.len(),
        rating = %report.summary.severity_rating,
        "contract analyzed"
    );

    if json {
        println!("{}", render_report(&report, OutputFormat::Json)?);
    } else {
        let rendered = render_report(&report, OutputFormat::Human)?;
        let (rating, rest) = rendered.split_once('\n').unwrap_or((rendered.as_str(), ""));
        println!("{}", tint(report.summary.severity_rating, rating));
        print!("{rest}");
    }
    Ok(())
}

async fn list_rules(sector: Option<Sector>, rules_file: Option<&Path>, json: bool) -> Result<()> {
    let catalog = catalog(rules_file).await?;
    let rules: Vec<_> = catalog
        .rules()
        .iter()
        .filter(|rule| match sector {
            Some(sector) => rule.sector == Sector::Generic || rule.sector == sector,
            None => true,
        })
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    println!("{} rule(s)", rules.len());
    for rule in rules {
        println!(
            "- {name:<34} [{severity}] {sector} / {applies} :: {desc}",
            name = rule.name,
            severity = paint(rule.severity),
            sector = rule.sector,
            applies = rule.applies_to,
            desc = rule.description
        );
    }
    Ok(())
}

fn cost(terms: LoanTerms, json: bool) -> Result<()> {
    let quote = terms.quote();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "terms": terms,
                "quote": quote,
            }))?
        );
        return Ok(());
    }

    println!("Installment:          {:.2}", quote.installment);
    println!("Installment with fee: {:.2}", quote.adjusted_installment);
    println!(
        "Effective rate:       {:.4}% per period",
        quote.effective_rate * 100.0
    );
    println!(
        "Annualized rate:      {:.2}% per year",
        quote.annualized_rate * 100.0
    );
    println!("Total paid:           {:.2}", quote.total_paid);
    println!("Total cost:           {:.2}", quote.total_cost);
    println!(
        "{}",
        "Estimate from a fixed number of Newton-Raphson iterations.".dimmed()
    );
    Ok(())
}

fn paint(severity: Severity) -> colored::ColoredString {
    tint(severity, &severity.to_string().to_uppercase())
}

fn tint(severity: Severity, text: &str) -> colored::ColoredString {
    match severity {
        Severity::High => text.red().bold(),
        Severity::Medium => text.yellow(),
        Severity::Low => text.green(),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
