use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use funding_match::config::{AppConfig, ExplanationSettings};
use funding_match::error::AppError;
use funding_match::telemetry;
use funding_match::workflows::eligibility::{
    extract_eligibility, AttachmentText, EligibilityVerification,
};
use funding_match::workflows::explanation::{
    fallback_explanation, AnthropicProvider, Explanation, ExplanationService, FallbackReason,
    InMemoryExplanationCache, OrganizationSummary, ProgramSummary, ProviderError,
};
use funding_match::workflows::matching::{
    FundingProgram, MatchScore, MatchScoringEngine, Organization,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "funding-match",
    about = "Extract eligibility, score matches and explain them for R&D funding programs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract structured eligibility constraints from announcement text
    Extract(ExtractArgs),
    /// Score an organization against a funding program
    Score(ScoreArgs),
    /// Score a match and explain it through the configured AI provider
    Explain(ScoreArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Program identifier recorded on the verification
    #[arg(long)]
    program_id: String,
    /// Title/description text of the announcement
    #[arg(long)]
    text: Option<PathBuf>,
    /// Extracted attachment text (repeatable)
    #[arg(long = "attachment")]
    attachments: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Organization profile (JSON)
    #[arg(long)]
    organization: PathBuf,
    /// Funding program (JSON)
    #[arg(long)]
    program: PathBuf,
    /// Stored eligibility verification (JSON); extracted from the program text when omitted
    #[arg(long)]
    eligibility: Option<PathBuf>,
    /// Scoring date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::Score(args) => {
            let (_, _, score) = score_from_files(&args)?;
            print_json(&score)
        }
        Command::Explain(args) => run_explain(&config, args).await,
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_attachment(path: &Path) -> Result<AttachmentText, AppError> {
    let text = fs::read_to_string(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(AttachmentText::new(file_name, text))
}

fn run_extract(args: ExtractArgs) -> Result<(), AppError> {
    let raw_text = match &args.text {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };
    let attachments = args
        .attachments
        .iter()
        .map(|path| load_attachment(path))
        .collect::<Result<Vec<_>, _>>()?;

    let verification = extract_eligibility(&args.program_id, &raw_text, &attachments);
    print_json(&verification)
}

fn eligibility_for(program: &FundingProgram) -> EligibilityVerification {
    let attachments: Vec<AttachmentText> = program
        .attachment_text
        .iter()
        .map(|text| AttachmentText::new("announcement", text.as_str()))
        .collect();
    extract_eligibility(&program.id.0, &program.requirement_text, &attachments)
}

fn score_from_files(
    args: &ScoreArgs,
) -> Result<(Organization, FundingProgram, MatchScore), AppError> {
    let organization: Organization = read_json(&args.organization)?;
    let program: FundingProgram = read_json(&args.program)?;
    let verification = match &args.eligibility {
        Some(path) => read_json(path)?,
        None => eligibility_for(&program),
    };
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let score =
        MatchScoringEngine::default().score(&organization, &program, Some(&verification), as_of)?;
    info!(
        program_id = %score.program_id,
        total = score.total_score,
        level = score.eligibility_level.label(),
        "match scored"
    );
    Ok((organization, program, score))
}

async fn run_explain(config: &AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let (organization, program, score) = score_from_files(&args)?;

    info!(environment = ?config.environment, "explaining match");
    let explanation = explain_match(&config.explanation, &organization, &program, &score).await?;

    print_json(&explanation)
}

async fn explain_match(
    settings: &ExplanationSettings,
    organization: &Organization,
    program: &FundingProgram,
    score: &MatchScore,
) -> Result<Explanation, AppError> {
    let organization = OrganizationSummary::from(organization);
    let summary = ProgramSummary::from(program);

    let provider = match AnthropicProvider::new(settings) {
        Ok(provider) => Arc::new(provider),
        Err(ProviderError::NotConfigured(detail)) => {
            let reason = FallbackReason::ProviderError;
            warn!(
                %detail,
                reason = reason.label(),
                "provider not configured; serving fallback explanation"
            );
            return Ok(fallback_explanation(
                reason,
                &organization,
                &summary,
                score,
                program.status,
                0,
            ));
        }
        Err(err) => return Err(err.into()),
    };
    let cache = Arc::new(InMemoryExplanationCache::new());
    let service = ExplanationService::new(provider, cache, settings);

    Ok(service
        .explain(&organization, &summary, score, program.status)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2025-03-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"))
        );
        assert!(parse_date("03/01/2025").is_err());
    }

    #[test]
    fn cli_parses_repeated_attachments() {
        let cli = Cli::try_parse_from([
            "funding-match",
            "extract",
            "--program-id",
            "PRG-1",
            "--attachment",
            "a.txt",
            "--attachment",
            "b.txt",
        ])
        .expect("valid arguments");

        let Command::Extract(args) = cli.command else {
            panic!("expected extract command");
        };
        assert_eq!(args.attachments.len(), 2);
        assert!(args.text.is_none());
    }

    #[test]
    fn program_text_feeds_extraction_when_no_verification_is_given() {
        let program: FundingProgram = serde_json::from_value(serde_json::json!({
            "id": "PRG-1",
            "title": "보안 기술개발",
            "agency": "과학기술정보통신부",
            "budget_ceiling": null,
            "trl_range": null,
            "industry_tags": [],
            "deadline": null,
            "status": "ACTIVE",
            "requirement_text": "지원대상: 상시근로자 10명 이상 중소기업",
            "attachment_text": null
        }))
        .expect("program json");

        let verification = eligibility_for(&program);
        assert_eq!(verification.program_id, "PRG-1");
        assert_eq!(verification.min_employees, Some(10));
    }

    #[tokio::test]
    async fn missing_api_key_serves_a_fallback_explanation() {
        let organization: Organization = serde_json::from_value(serde_json::json!({
            "id": "ORG-1",
            "name": "한빛시큐리티",
            "organization_type": "COMPANY",
            "industry_sector": "정보보안",
            "trl_level": 7,
            "revenue": 5_000_000_000u64,
            "employee_count": 40,
            "rd_experience_years": 5,
            "operating_years": 6
        }))
        .expect("organization json");
        let program: FundingProgram = serde_json::from_value(serde_json::json!({
            "id": "PRG-1",
            "title": "보안 기술개발",
            "agency": "과학기술정보통신부",
            "budget_ceiling": null,
            "trl_range": null,
            "industry_tags": ["정보보안"],
            "deadline": null,
            "status": "ACTIVE",
            "requirement_text": "",
            "attachment_text": null
        }))
        .expect("program json");
        let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
        let score = MatchScoringEngine::default()
            .score(&organization, &program, None, as_of)
            .expect("valid fixtures");

        let settings = ExplanationSettings {
            api_key: None,
            ..ExplanationSettings::default()
        };
        let explanation = explain_match(&settings, &organization, &program, &score)
            .await
            .expect("fallback instead of error");

        assert_eq!(explanation.fallback_reason, Some(FallbackReason::ProviderError));
        assert!(!explanation.content.summary.is_empty());
        assert_eq!(explanation.cost_usd, 0.0);
    }
}
