//! Matterload CLI - Prepare ClientMatterCode bulk upload files
//!
//! ```bash
//! matterload profile matters.xlsx --key ClientMatterCode
//! matterload transform matters.csv \
//!     --columns "Matter ID:ClientMatterCode" --columns "Client Name:Name" \
//!     --case proper --duplicates keep-first --output upload.csv
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use matterload::logs::{log_error, log_warning, LOGGER};
use matterload::{
    format_profile, profile_file, transform_file, write_report, CaseMode, ColumnMap,
    DuplicatePolicy, NullTokens, PipelineError, ProfileOptions, TransformConfig, ValidationIssue,
    CLIENT_MATTER_CODE,
};
use std::path::{Path, PathBuf};

/// Issues listed on stderr before the rest are summarized as a count.
const MAX_LISTED_ISSUES: usize = 20;

#[derive(Parser)]
#[command(name = "matterload")]
#[command(about = "Profile and transform CSV/Excel files for ClientMatterCode bulk upload", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a file's structure and data quality
    Profile {
        /// Input file (.csv, .tsv, .txt, .xlsx, .xlsm, .xls, .ods)
        file: PathBuf,

        /// Key column for duplicate detection and code validation
        #[arg(short, long, env = "MATTERLOAD_KEY_COLUMN")]
        key: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Value treated as empty (repeatable, replaces the defaults)
        #[arg(long = "null-token")]
        null_tokens: Vec<String>,
    },

    /// Select, rename and clean columns, validate keys and write a CSV
    Transform {
        /// Input file (.csv, .tsv, .txt, .xlsx, .xlsm, .xls, .ods)
        file: PathBuf,

        /// Column mappings: "Source:Dest" or "ColumnName"
        #[arg(short, long, required = true, value_delimiter = ',')]
        columns: Vec<String>,

        /// Case transformation for non-key columns
        #[arg(long, value_enum, default_value_t = CaseMode::None)]
        case: CaseMode,

        /// How to handle duplicate keys
        #[arg(long, value_enum, default_value_t = DuplicatePolicy::Error, env = "MATTERLOAD_DUPLICATES")]
        duplicates: DuplicatePolicy,

        /// Key column for uniqueness validation (output name)
        #[arg(short, long, default_value = CLIENT_MATTER_CODE, env = "MATTERLOAD_KEY_COLUMN")]
        key: String,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Write counts and issues as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Fail when any key is malformed, truncated or empty
        #[arg(long)]
        strict: bool,

        /// Value treated as empty (repeatable, replaces the defaults)
        #[arg(long = "null-token")]
        null_tokens: Vec<String>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    LOGGER.set_quiet(cli.quiet);
    LOGGER.set_json(matches!(cli.log_format, LogFormat::Json));

    let result = match cli.command {
        Commands::Profile {
            file,
            key,
            format,
            null_tokens,
        } => cmd_profile(&file, key, format, null_tokens),

        Commands::Transform {
            file,
            columns,
            case,
            duplicates,
            key,
            output,
            report,
            strict,
            null_tokens,
        } => {
            let options = TransformOptions {
                case,
                duplicates,
                key,
                strict,
                null_tokens,
            };
            cmd_transform(&file, &columns, options, &output, report.as_deref())
        }
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn null_tokens(tokens: Vec<String>) -> NullTokens {
    if tokens.is_empty() {
        NullTokens::default()
    } else {
        NullTokens::new(tokens)
    }
}

fn cmd_profile(
    file: &Path,
    key: Option<String>,
    format: ReportFormat,
    tokens: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ProfileOptions::default().with_null_tokens(null_tokens(tokens));
    if let Some(key) = key {
        options = options.with_key_column(key);
    }

    let (report, _source) = profile_file(file, &options)?;

    match format {
        ReportFormat::Text => println!("{}", format_profile(&report)),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

struct TransformOptions {
    case: CaseMode,
    duplicates: DuplicatePolicy,
    key: String,
    strict: bool,
    null_tokens: Vec<String>,
}

fn cmd_transform(
    file: &Path,
    columns: &[String],
    options: TransformOptions,
    output: &Path,
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mappings = ColumnMap::parse(columns).map_err(PipelineError::from)?;
    let config = TransformConfig::new(mappings)
        .with_case(options.case)
        .with_duplicates(options.duplicates)
        .with_key_column(options.key)
        .with_null_tokens(null_tokens(options.null_tokens))
        .strict(options.strict);

    let outcome = transform_file(file, output, &config)?;

    print_issues(&outcome.result.issues);
    eprintln!("\n{}", outcome.result.summary());

    if let Some(report_path) = report {
        write_report(&outcome.report(&config), report_path)?;
    }

    eprintln!("✨ Done!");
    Ok(())
}

fn print_issues(issues: &[ValidationIssue]) {
    if issues.is_empty() {
        return;
    }

    log_warning(format!("{} issues:", issues.len()));
    for issue in issues.iter().take(MAX_LISTED_ISSUES) {
        eprintln!("   {}", issue);
    }
    if issues.len() > MAX_LISTED_ISSUES {
        eprintln!("   ... and {} more", issues.len() - MAX_LISTED_ISSUES);
    }
}
