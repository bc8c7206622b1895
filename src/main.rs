#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # tassist
//!
//! Command line front end: analyze Java files against an exercise
//! configuration, validate configuration files, and grade a directory of
//! submissions against an assessment.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use serde_json::{Value, json};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};
use tassist::{
    analysis::{AnalysisResult, Analyzer},
    batch::grade_assessment,
    config,
    grade::{GradingPolicy, overview_table},
    model::{AssessmentConfig, ExerciseConfig},
    provider::{DirectorySubmissions, JsonConfigStore},
};
use tracing::{Level, metadata::LevelFilter, warn};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Analyze files against one exercise
    Analyze {
        /// exercise configuration file
        config: PathBuf,
        /// print JSON instead of tables
        json:   bool,
        /// Java files
        files:  Vec<PathBuf>,
    },
    /// Validate configuration files
    CheckConfig(Vec<PathBuf>),
    /// Grade submissions against an assessment
    Grade {
        /// configuration store directory
        store:        PathBuf,
        /// assessment id
        assessment:   String,
        /// submissions directory
        submissions:  PathBuf,
        /// how violations turn into points
        policy:       GradingPolicy,
        /// where to write Markdown feedback
        feedback_dir: Option<PathBuf>,
        /// only grade these students
        students:     Vec<String>,
        /// print JSON instead of tables
        json:         bool,
    },
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// log level override
    log_level: Option<Level>,
    /// the command
    cmd:       Cmd,
}

/// Parse the command line arguments and return the options
fn options() -> Opts {
    /// parses the `--json` switch
    fn json() -> impl Parser<bool> {
        long("json").help("Print machine-readable JSON").switch()
    }

    let log_level = long("log-level")
        .help("Log level (error, warn, info, debug, trace); defaults to $TASSIST_LOG or info")
        .argument::<Level>("LEVEL")
        .optional();

    let analyze = {
        let config = long("config")
            .short('c')
            .help("Exercise configuration (JSON)")
            .argument::<PathBuf>("EXERCISE");
        let json = json();
        let files = positional::<PathBuf>("FILE")
            .help("Java source files to analyze")
            .some("at least one Java file is required");
        construct!(Cmd::Analyze {
            config,
            json,
            files
        })
        .to_options()
        .command("analyze")
        .help("Analyze Java files against an exercise configuration")
    };

    let check_config = positional::<PathBuf>("FILE")
        .help("Exercise or assessment configuration files")
        .some("at least one configuration file is required")
        .map(Cmd::CheckConfig)
        .to_options()
        .command("check-config")
        .help("Validate exercise and assessment configuration files");

    let grade = {
        let store = long("store")
            .help("Directory holding configs/ and assessments/")
            .argument::<PathBuf>("DIR");
        let assessment = long("assessment")
            .help("Assessment id")
            .argument::<String>("ID");
        let submissions = long("submissions")
            .help("Directory holding one sub-directory per student")
            .argument::<PathBuf>("DIR");
        let policy = long("policy")
            .help("manual, ratio, all-or-nothing or per-violation:<cost>")
            .argument::<GradingPolicy>("POLICY")
            .fallback(GradingPolicy::ManualReview)
            .display_fallback();
        let feedback_dir = long("feedback-dir")
            .help("Write <student>_feedback.md files here")
            .argument::<PathBuf>("DIR")
            .optional();
        let students = long("student")
            .help("Only grade this student (repeatable)")
            .argument::<String>("ID")
            .many();
        let json = json();
        construct!(Cmd::Grade {
            store,
            assessment,
            submissions,
            policy,
            feedback_dir,
            students,
            json
        })
        .to_options()
        .command("grade")
        .help("Grade a directory of submissions against an assessment")
    };

    let cmd = construct!([analyze, check_config, grade]);

    construct!(Opts { log_level, cmd })
        .to_options()
        .descr("Structural analysis and grading of Java exercises")
        .run()
}

/// One row of the violation table.
#[derive(Tabled)]
struct ViolationRow {
    /// violation category
    #[tabled(rename = "Category")]
    category: String,
    /// violation message
    #[tabled(rename = "Message")]
    message:  String,
}

/// Renders the violations of one file as a table.
fn violation_table(path: &Path, result: &AnalysisResult) -> String {
    let mut rows: Vec<ViolationRow> = result
        .all_messages()
        .into_iter()
        .map(|(category, message)| ViolationRow {
            category: category.to_string(),
            message,
        })
        .collect();
    rows.extend(result.syntax_warnings.iter().map(|w| ViolationRow {
        category: "Warning".to_string(),
        message:  w.to_string(),
    }));

    let status = if result.is_valid { "valid" } else { "invalid" };
    let footer = format!("{} violation(s)", result.violation_count());
    Table::new(&rows)
        .with(Panel::header(format!("{} ({status})", path.display())))
        .with(Panel::footer(footer))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(72).keep_words(true)))
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Modify::new(Rows::last()).with(Alignment::center()))
        .with(Style::modern())
        .to_string()
}

/// Analyzes every file; succeeds when all of them are valid.
fn analyze(config_path: &Path, json_output: bool, files: &[PathBuf]) -> Result<bool> {
    let text = fs::read_to_string(config_path)
        .with_context(|| format!("Could not read {}", config_path.display()))?;
    let exercise = ExerciseConfig::from_json(&text)
        .with_context(|| format!("Invalid exercise configuration {}", config_path.display()))?;
    let analyzer = Analyzer::new(&exercise, config::get().analyzer_options())?;

    let mut all_valid = true;
    let mut report = serde_json::Map::new();
    for file in files {
        let key = file.display().to_string();
        let outcome = fs::read_to_string(file)
            .with_context(|| format!("Could not read {}", file.display()))
            .and_then(|source| analyzer.analyze(&source).map_err(anyhow::Error::from));

        match outcome {
            Ok(result) => {
                all_valid &= result.is_valid;
                if json_output {
                    report.insert(key, serde_json::to_value(&result)?);
                } else {
                    println!("{}", violation_table(file, &result));
                }
            }
            Err(e) => {
                all_valid = false;
                if json_output {
                    report.insert(key, json!({ "error": format!("{e:#}") }));
                } else {
                    eprintln!("{}: {e:#}", file.display());
                }
            }
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&Value::Object(report))?);
    }
    Ok(all_valid)
}

/// Validates configuration files; succeeds when all of them are valid.
fn check_config(files: &[PathBuf]) -> Result<bool> {
    let mut all_valid = true;
    for file in files {
        let checked = fs::read_to_string(file)
            .with_context(|| format!("Could not read {}", file.display()))
            .and_then(|text| {
                let value: Value = serde_json::from_str(&text).context("Not valid JSON")?;
                if value.get("assessmentId").is_some() {
                    let a: AssessmentConfig = serde_json::from_value(value)?;
                    Ok(format!(
                        "assessment `{}`, {} exercise(s), {:.2} points",
                        a.id,
                        a.exercises().len(),
                        a.total_max_points()
                    ))
                } else {
                    let e = ExerciseConfig::from_json(&text)?;
                    Ok(format!("exercise `{}`", e.id))
                }
            });

        match checked {
            Ok(summary) => println!("ok    {}: {summary}", file.display()),
            Err(e) => {
                all_valid = false;
                println!("error {}: {e:#}", file.display());
            }
        }
    }
    Ok(all_valid)
}

/// Grades submissions and prints or writes the results.
async fn grade(
    store: &Path,
    assessment: &str,
    submissions: &Path,
    policy: GradingPolicy,
    feedback_dir: Option<&Path>,
    students: &[String],
    json_output: bool,
) -> Result<()> {
    let store = JsonConfigStore::open(store)?;
    let submissions = DirectorySubmissions::new(submissions)?;
    let students = if students.is_empty() {
        submissions.list_students()?
    } else {
        students.to_vec()
    };

    let settings = config::get();
    let reports = grade_assessment(
        &store,
        &submissions,
        assessment,
        &students,
        policy,
        settings.analyzer_options(),
        settings.workers(),
    )
    .await?;

    if let Some(dir) = feedback_dir {
        fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))?;
        for report in &reports {
            let path = dir.join(format!("{}_feedback.md", report.student));
            fs::write(&path, &report.grade.feedback_text)
                .with_context(|| format!("Could not write {}", path.display()))?;
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report.student);
            println!("{}", overview_table(&report.grade.grade_results()));
            for file in &report.unmatched {
                warn!("{}: {file} matches no exercise of `{assessment}`", report.student);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();

    let opts = options();

    let level = opts
        .log_level
        .or_else(|| config::log_level(|name| std::env::var(name).ok()))
        .unwrap_or(Level::INFO);
    let fmt = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    // settings warn about bad values, so they are read once logging is up
    config::get();

    let success = match opts.cmd {
        Cmd::Analyze {
            config,
            json,
            files,
        } => analyze(&config, json, &files)?,
        Cmd::CheckConfig(files) => check_config(&files)?,
        Cmd::Grade {
            store,
            assessment,
            submissions,
            policy,
            feedback_dir,
            students,
            json,
        } => {
            grade(
                &store,
                &assessment,
                &submissions,
                policy,
                feedback_dir.as_deref(),
                &students,
                json,
            )
            .await?;
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
