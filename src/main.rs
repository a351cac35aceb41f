// src/main.rs

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use evaluator::config::Config;
use evaluator::controller::{BulkOutcome, DetailSlot, FilterChange};
use evaluator::error::AppError;
use evaluator::pages::analytics::{QuestionAnalytics, difficulty};
use evaluator::pages::exam_results::{ExamResultsPage, SortDirection, SortKey};
use evaluator::pages::exams::{ExamsPage, StatusFilter};
use evaluator::pages::monitoring::Monitor;
use evaluator::pages::question_bank::QuestionBank;
use evaluator::pages::recommendations::RecommendationsPage;
use evaluator::state::AppState;
use evaluator::utils::html::{plain_text, truncate};

#[derive(Parser)]
#[command(name = "evaluator", about = "Admin console for the exam backend")]
struct Cli {
    /// Base URL of the backend. Overrides EVALUATOR_API_URL from the config.
    #[arg(long, env = "EVALUATOR_API_URL", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List questions in the bank
    Questions {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Show archived questions instead of active ones
        #[arg(long)]
        archived: bool,
    },
    /// Archive questions in one bulk request
    Archive {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Restore archived questions in one bulk request
    Restore {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Upload a question file
    Import { file: PathBuf },
    /// List exams
    Exams {
        /// all, active or inactive
        #[arg(long, default_value = "all")]
        status: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List exam results with summary figures
    Results {
        #[arg(long)]
        exam: Option<i64>,
        /// date, score or name
        #[arg(long, default_value = "date")]
        sort: String,
        #[arg(long)]
        asc: bool,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one result with its answer breakdown
    Result { id: i64 },
    /// Watch active exam takers until interrupted
    Monitor,
    /// List course recommendations
    Recommendations {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        semester: Option<String>,
    },
    /// Slowest questions by average answer time
    Analytics {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    let cli = Cli::parse();

    let config = match Config::from_env_with(cli.api_url.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let file_appender = tracing_appender::rolling::daily("logs", "evaluator.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialise: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli.command, state).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, state: AppState) -> Result<(), AppError> {
    match command {
        Command::Questions {
            category,
            search,
            page,
            archived,
        } => {
            let bank = QuestionBank::new(state);
            let list = if archived { &bank.archived } else { &bank.active };
            list.configure([
                FilterChange::Category(category),
                FilterChange::Search(search.unwrap_or_default()),
            ])
            .await;
            list.fetch_page(page).await?;

            for q in list.rows().await {
                println!(
                    "{:>6}  {:<16}  {}",
                    q.id,
                    q.category,
                    truncate(&q.plain_prompt(), 70)
                );
            }
            print_page_footer(&list.page().await);
        }
        Command::Archive { ids } => {
            let bank = QuestionBank::new(state);
            bank.active.clear_selection().await;
            for id in ids {
                bank.active.toggle(id).await;
            }
            report_bulk(bank.archive_selected().await)?;
        }
        Command::Restore { ids } => {
            let bank = QuestionBank::new(state);
            bank.archived.clear_selection().await;
            for id in ids {
                bank.archived.toggle(id).await;
            }
            report_bulk(bank.restore_selected().await)?;
        }
        Command::Import { file } => {
            let bytes = tokio::fs::read(&file).await?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("questions.csv")
                .to_string();
            QuestionBank::new(state).import(&name, bytes).await?;
        }
        Command::Exams { status, search } => {
            let status: StatusFilter = status.parse()?;
            let page = ExamsPage::new(state);
            page.list.refresh().await?;

            for exam in page.filtered(status, &search).await {
                println!(
                    "{:>5}  {:<10}  {:<8}  {:>3} min  pass {:>3}%  {}",
                    exam.id,
                    exam.reference_code,
                    if exam.is_active() { "active" } else { "inactive" },
                    exam.time_limit,
                    exam.passing_score,
                    exam.title
                );
                println!("       {}", page.exam_link(&exam));
            }
        }
        Command::Results {
            exam,
            sort,
            asc,
            page,
        } => {
            let key: SortKey = sort.parse()?;
            let mut results = ExamResultsPage::new(state);
            results.list.configure([FilterChange::Exam(exam)]).await;
            results.list.fetch_page(page).await?;

            results.sort_by(key);
            if asc != (results.sort_state().1 == SortDirection::Asc) {
                results.sort_by(key);
            }

            for r in results.sorted_rows().await {
                println!(
                    "{:>6}  {:<24}  {:>6.2}%  {:<5}  {}",
                    r.id,
                    r.student_name,
                    r.score_percentage,
                    if r.passed() { "PASS" } else { "FAIL" },
                    r.exam_title
                );
            }
            let stats = results.stats().await;
            println!(
                "{} results, {} passed, average {:.2}%, pass rate {:.2}%",
                stats.total_results, stats.passed_count, stats.average_score, stats.pass_rate
            );
            println!("export: {}", results.export_url().await);
        }
        Command::Result { id } => {
            let results = ExamResultsPage::new(state);
            match results.open_detail(id).await {
                DetailSlot::Loaded(detail) => {
                    let r = &detail.result;
                    println!(
                        "{} on {}: {:.2}% ({}/{}) {}",
                        r.student_name,
                        r.exam_title,
                        r.score_percentage,
                        r.correct_answers,
                        r.total_questions,
                        r.remarks
                    );
                    for a in detail.wrong_answers() {
                        println!(
                            "  Q{}: answered {} expected {}  {}",
                            a.question_id,
                            a.student_answer,
                            a.correct_answer,
                            truncate(&plain_text(&a.question), 60)
                        );
                    }
                    println!("pdf: {}", results.pdf_url(id));
                }
                DetailSlot::Failed(message) => return Err(AppError::NotFound(message)),
                _ => {}
            }
        }
        Command::Monitor => {
            let monitor = Monitor::start(state);
            let mut every = tokio::time::interval(Duration::from_secs(5));
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = every.tick() => {
                        let snapshot = monitor.snapshot().await;
                        let now = chrono::Utc::now();
                        println!(
                            "[{}s] {} active, {} completed today",
                            monitor.elapsed_seconds(),
                            snapshot.active.len(),
                            snapshot.completed_today
                        );
                        for t in &snapshot.active {
                            let left = t
                                .remaining_seconds(now)
                                .map(|s| format!("{}:{:02}", s / 60, s % 60))
                                .unwrap_or_else(|| "-".to_string());
                            println!(
                                "  {:<24}  {:<24}  {:>5.1}%  {}",
                                t.student_name,
                                t.exam_title,
                                t.progress_percent(),
                                left
                            );
                        }
                    }
                }
            }
            monitor.pause();
        }
        Command::Recommendations { search, semester } => {
            let page = RecommendationsPage::new(state);
            page.list
                .configure([
                    FilterChange::Search(search.unwrap_or_default()),
                    FilterChange::Semester(semester),
                ])
                .await;
            page.list.refresh().await?;

            for r in page.list.rows().await {
                println!(
                    "{:<24}  {:>6.2}  {:<12}  {}",
                    r.student_name,
                    r.score,
                    r.semester,
                    r.courses().join(", ")
                );
            }
            for (course, count) in page.course_counts().await {
                println!("  {:<16} {}", course, count);
            }
            print_page_footer(&page.list.page().await);
        }
        Command::Analytics { top } => {
            let mut analytics = QuestionAnalytics::new(state.backend.clone(), state.notifier.clone());
            analytics.load().await?;

            for stat in analytics.slowest(top) {
                println!(
                    "Q{:<5} {:>7.1}s  {:>5.1}% slow  {:?}  {}",
                    stat.question_id,
                    stat.average_time,
                    stat.slow_percentage,
                    difficulty(&stat),
                    truncate(&plain_text(&stat.question), 50)
                );
            }
            println!("overall average {:.1}s", analytics.overall_average_time());
        }
    }
    Ok(())
}

fn report_bulk(outcome: BulkOutcome) -> Result<(), AppError> {
    match outcome {
        BulkOutcome::Applied(n) => {
            println!("{} item(s) updated", n);
            Ok(())
        }
        BulkOutcome::Skipped => Ok(()),
        BulkOutcome::Failed => Err(AppError::BadRequest("Bulk action failed".to_string())),
    }
}

fn print_page_footer(meta: &evaluator::models::page::PageMeta) {
    println!(
        "page {} of {} ({} total)",
        meta.current_page, meta.last_page, meta.total
    );
}
