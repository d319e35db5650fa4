use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use academic_admin::api::export::{export_transcript, write_roster_csv};
use academic_admin::api::http::HttpClient;
use academic_admin::api::student::{ResultId, StudentId};
use academic_admin::config::Config;
use academic_admin::gpa::format_gpa;
use academic_admin::view::list_sync::DeleteOutcome;
use academic_admin::view::login::LoginView;
use academic_admin::view::results::ResultsView;
use academic_admin::view::students::StudentsView;
use academic_admin::view::{ConfirmGate, Navigator, Route, Session};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{error, info};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use time::OffsetDateTime;

#[derive(Parser)]
#[command(name = "academic-admin", about = "Terminal front end for the academic records admin panel")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all students
    Students,
    /// Show a student's results and GPA
    Results { student: String },
    /// Delete a student after confirmation
    DeleteStudent { student: String },
    /// Delete one of a student's results after confirmation
    DeleteResult { student: String, result: String },
    /// Write a student's results to a csv file
    Export { student: String, path: PathBuf },
    /// Write the student roster to a csv file
    ExportRoster { path: PathBuf },
}

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        info!("navigate to {}", route.path());
    }
}

struct ConsoleGate;

impl ConfirmGate for ConsoleGate {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() {
    // Loads environment variables from a `.env` file, if present.
    dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = TermLogger::init(
        config.log_level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli.command, &config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &Config) -> Result<(), String> {
    let client = HttpClient::new(&config.api_url).map_err(|err| err.to_string())?;
    let session = Session::new(client, Arc::new(ConsoleNavigator), Arc::new(ConsoleGate));

    if let Some(credentials) = config.credentials() {
        let login = LoginView::new(&session);
        login.set_email(credentials.email);
        login.set_password(credentials.password);
        if !login.submit().await {
            return Err(login.error().unwrap_or_else(|| "login failed".to_string()));
        }
    }

    match command {
        Command::Students => {
            let view = StudentsView::new(&session);
            view.mount().await;
            if let Some(err) = view.snapshot().error {
                return Err(err);
            }
            for row in view.rows() {
                println!("{:<24} {:<32} {}  {}", row.name, row.email, row.joined, row.link);
            }
            println!(
                "{} students, {} joined this month",
                view.snapshot().items.len(),
                view.joined_this_month(OffsetDateTime::now_utc())
            );
        }
        Command::Results { student } => {
            let view = ResultsView::new(&session);
            view.select_student(StudentId::new(student)).await;
            let results = view.results();
            if let Some(err) = results.error {
                return Err(err);
            }
            for result in &results.items {
                let course = result.course.as_ref();
                println!(
                    "{:<10} {:<32} {:<2} {:>6} {:<8} {}",
                    course.map_or("", |c| c.code.as_str()),
                    course.map_or("", |c| c.title.as_str()),
                    result.grade.as_str(),
                    result.score.map(|s| s.to_string()).unwrap_or_default(),
                    result.semester,
                    result.academic_year
                );
            }
            let summary = view.summary();
            println!(
                "{} courses, {} graded, GPA {}",
                summary.courses,
                summary.graded,
                format_gpa(summary.gpa)
            );
        }
        Command::DeleteStudent { student } => {
            let view = StudentsView::new(&session);
            view.mount().await;
            let outcome = view.delete(&StudentId::new(student)).await;
            report(outcome, view.snapshot().error)?;
        }
        Command::DeleteResult { student, result } => {
            let view = ResultsView::new(&session);
            view.select_student(StudentId::new(student)).await;
            let outcome = view.delete_result(&ResultId::new(result)).await;
            report(outcome, view.results().error)?;
        }
        Command::Export { student, path } => {
            let view = ResultsView::new(&session);
            view.select_student(StudentId::new(student)).await;
            let results = view.results();
            if let Some(err) = results.error {
                return Err(err);
            }
            export_transcript(&results.items, &path).map_err(|err| err.to_string())?;
        }
        Command::ExportRoster { path } => {
            let view = StudentsView::new(&session);
            view.mount().await;
            let students = view.snapshot();
            if let Some(err) = students.error {
                return Err(err);
            }
            let file = std::fs::File::create(&path).map_err(|err| err.to_string())?;
            write_roster_csv(&students.items, file).map_err(|err| err.to_string())?;
            info!("wrote {} students to {}", students.items.len(), path.display());
        }
    }

    Ok(())
}

fn report(outcome: DeleteOutcome, error: Option<String>) -> Result<(), String> {
    match outcome {
        DeleteOutcome::Declined => info!("cancelled"),
        DeleteOutcome::Deleted => info!("deleted"),
        DeleteOutcome::Failed => return Err(error.unwrap_or_else(|| "delete failed".to_string())),
    }
    Ok(())
}
