//! Purpose: `biblio` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs catalog commands, prints reports.
//! Invariants: Successful commands report human-readable outcomes on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All catalog mutations go through `api::CatalogStore`
//! Invariants: (load once, full store rewrite after each successful mutation).
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod menu;

use biblio::api::{AddBook, AddMember, CatalogStore, Error, LoadStatus, to_exit_code};
use biblio::notice::{Notice, notice_json};
use biblio::store_paths::default_store_path;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BIBLIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, Error> {
    let cli = Cli::parse();
    let store_path = cli.store.unwrap_or_else(default_store_path);
    dispatch_command(cli.command, store_path)
}

#[derive(Parser)]
#[command(
    name = "biblio",
    version,
    about = "Single-user library catalog backed by one JSON file",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Tracks books, members, and who holds which title until when.
The whole catalog lives in one JSON file and is rewritten after every change.

Mental model:
  - `add-book` / `add-member` grow the catalog
  - `borrow` hands a copy out (due in 14 days)
  - `return` takes it back and reports late returns
"#,
    after_help = r#"EXAMPLES
  $ biblio add-book "Dune" "Frank Herbert" --copies 2
  $ biblio add-member Alice
  $ biblio borrow Alice Dune
  $ biblio return Alice Dune
  $ biblio books
  $ biblio menu            # interactive numbered menu

  $ biblio <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        help = "Catalog store file (default: ~/.biblio/catalog.json)",
        value_hint = ValueHint::FilePath
    )]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Add a book, or add copies to an existing title")]
    AddBook {
        title: String,
        author: String,
        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..),
            help = "Number of copies to add (must be positive)"
        )]
        copies: u32,
    },
    #[command(about = "Register a member (no-op if the name already exists)")]
    AddMember { name: String },
    #[command(about = "Lend one copy of a title to a member (due in 14 days)")]
    Borrow { member: String, title: String },
    #[command(about = "Take a borrowed title back and report late returns")]
    Return { member: String, title: String },
    #[command(about = "List all books in shelving order")]
    Books,
    #[command(about = "List all members and their loans")]
    Members,
    #[command(about = "Run the interactive numbered menu on stdin/stdout")]
    Menu,
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn dispatch_command(command: Command, store_path: PathBuf) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "biblio", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::AddBook {
            title,
            author,
            copies,
        } => {
            let mut session = open_session("add-book", store_path);
            let outcome = session.add_book(&title, &author, copies)?;
            match outcome {
                AddBook::Created { title, .. } => println!("Added new book '{title}'."),
                AddBook::Restocked { title, added, .. } => {
                    println!("Added {added} more copies of '{title}'.");
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::AddMember { name } => {
            let mut session = open_session("add-member", store_path);
            match session.add_member(&name)? {
                AddMember::Created { name } => println!("Added new member '{name}'."),
                AddMember::AlreadyExists { name } => println!("Member '{name}' already exists."),
            }
            Ok(RunOutcome::ok())
        }
        Command::Borrow { member, title } => {
            let mut session = open_session("borrow", store_path);
            let receipt = session.borrow_book(&member, &title)?;
            println!(
                "{} borrowed '{}' (due {}).",
                receipt.member, receipt.title, receipt.due
            );
            Ok(RunOutcome::ok())
        }
        Command::Return { member, title } => {
            let mut session = open_session("return", store_path);
            let receipt = session.return_book(&member, &title)?;
            if receipt.is_late() {
                println!(
                    "Book returned late by {} days! Please return on time next time.",
                    receipt.days_late
                );
            } else {
                println!("Book returned on time. Thank you!");
            }
            Ok(RunOutcome::ok())
        }
        Command::Books => {
            let session = open_session("books", store_path);
            if session.books().is_empty() {
                println!("No books in the library.");
            } else {
                for book in session.books() {
                    println!("{book}");
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Members => {
            let session = open_session("members", store_path);
            if session.members().is_empty() {
                println!("No members found.");
            } else {
                for member in session.members() {
                    println!("{member}");
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Menu => {
            let mut session = open_session("menu", store_path);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            menu::run(&mut session, stdin.lock(), &mut stdout)?;
            Ok(RunOutcome::ok())
        }
    }
}

fn open_session(cmd: &str, store_path: PathBuf) -> CatalogStore {
    let session = CatalogStore::open(store_path);
    if session.load_status() == LoadStatus::Recovered {
        let mut details = Map::new();
        details.insert("status".to_string(), Value::from("recovered"));
        emit_notice(&Notice {
            kind: "store_recovered".to_string(),
            time: notice_time_now().unwrap_or_default(),
            cmd: cmd.to_string(),
            store: session.path().display().to_string(),
            message: "catalog store was unreadable; starting from an empty catalog".to_string(),
            details,
        });
    }
    session
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice) {
    if io::stderr().is_terminal() {
        eprintln!("notice: {} (store: {})", notice.message, notice.store);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_text(err: &Error) -> String {
    let mut text = format!("error: {err}");
    if let Some(hint) = err.hint() {
        text.push_str(&format!("\nhint: {hint}"));
    }
    text
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    if let Some(message) = err.message() {
        inner.insert("message".to_string(), json!(message));
    }
    if let Some(title) = err.title() {
        inner.insert("title".to_string(), json!(title));
    }
    if let Some(member) = err.member() {
        inner.insert("member".to_string(), json!(member));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}
