//! Purpose: Interactive numbered-menu front end over a catalog session.
//! Exports: `run`.
//! Role: Thin glue; all catalog semantics live behind `api::CatalogStore`.
//! Invariants: Operation failures are printed and the loop continues; only
//! Invariants: terminal I/O failures propagate to the caller.
//! Invariants: An invalid choice re-prompts without crashing; EOF exits.

use std::io::{BufRead, Write};

use biblio::api::{AddBook, AddMember, CatalogStore, Error, ErrorKind};

const MENU: &str = "\
Library menu:
  1. Add book
  2. Add member
  3. Borrow book
  4. Return book
  5. Show books
  6. Show members
  7. Exit";

pub(crate) fn run(
    session: &mut CatalogStore,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> Result<(), Error> {
    loop {
        write_line(out, MENU)?;
        let Some(choice) = prompt(&mut input, out, "Enter choice: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => add_book(session, &mut input, out)?,
            "2" => add_member(session, &mut input, out)?,
            "3" => borrow_book(session, &mut input, out)?,
            "4" => return_book(session, &mut input, out)?,
            "5" => show_books(session, out)?,
            "6" => show_members(session, out)?,
            "7" => {
                write_line(out, "Goodbye!")?;
                break;
            }
            _ => write_line(out, "Invalid choice, try again.")?,
        }
        write_line(out, "")?;
    }
    Ok(())
}

fn add_book(
    session: &mut CatalogStore,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), Error> {
    let Some(title) = prompt(input, out, "Book title: ")? else {
        return Ok(());
    };
    let Some(author) = prompt(input, out, "Author: ")? else {
        return Ok(());
    };
    let Some(copies_text) = prompt(input, out, "Copies (default 1): ")? else {
        return Ok(());
    };

    let copies = if copies_text.is_empty() {
        1
    } else {
        match copies_text.parse::<u32>() {
            Ok(copies) if copies >= 1 => copies,
            _ => {
                return write_line(out, "Copies must be a positive number.");
            }
        }
    };

    match session.add_book(&title, &author, copies)? {
        AddBook::Created { title, .. } => write_line(out, &format!("Added new book '{title}'.")),
        AddBook::Restocked { title, added, .. } => {
            write_line(out, &format!("Added {added} more copies of '{title}'."))
        }
    }
}

fn add_member(
    session: &mut CatalogStore,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), Error> {
    let Some(name) = prompt(input, out, "Member name: ")? else {
        return Ok(());
    };
    match session.add_member(&name)? {
        AddMember::Created { name } => write_line(out, &format!("Added new member '{name}'.")),
        AddMember::AlreadyExists { name } => {
            write_line(out, &format!("Member '{name}' already exists."))
        }
    }
}

fn borrow_book(
    session: &mut CatalogStore,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), Error> {
    let Some(member) = prompt(input, out, "Member name: ")? else {
        return Ok(());
    };
    let Some(title) = prompt(input, out, "Book title: ")? else {
        return Ok(());
    };
    match session.borrow_book(&member, &title) {
        Ok(receipt) => write_line(
            out,
            &format!(
                "{} borrowed '{}' (due {}).",
                receipt.member, receipt.title, receipt.due
            ),
        ),
        Err(err) if is_reportable(&err) => write_line(out, &failure_text(&err, false)),
        Err(err) => Err(err),
    }
}

fn return_book(
    session: &mut CatalogStore,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), Error> {
    let Some(member) = prompt(input, out, "Member name: ")? else {
        return Ok(());
    };
    let Some(title) = prompt(input, out, "Book title: ")? else {
        return Ok(());
    };
    match session.return_book(&member, &title) {
        Ok(receipt) => {
            if receipt.is_late() {
                write_line(
                    out,
                    &format!(
                        "Book returned late by {} days! Please return on time next time.",
                        receipt.days_late
                    ),
                )
            } else {
                write_line(out, "Book returned on time. Thank you!")
            }
        }
        Err(err) if is_reportable(&err) => write_line(out, &failure_text(&err, true)),
        Err(err) => Err(err),
    }
}

fn show_books(session: &CatalogStore, out: &mut impl Write) -> Result<(), Error> {
    if session.books().is_empty() {
        return write_line(out, "No books in the library.");
    }
    for book in session.books() {
        write_line(out, &book.to_string())?;
    }
    Ok(())
}

fn show_members(session: &CatalogStore, out: &mut impl Write) -> Result<(), Error> {
    if session.members().is_empty() {
        return write_line(out, "No members found.");
    }
    for member in session.members() {
        write_line(out, &member.to_string())?;
    }
    Ok(())
}

/// Operation-level failures are reported inside the loop; anything else
/// (store write failures, internal errors) propagates out.
fn is_reportable(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::NotFound | ErrorKind::Unavailable | ErrorKind::Corrupt
    )
}

fn failure_text(err: &Error, returning: bool) -> String {
    match (err.kind(), err.member(), err.title()) {
        (ErrorKind::NotFound, Some(member), None) => format!("Member '{member}' not found."),
        (ErrorKind::NotFound, None, Some(title)) => format!("Book '{title}' not found."),
        (ErrorKind::Unavailable, None, Some(title)) => {
            format!("No copies of '{title}' available.")
        }
        (ErrorKind::Unavailable, Some(member), Some(title)) if returning => {
            format!("'{title}' is not borrowed by {member}.")
        }
        (ErrorKind::Unavailable, Some(member), Some(title)) => {
            format!("'{title}' is already borrowed by {member}.")
        }
        _ => err.to_string(),
    }
}

fn prompt(
    input: &mut impl BufRead,
    out: &mut impl Write,
    label: &str,
) -> Result<Option<String>, Error> {
    write!(out, "{label}").map_err(io_error)?;
    out.flush().map_err(io_error)?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(io_error)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn write_line(out: &mut impl Write, text: &str) -> Result<(), Error> {
    writeln!(out, "{text}").map_err(io_error)
}

fn io_error(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("terminal I/O failed")
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::run;
    use biblio::api::CatalogStore;
    use std::io::Cursor;

    fn run_script(session: &mut CatalogStore, script: &str) -> String {
        let mut out = Vec::new();
        run(session, Cursor::new(script.as_bytes()), &mut out).expect("menu run");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn full_session_covers_all_menu_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        let mut session = CatalogStore::open(&path);

        let script = "1\nDune\nFrank Herbert\n2\n2\nAlice\n3\nAlice\nDune\n5\n6\n4\nAlice\nDune\n9\n7\n";
        let output = run_script(&mut session, script);

        assert!(output.contains("Added new book 'Dune'."));
        assert!(output.contains("Added new member 'Alice'."));
        assert!(output.contains("Alice borrowed 'Dune' (due "));
        assert!(output.contains("Dune by Frank Herbert (copies: 1)"));
        assert!(output.contains("Alice (borrowed: Dune due "));
        assert!(output.contains("Book returned on time. Thank you!"));
        assert!(output.contains("Invalid choice, try again."));
        assert!(output.contains("Goodbye!"));

        // Same-day return restored both copies, and the store was rewritten.
        let reopened = CatalogStore::open(&path);
        assert_eq!(reopened.find_book("Dune").expect("book").copies, 2);
        assert!(
            reopened
                .find_member("Alice")
                .expect("member")
                .borrowed_books
                .is_empty()
        );
    }

    #[test]
    fn eof_ends_the_loop_cleanly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = CatalogStore::open(dir.path().join("catalog.json"));
        let output = run_script(&mut session, "");
        assert!(output.contains("Library menu:"));
    }

    #[test]
    fn non_numeric_copies_aborts_the_add() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = CatalogStore::open(dir.path().join("catalog.json"));
        let output = run_script(&mut session, "1\nDune\nFrank Herbert\nlots\n7\n");

        assert!(output.contains("Copies must be a positive number."));
        assert!(session.books().is_empty());
    }

    #[test]
    fn blank_copies_defaults_to_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = CatalogStore::open(dir.path().join("catalog.json"));
        run_script(&mut session, "1\nDune\nFrank Herbert\n\n7\n");
        assert_eq!(session.find_book("Dune").expect("book").copies, 1);
    }

    #[test]
    fn operation_failures_are_reported_and_the_loop_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = CatalogStore::open(dir.path().join("catalog.json"));
        let output = run_script(&mut session, "3\nMallory\nDune\n6\n7\n");

        assert!(output.contains("Member 'Mallory' not found."));
        assert!(output.contains("No members found."));
        assert!(output.contains("Goodbye!"));
    }
}
