//! Notes commands.
//!
//! - `macrum notes show` - Print the notes
//! - `macrum notes set <content>` - Replace the notes
//! - `macrum notes append <text>` - Append a line
//! - `macrum notes clear` - Clear the notes

use super::{open_workspace, print_json, print_notices};
use crate::cli::NotesCommands;
use crate::error::Result;
use crate::model::format_timestamp;
use crate::store::Workspace;
use crate::validate::{FieldError, MAX_NOTES_LEN, ValidationErrors};
use std::path::PathBuf;

/// Execute a notes command.
///
/// # Errors
///
/// Returns an error if the database is missing or the notes would exceed
/// the length limit.
pub fn execute(command: &NotesCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut ws = open_workspace(db_path)?;

    match command {
        NotesCommands::Show => {}
        NotesCommands::Set { content } => {
            check_length(content)?;
            ws.set_notes(content.clone());
        }
        NotesCommands::Append { text } => {
            let mut combined = ws.notes().clone();
            combined.append(text);
            check_length(&combined.content)?;
            ws.append_notes(text);
        }
        NotesCommands::Clear => ws.clear_notes(),
    }

    report(&mut ws, json)
}

fn check_length(content: &str) -> Result<()> {
    let mut errors = Vec::new();
    if content.chars().count() > MAX_NOTES_LEN {
        errors.push(FieldError::new(
            "notes",
            format!("Notes must be at most {MAX_NOTES_LEN} characters"),
        ));
    }
    ValidationErrors::check(errors)
}

fn report(ws: &mut Workspace, json: bool) -> Result<()> {
    let notices = ws.take_notices();
    let notes = ws.notes();

    if json {
        return print_json(notes, &notices);
    }

    print_notices(&notices);
    if notes.is_empty() {
        println!("No notes.");
    } else {
        println!("{}", notes.content);
        println!();
        println!("Updated: {}", format_timestamp(notes.updated_at));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_limit() {
        assert!(check_length("short").is_ok());
        assert!(check_length(&"x".repeat(MAX_NOTES_LEN + 1)).is_err());
    }
}
