use clap::Subcommand;

use super::{new_id, open_app, print_json};

#[derive(Subcommand)]
pub enum NotesAction {
    /// Create an empty note
    Add {
        /// Note title
        title: String,
    },
    /// List notes
    List,
    /// Edit a note's title and/or content
    Edit {
        /// Note ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: String,
    },
}

pub fn run(action: NotesAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, _config) = open_app()?;

    match action {
        NotesAction::Add { title } => {
            let note = app.add_note(new_id(), title)?;
            print_json(note)?;
        }
        NotesAction::List => {
            print_json(app.notes())?;
        }
        NotesAction::Edit { id, title, content } => {
            if !app.update_note(&id, title, content)? {
                return Err(format!("note not found: {id}").into());
            }
            let note = app
                .notes()
                .iter()
                .find(|n| n.id == id)
                .ok_or_else(|| format!("note not found: {id}"))?;
            print_json(note)?;
        }
        NotesAction::Delete { id } => {
            if !app.delete_note(&id) {
                return Err(format!("note not found: {id}").into());
            }
            println!("Note deleted: {id}");
        }
    }
    Ok(())
}
