//! Example: Edit a document with undo and write it back out
//!
//! Duplicates the first child of the root, undoes and redoes it, and prints
//! the result with indentation.
//!
//! Usage: cargo run --example edit <input.xml>

use std::env;

use xml_flatdiff::{parse_file, EditTree, Editor, PrintOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.xml>", args[0]);
        std::process::exit(1);
    }

    let document = parse_file(&args[1])?;
    let mut editor = Editor::new(EditTree::from_document(&document));

    let first_child = editor
        .tree()
        .roots()
        .first()
        .and_then(|root| root.children().first())
        .map(|child| child.id().to_string());

    if let Some(id) = first_child {
        eprintln!("Duplicating {}", id);
        editor.apply(|tree| tree.duplicate(&id))?;
        editor.undo();
        editor.redo();
    }

    let options = PrintOptions {
        pretty: true,
        ..PrintOptions::default()
    };
    print!("{}", editor.tree().to_xml(&options)?);
    Ok(())
}
