//! Debug commands: `lex` and `types` for inspecting compiler internals.

use std::path::Path;

use kdl_lexer::LexerOptions;

use super::{compile, require_inputs};
use crate::{report, BuildOptions};

/// Lex a file and display the lexeme stream.
pub fn lex_file(path: &Path, options: &BuildOptions) {
    let lexer_options = LexerOptions::default().with_comment_style(options.comment_style);
    match kdl_lexer::lex_file(path, &lexer_options) {
        Ok(lexemes) => {
            println!("Lexemes for '{}' ({} lexemes):", path.display(), lexemes.len());
            for lexeme in &lexemes {
                println!(
                    "  {}:{}  {:<12} {}",
                    lexeme.location.line,
                    lexeme.location.offset,
                    lexeme.kind.describe(),
                    lexeme
                );
            }
        }
        Err(error) => {
            report(&[error]);
            std::process::exit(1);
        }
    }
}

/// Compile the inputs and list every type definition the session knows.
pub fn list_types(options: &BuildOptions) {
    require_inputs(options, "types");
    let session = match compile(options) {
        Ok(session) => session,
        Err(error) => {
            report(&[error]);
            std::process::exit(1);
        }
    };

    let mut types: Vec<_> = session.types().iter().collect();
    types.sort_by(|a, b| a.name().cmp(b.name()));
    println!("Types ({}):", types.len());
    for definition in types {
        println!(
            "  {} '{}'  {} binary field(s), {} field(s){}",
            definition.name(),
            definition.code(),
            definition.template().len(),
            definition.fields().len(),
            if definition.is_builtin() { "  [builtin]" } else { "" }
        );
        for field in definition.fields() {
            match &field.repeatable {
                Some(repeatable) => println!(
                    "    {} (repeatable {}..={})",
                    field.name,
                    repeatable.lower(),
                    repeatable.upper()
                ),
                None => println!("    {}", field.name),
            }
        }
    }
}
