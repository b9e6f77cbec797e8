//! Directives: metadata, `@format`, `@import`, `@var`, `@const` and
//! `@function`.

use kdl_diagnostic::{CompileError, CompileResult, ErrorCode};
use kdl_eval::{Expression, Function, Scope};
use kdl_ir::{Lexeme, LexemeKind};
use kdl_lexer::lex_file;
use kdl_rsrc::Format;

use crate::modules;
use crate::parser::{expect, expect_semi, lexeme_list, Parser};
use crate::session::resolve_path;

impl Parser<'_> {
    pub(crate) fn parse_directive(&mut self, scope: &mut Scope<'_>) -> CompileResult<()> {
        let directive = self.stream.read();
        match directive.text.as_str() {
            "format" => self.parse_format(&directive),
            "import" => self.parse_import(),
            "var" | "const" => self.parse_variable(&directive, scope),
            "function" => self.parse_function(scope),
            key => {
                let value = Expression::compile(&mut self.stream)?.evaluate(scope)?;
                expect_semi(&mut self.stream)?;
                tracing::debug!(key, value = %value, "metadata");
                self.state.metadata.set(key, value.text());
                Ok(())
            }
        }
    }

    /// `@format requires <name>;` or `@format set <name>;`
    fn parse_format(&mut self, directive: &Lexeme) -> CompileResult<()> {
        let mode = expect(&mut self.stream, LexemeKind::Identifier, "`requires` or `set`")?;
        let name = expect(&mut self.stream, LexemeKind::Identifier, "a format name")?;
        expect_semi(&mut self.stream)?;

        let format = Format::from_name(&name.text).ok_or_else(|| {
            CompileError::format(
                ErrorCode::E3002,
                format!("Unrecognised resource file format `{}`", name.text),
            )
            .located(&name.location)
        })?;
        match mode.text.as_str() {
            "requires" if format != self.state.format => Err(CompileError::format(
                ErrorCode::E3001,
                format!(
                    "Resource file format `{format}` is required, but the session is writing `{}`",
                    self.state.format
                ),
            )
            .located(&directive.location)),
            "requires" => Ok(()),
            "set" => {
                tracing::debug!(%format, "format set");
                self.state.format = format;
                Ok(())
            }
            _ => Err(CompileError::unexpected(
                "Expected `requires` or `set` after `@format`",
                &mode,
            )),
        }
    }

    /// `@import Name;`, `@import module Name;` or `@import "path.kdl";`
    ///
    /// The module's lexemes are spliced into the stream at the cursor, so
    /// they are parsed before anything that follows the directive.
    #[tracing::instrument(level = "debug", skip(self))]
    fn parse_import(&mut self) -> CompileResult<()> {
        if self.stream.expect_text(LexemeKind::Identifier, "module")
            && self.stream.peek_at(1).is(LexemeKind::Identifier)
        {
            self.stream.read();
        }
        let target = self.stream.read();
        expect_semi(&mut self.stream)?;

        let lexemes = match target.kind {
            LexemeKind::Identifier => {
                let key = format!("module:{}", target.text);
                if !self.state.imported.insert(key) {
                    return Ok(());
                }
                if let Some(source) = modules::builtin_module(&target.text) {
                    kdl_lexer::lex(
                        source,
                        &modules::display_name(&target.text),
                        &kdl_lexer::LexerOptions::default(),
                    )?
                } else {
                    let file_name = format!("{}.kdl", target.text);
                    let path = self
                        .state
                        .config
                        .module_paths
                        .iter()
                        .map(|dir| dir.join(&file_name))
                        .chain(std::iter::once(resolve_path(&target.location, &file_name)))
                        .find(|path| path.is_file())
                        .ok_or_else(|| {
                            CompileError::semantic_at(
                                ErrorCode::E2001,
                                format!("Unrecognised module `{}`", target.text),
                                &target.location,
                            )
                        })?;
                    lex_file(&path, &self.state.lexer_options)?
                }
            }
            LexemeKind::String => {
                let path = resolve_path(&target.location, &target.text);
                if !self.state.imported.insert(path.display().to_string()) {
                    return Ok(());
                }
                lex_file(&path, &self.state.lexer_options)?
            }
            _ => {
                return Err(CompileError::unexpected(
                    "Expected a module name or file path after `@import`",
                    &target,
                ));
            }
        };
        tracing::debug!(lexemes = lexemes.len(), "module imported");
        self.stream.insert(lexemes);
        Ok(())
    }

    /// `@var name = expression;` and `@const name = expression;`
    ///
    /// The first definition of a name wins; later ones are ignored.
    fn parse_variable(&mut self, directive: &Lexeme, scope: &mut Scope<'_>) -> CompileResult<()> {
        let name = self.stream.read();
        if !matches!(name.kind, LexemeKind::Identifier | LexemeKind::Variable) {
            return Err(CompileError::unexpected("Expected a variable name", &name));
        }
        expect(&mut self.stream, LexemeKind::Equals, "`=`")?;
        let value = Expression::compile(&mut self.stream)?.evaluate(scope)?;
        expect_semi(&mut self.stream)?;

        let added = if directive.text == "const" {
            scope.add_constant(name.text.as_str(), value)
        } else {
            scope.add_variable(name.text.as_str(), value)
        };
        if !added {
            tracing::debug!(name = %name.text, "variable already defined, keeping the first value");
        }
        Ok(())
    }

    /// `@function name(a, b) = expression;`
    fn parse_function(&mut self, scope: &mut Scope<'_>) -> CompileResult<()> {
        let name = expect(&mut self.stream, LexemeKind::Identifier, "a function name")?;
        let params = lexeme_list(
            &mut self.stream,
            LexemeKind::LParen,
            LexemeKind::RParen,
            &[LexemeKind::Identifier, LexemeKind::Variable],
        )?;
        expect(&mut self.stream, LexemeKind::Equals, "`=`")?;
        let body = Expression::compile(&mut self.stream)?;
        expect_semi(&mut self.stream)?;

        let function = Function::User {
            params: params.into_iter().map(|p| p.text).collect(),
            body,
        };
        scope
            .add_function(name.text.as_str(), function)
            .map_err(|e| e.located(&name.location))
    }
}
