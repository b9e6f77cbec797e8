//! Compile sessions.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use kdl_diagnostic::{CompileError, CompileResult, Diagnostic, ErrorCode};
use kdl_eval::{builtins, Function, Scope, Value};
use kdl_ir::Location;
use kdl_lexer::{lex, LexerOptions};
use kdl_rsrc::{codec, Format, Resource, ResourceFile};
use kdl_types::TypeTable;
use rustc_hash::FxHashSet;

use crate::config::{Metadata, SessionConfig};
use crate::encoder::Encoder;
use crate::instance::ResourceInstance;
use crate::modules;
use crate::parser::Parser;

/// Registries shared by every parse within one session.
pub(crate) struct SessionState {
    pub(crate) config: SessionConfig,
    pub(crate) format: Format,
    pub(crate) metadata: Metadata,
    pub(crate) types: TypeTable,
    pub(crate) instances: Vec<ResourceInstance>,
    pub(crate) warnings: Vec<Diagnostic>,
    /// Keys of imported modules, so each is imported once.
    pub(crate) imported: FxHashSet<String>,
    /// Directory `file()` resolves relative paths against.
    pub(crate) source_dir: Rc<RefCell<PathBuf>>,
    pub(crate) lexer_options: LexerOptions,
}

impl SessionState {
    pub(crate) fn instance_index(&self, type_name: &str, namespace: Option<&str>, id: i64) -> Option<usize> {
        self.instances
            .iter()
            .position(|instance| instance.is(type_name, namespace, id))
    }
}

/// One compilation: sources in, one resource file out.
///
/// Created per output file and dropped once the file is written. Nothing is
/// shared between sessions.
pub struct CompileSession {
    state: SessionState,
    root: Scope<'static>,
}

impl CompileSession {
    /// Start a session: install the built-in functions and compile the
    /// prelude.
    pub fn new(config: SessionConfig) -> CompileResult<Self> {
        let source_dir = Rc::new(RefCell::new(PathBuf::from(".")));
        let mut root = Scope::new();
        builtins::install(&mut root)?;
        install_session_functions(&mut root, &config, &source_dir)?;

        let lexer_options = LexerOptions::default().with_comment_style(config.comment_style);
        let mut session = CompileSession {
            state: SessionState {
                format: config.format,
                config,
                metadata: Metadata::default(),
                types: TypeTable::new(),
                instances: Vec::new(),
                warnings: Vec::new(),
                imported: FxHashSet::default(),
                source_dir,
                lexer_options,
            },
            root,
        };
        session.compile_module("Prelude", modules::PRELUDE)?;
        Ok(session)
    }

    /// Compile KDL source text. `file` is used for diagnostics and to
    /// resolve relative paths.
    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn compile_source(&mut self, source: &str, file: &str) -> CompileResult<()> {
        let lexemes = lex(source, file, &self.state.lexer_options)?;
        Parser::new(lexemes, &mut self.state).parse(&mut self.root)
    }

    /// Read and compile a source file.
    pub fn compile_file(&mut self, path: &Path) -> CompileResult<()> {
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|e| CompileError::io(&display, &e))?;
        self.compile_source(&source, &display)
    }

    /// Compile a built-in module with the default comment style.
    pub(crate) fn compile_module(&mut self, name: &str, source: &str) -> CompileResult<()> {
        let lexemes = lex(source, &modules::display_name(name), &LexerOptions::default())?;
        Parser::new(lexemes, &mut self.state).parse(&mut self.root)
    }

    /// The container format in effect, after any `@format set`.
    pub fn format(&self) -> Format {
        self.state.format
    }

    pub fn metadata(&self) -> &Metadata {
        &self.state.metadata
    }

    pub fn types(&self) -> &TypeTable {
        &self.state.types
    }

    /// Resources declared so far, in declaration order.
    pub fn instances(&self) -> &[ResourceInstance] {
        &self.state.instances
    }

    /// Warnings raised so far, in source order.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.state.warnings
    }

    pub fn root_scope(&self) -> &Scope<'static> {
        &self.root
    }

    /// Encode every declared resource.
    #[tracing::instrument(level = "debug", skip(self), fields(resources = self.state.instances.len()))]
    pub fn resource_file(&self) -> CompileResult<ResourceFile> {
        let encoder = Encoder::new(&self.state.types, self.state.format);
        let mut file = ResourceFile::new();
        for instance in &self.state.instances {
            let definition = self.state.types.named(&instance.type_name, &Location::synthesized())?;
            let located = |e: CompileError| e.located(&instance.location);
            let data = encoder.encode(instance).map_err(located)?;
            let resource = Resource::new(definition.code(), instance.id, instance.name.as_str(), data)
                .in_namespace(instance.namespace.as_deref());
            codec::check(&resource, self.state.format).map_err(located)?;
            file.add(resource);
        }
        Ok(file)
    }

    /// The container file bytes in the session's format.
    pub fn encode(&self) -> CompileResult<Vec<u8>> {
        codec::write(&self.resource_file()?, self.state.format)
    }

    /// Write the container file to `path`.
    pub fn write(&self, path: &Path) -> CompileResult<()> {
        codec::write_file(&self.resource_file()?, self.state.format, path)
    }
}

/// Register `defined` and `file`, which need session state.
fn install_session_functions(
    root: &mut Scope<'_>,
    config: &SessionConfig,
    source_dir: &Rc<RefCell<PathBuf>>,
) -> CompileResult<()> {
    let definitions = config.definitions.clone();
    root.add_function(
        "defined",
        Function::native(Some(1), move |args| match args.first() {
            Some(Value::Identifier(name) | Value::String(name)) => {
                Ok(Value::Bool(definitions.contains(name)))
            }
            Some(other) => Err(CompileError::semantic(
                ErrorCode::E2005,
                format!("`defined` expects a name, found {}", other.type_name()),
            )),
            None => Ok(Value::Bool(false)),
        }),
    )?;

    let dir = Rc::clone(source_dir);
    root.add_function(
        "file",
        Function::native(Some(1), move |args| {
            let Some(Value::String(relative)) = args.first() else {
                return Err(CompileError::semantic(
                    ErrorCode::E2005,
                    "`file` expects a path string",
                ));
            };
            let path = dir.borrow().join(relative);
            read_asset(&path).map(Value::Data)
        }),
    )?;
    Ok(())
}

/// Read an asset file.
pub(crate) fn read_asset(path: &Path) -> CompileResult<Vec<u8>> {
    tracing::debug!(path = %path.display(), "reading asset");
    std::fs::read(path).map_err(|e| CompileError::io(path.display().to_string(), &e))
}

/// Resolve `relative` against the directory of the file `location` is in.
pub(crate) fn resolve_path(location: &Location, relative: &str) -> PathBuf {
    let path = Path::new(relative);
    if path.is_absolute() || modules::is_builtin_file(&location.file) {
        return path.to_path_buf();
    }
    match Path::new(&*location.file).parent() {
        Some(parent) => parent.join(path),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
