//! Options shared by the commands that compile sources.

use std::path::PathBuf;

use kdl_lexer::CommentStyle;
use kdl_rsrc::Format;
use kdl_sema::SessionConfig;

/// Output file written by `build` when `-o` is not given.
pub const DEFAULT_OUTPUT: &str = "result.kdat";

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct BuildOptions {
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Format,
    pub definitions: Vec<String>,
    pub module_paths: Vec<PathBuf>,
    pub comment_style: CommentStyle,
}

impl BuildOptions {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    /// Session configuration for these options. The format name itself is
    /// defined so sources can test it with `@condition`.
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::default()
            .with_format(self.format)
            .with_comment_style(self.comment_style)
            .define(self.format.name());
        for name in &self.definitions {
            config = config.define(name.as_str());
        }
        for path in &self.module_paths {
            config = config.with_module_path(path.as_path());
        }
        config
    }
}

fn parse_format(name: &str) -> Result<Format, String> {
    Format::from_name(name).ok_or_else(|| {
        format!("unknown format '{name}', options: extended, kestrel, classic, rsrc, rez")
    })
}

fn parse_comment_style(name: &str) -> Result<CommentStyle, String> {
    match name {
        "kdl" => Ok(CommentStyle::Kdl),
        "cpp" => Ok(CommentStyle::Cpp),
        "lua" => Ok(CommentStyle::Lua),
        _ => Err(format!(
            "unknown comment style '{name}', options: kdl, cpp, lua"
        )),
    }
}

/// Parse the arguments that follow the command name.
///
/// Flags taking a value accept it either as the next argument or after `=`.
/// Anything that is not a flag is an input file.
pub fn parse_build_options(args: &[String]) -> Result<BuildOptions, String> {
    let mut options = BuildOptions::default();
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .cloned()
                .ok_or_else(|| format!("missing value after '{flag}'"))
        };

        match arg.as_str() {
            "-f" | "--format" => options.format = parse_format(&value(arg.as_str())?)?,
            "-o" | "--output" => options.output = Some(PathBuf::from(value(arg.as_str())?)),
            "-D" | "--define" => options.definitions.push(value(arg.as_str())?),
            "-I" | "--module-path" => options.module_paths.push(PathBuf::from(value(arg.as_str())?)),
            _ => {
                if let Some(name) = arg.strip_prefix("--format=") {
                    options.format = parse_format(name)?;
                } else if let Some(path) = arg.strip_prefix("--output=") {
                    options.output = Some(PathBuf::from(path));
                } else if let Some(name) = arg.strip_prefix("--define=") {
                    options.definitions.push(name.to_string());
                } else if let Some(name) = arg.strip_prefix("-D").filter(|n| !n.is_empty()) {
                    options.definitions.push(name.to_string());
                } else if let Some(path) = arg.strip_prefix("--module-path=") {
                    options.module_paths.push(PathBuf::from(path));
                } else if let Some(style) = arg.strip_prefix("--comment-style=") {
                    options.comment_style = parse_comment_style(style)?;
                } else if arg.starts_with('-') {
                    return Err(format!("unknown option '{arg}'"));
                } else {
                    options.inputs.push(PathBuf::from(arg));
                }
            }
        }
    }

    Ok(options)
}
