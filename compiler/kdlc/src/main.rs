//! KDL resource compiler CLI.

use std::path::PathBuf;

use kdlc::commands::{build_files, check_files, dump_files, lex_file, list_types};
use kdlc::{init_tracing, parse_build_options, BuildOptions};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let rest = &args[2..];

    match command.as_str() {
        "build" => build_files(&options_or_exit(rest)),
        "check" => check_files(&options_or_exit(rest)),
        "types" => list_types(&options_or_exit(rest)),
        "lex" => {
            let options = options_or_exit(rest);
            let [path] = options.inputs.as_slice() else {
                eprintln!("Usage: kdlc lex <file.kdl> [--comment-style=kdl|cpp|lua]");
                std::process::exit(1);
            };
            lex_file(path, &options);
        }
        "dump" => {
            let paths: Vec<PathBuf> = rest.iter().map(PathBuf::from).collect();
            dump_files(&paths);
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("kdlc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn options_or_exit(args: &[String]) -> BuildOptions {
    match parse_build_options(args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("kdlc - the KDL resource compiler");
    println!();
    println!("Usage: kdlc <command> [args]");
    println!();
    println!("Commands:");
    println!("  build <file.kdl>...   Compile sources into one resource file");
    println!("  check <file.kdl>...   Compile each source without writing output");
    println!("  types <file.kdl>...   List the type definitions a compile sees");
    println!("  lex <file.kdl>        Show the lexemes of a source file");
    println!("  dump <file>...        List the resources in compiled files");
    println!("  help                  Show this help message");
    println!("  version               Show version information");
    println!();
    println!("Options:");
    println!("  -f, --format <name>       extended (default), classic or rez");
    println!("  -o, --output <path>       Output file (default: result.kdat)");
    println!("  -D, --define <name>       Define a condition name");
    println!("  -I, --module-path <dir>   Search <dir> for imported modules");
    println!("  --comment-style=<style>   kdl (default), cpp or lua");
    println!();
    println!("Set RUST_LOG to enable tracing; KDL_LOG_TREE=1 renders it as a tree.");
}
