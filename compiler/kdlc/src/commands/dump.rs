//! The `dump` command: list the contents of compiled resource files.

use std::path::PathBuf;

use kdl_diagnostic::CompileResult;
use kdl_rsrc::{Attributes, ResourceManager, TypeCode};

use crate::report;

/// Load each file, in order, on top of one manager.
pub fn load_files(paths: &[PathBuf]) -> CompileResult<ResourceManager> {
    let mut manager = ResourceManager::new();
    for path in paths {
        manager.load(path)?;
    }
    Ok(manager)
}

fn describe_attributes(attributes: &Attributes) -> String {
    if attributes.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = attributes.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!(" [{}]", pairs.join(", "))
}

/// Print every resource visible through the loaded files, grouped by type.
///
/// Later files shadow resources of earlier ones with the same type, id and
/// attributes.
pub fn dump_files(paths: &[PathBuf]) {
    if paths.is_empty() {
        eprintln!("error: no input files");
        eprintln!("Usage: kdlc dump <file.kdat>...");
        std::process::exit(1);
    }
    let manager = match load_files(paths) {
        Ok(manager) => manager,
        Err(error) => {
            report(&[error]);
            std::process::exit(1);
        }
    };

    let mut groups: Vec<(TypeCode, Attributes)> = Vec::new();
    for file in manager.files() {
        for group in file.type_groups() {
            let key = (group.type_code, group.attributes.clone());
            if !groups.contains(&key) {
                groups.push(key);
            }
        }
    }

    for (type_code, attributes) in &groups {
        let resources = manager.get_type(*type_code, attributes);
        println!(
            "'{type_code}'{} ({} resource{})",
            describe_attributes(attributes),
            resources.len(),
            if resources.len() == 1 { "" } else { "s" }
        );
        for resource in resources {
            println!(
                "  #{:<8} {:>8} bytes  \"{}\"",
                resource.id,
                resource.data.len(),
                resource.name
            );
        }
    }
}
