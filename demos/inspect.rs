use std::path::{Path, PathBuf};

use clap::Parser;
use demitasse::jvm::{
    Class, Field, Method,
    parsing::{self, ParsingOptions, UnknownAttributePolicy},
};
use thiserror::Error;

/// Command line arguments
#[derive(Parser)]
#[command(name = "inspect")]
#[command(about = "Prints the structure of class files", long_about = None)]
struct Args {
    /// Class files to inspect
    #[arg(required = true)]
    class_files: Vec<PathBuf>,

    /// Print method bodies and the constant pool
    #[arg(short, long)]
    verbose: bool,

    /// Keep attributes with unknown names instead of rejecting the class
    #[arg(long)]
    keep_unknown_attributes: bool,
}

#[derive(Debug, Error)]
enum InspectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Class parse error: {0}")]
    Parse(#[from] parsing::Error),
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let policy = if args.keep_unknown_attributes {
        UnknownAttributePolicy::Preserve
    } else {
        UnknownAttributePolicy::Reject
    };
    let options = ParsingOptions::default().unknown_attributes(policy);

    for path in &args.class_files {
        if let Err(e) = inspect(path, &options, args.verbose) {
            eprintln!("Error inspecting {}: {e}", path.display());
        }
    }
}

fn inspect(path: &Path, options: &ParsingOptions, verbose: bool) -> Result<(), InspectError> {
    let bytes = std::fs::read(path)?;
    let class = Class::parse_with(&bytes, options)?;

    println!("Classfile {}", path.display());
    if let Some(source_file) = class.source_file()? {
        println!("  Compiled from \"{source_file}\"");
    }
    print!("class {}", class.binary_name()?);
    if let Some(super_class) = class.super_class()? {
        print!(" extends {super_class}");
    }
    let interfaces = class.interfaces()?;
    if !interfaces.is_empty() {
        let names: Vec<_> = interfaces.iter().map(ToString::to_string).collect();
        print!(" implements {}", names.join(", "));
    }
    println!();
    println!("  version: {}", class.version);
    println!("  flags: {:?}", class.access_flags);

    if verbose {
        println!("Constant pool:");
        for (idx, entry) in class.constant_pool.iter() {
            println!("  #{idx:<5} = {entry:?}");
        }
    }

    println!("{{");
    for field in &class.fields {
        print_field(&class, field)?;
    }
    for method in &class.methods {
        print_method(method, verbose);
    }
    println!("}}");
    Ok(())
}

fn print_field(class: &Class, field: &Field) -> Result<(), InspectError> {
    print!("  {:?} {} {}", field.access_flags, field.field_type, field.name);
    if let Some(value) = field.constant_value(&class.constant_pool)? {
        print!(" = {value}");
    }
    println!(";");
    Ok(())
}

fn print_method(method: &Method, verbose: bool) {
    println!(
        "  {:?} {}{}; // {} argument slot(s)",
        method.access_flags,
        method.name,
        method.descriptor,
        method.argument_slots()
    );
    let Some(code) = method.code().filter(|_| verbose) else {
        return;
    };
    println!(
        "    Code: stack={}, locals={}, {} byte(s)",
        code.max_stack,
        code.max_locals,
        code.instructions.len()
    );
    for handler in &code.exception_table {
        println!(
            "      [{}, {}) -> {} catch #{}",
            handler.start_pc, handler.end_pc, handler.handler_pc, handler.catch_type
        );
    }
    for entry in code.line_number_table() {
        println!("      line {}: {}", entry.line_number, entry.start_pc);
    }
}
