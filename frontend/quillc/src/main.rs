//! Quill CLI
//!
//! Thin shell around the run session: compile a file, render the classified
//! diagnostics, optionally export the bundle.

use quillc::commands::{compile_file, list_markers, parse_compile_options};

fn main() {
    quillc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "compile" => {
            if args.len() < 3 {
                eprintln!("Usage: quill compile <file> [options]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --compiler=<path>   Compiler binary (default: ./compiler)");
                eprintln!("  --workdir=<dir>     Working directory (default: current)");
                eprintln!("  --timeout=<secs>    Kill the compiler after this many seconds");
                eprintln!("  --export=<dir>      Export the run to <dir>/outputs");
                eprintln!("  --archive           Also write outputs.tar.gz (with --export)");
                eprintln!("  --open              Open the bundle after export");
                eprintln!("  -v, --verbose       Show unclassified lines and artifact content");
                std::process::exit(1);
            }

            let options = parse_compile_options(&args[3..]);
            compile_file(&args[2], &options);
        }
        "markers" => {
            list_markers();
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("Quill {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Quill - front end for an external compiler");
    println!();
    println!("Usage: quill <command> [options]");
    println!();
    println!("Commands:");
    println!("  compile <file>   Run the compiler on a source file");
    println!("  markers          Show the diagnostic classification rules");
    println!("  help             Show this help message");
    println!("  version          Show version information");
    println!();
    println!("Compile options:");
    println!("  --compiler=<path>   Compiler binary (default: ./compiler)");
    println!("  --workdir=<dir>     Working directory the compiler runs in");
    println!("  --timeout=<secs>    Kill the compiler after this many seconds");
    println!("  --export=<dir>      Export source, diagnostics, and artifacts");
    println!("  --archive           Also write outputs.tar.gz (with --export)");
    println!("  --open              Open the exported bundle in the file browser");
    println!("  -v, --verbose       Show unclassified lines and artifact content");
    println!();
    println!("Examples:");
    println!("  quill compile program.txt");
    println!("  quill compile program.txt --compiler=./compiler --timeout=10");
    println!("  quill compile program.txt --export=run1 --archive");
    println!("  quill markers");
}
