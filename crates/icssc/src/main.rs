use std::env;
use std::fs;
use std::path::Path;
use std::process;

use icssc::diag::Diag;
use icssc::{CompileError, CompileOptions};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: icssc [--dump-ast] [--check] [--select-branches] [-o <file>] <file>";

fn main() {
    init_tracing();
    let mut args = env::args().skip(1);
    let mut dump_ast = false;
    let mut check = false;
    let mut options = CompileOptions::default();
    let mut output = None;
    let mut path = None;

    while let Some(arg) = args.next() {
        if arg == "--dump-ast" {
            dump_ast = true;
            continue;
        }
        if arg == "--check" {
            check = true;
            continue;
        }
        if arg == "--select-branches" {
            options.select_branches = true;
            continue;
        }
        if arg == "-o" {
            if let Some(file) = args.next() {
                output = Some(file);
            } else {
                eprintln!("-o expects a path");
                eprintln!("{USAGE}");
                process::exit(1);
            }
            continue;
        }
        if path.is_none() {
            path = Some(arg);
        } else {
            eprintln!("unexpected argument: {arg}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    }

    let Some(path) = path else {
        eprintln!("{USAGE}");
        process::exit(1);
    };

    let src = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("failed to read {path}: {err}");
            process::exit(1);
        }
    };

    let (mut sheet, diags) = icssc::check_source(&src);
    if !diags.is_empty() {
        emit_diags(&diags, Path::new(&path), &src);
        process::exit(1);
    }

    if check && dump_ast {
        println!("{sheet:#?}");
    }
    if let Err(err) = icssc::fold_and_select(&mut sheet, &options) {
        match err {
            CompileError::Diagnostics(diags) => emit_diags(&diags, Path::new(&path), &src),
            other => eprintln!("error: {other}"),
        }
        process::exit(1);
    }
    if check {
        return;
    }

    if dump_ast {
        println!("{sheet:#?}");
        return;
    }

    let css = icssc::generator::generate(&sheet);
    match output {
        Some(out) => {
            if let Err(err) = fs::write(&out, &css) {
                eprintln!("failed to write {out}: {err}");
                process::exit(1);
            }
            tracing::info!(path = %out, bytes = css.len(), "wrote stylesheet");
        }
        None => print!("{css}"),
    }
}

fn emit_diags(diags: &[Diag], path: &Path, src: &str) {
    for diag in diags {
        eprintln!("{}", diag.render(Some(path), src));
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ICSS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
