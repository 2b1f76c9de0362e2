//! Extended XYZ command-line tool for checking, reformatting, and
//! transcoding trajectories.
//!
//! Usage: exyz [OPTIONS] [FILE]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (exyz, json, yaml, toml, cbor, diag)
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if file is valid (exit 0 if valid, 1 if invalid)
//!   -c, --comment          Read each line as a standalone comment line
//!   -v, --verbose          Log frames as they are read
//!   -h, --help             Print help
//!   -V, --version          Print version

use libexyz::{
    parse_comment_line_with_context, read_frames_from, to_json, write_frames, CommentLine, Frame,
    Node, ParseContext, ParseError,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod transcode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Exyz,
    Json,
    Yaml,
    Toml,
    Cbor,
    CborDiag,
}

fn parse_format(s: &str) -> Option<Format> {
    match s {
        "exyz" | "xyz" | "extxyz" => Some(Format::Exyz),
        "json" => Some(Format::Json),
        "yaml" | "yml" => Some(Format::Yaml),
        "toml" => Some(Format::Toml),
        "cbor" => Some(Format::Cbor),
        "diag" => Some(Format::CborDiag),
        _ => None,
    }
}

/// What was read from the input.
enum Document {
    Frames(Vec<Frame>),
    CommentLines(Vec<CommentLine>),
}

impl Document {
    fn len(&self) -> usize {
        match self {
            Document::Frames(frames) => frames.len(),
            Document::CommentLines(lines) => lines.len(),
        }
    }

    fn to_node(&self) -> Node {
        match self {
            Document::Frames(frames) => Node::List(frames.iter().map(Frame::to_node).collect()),
            Document::CommentLines(lines) => {
                Node::List(lines.iter().map(CommentLine::to_node).collect())
            }
        }
    }

    /// Canonical extended XYZ text.
    fn to_exyz(&self) -> Result<String, ParseError> {
        match self {
            Document::Frames(frames) => {
                let mut out = Vec::new();
                write_frames(&mut out, frames)?;
                Ok(String::from_utf8_lossy(&out).into_owned())
            }
            Document::CommentLines(lines) => {
                let mut out = String::new();
                for line in lines {
                    out.push_str(&line.encode()?);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut to_format = Format::Exyz;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut comment_mode = false;
    let mut verbose = false;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("exyz {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                to_format = match parse_format(&args[i]) {
                    Some(format) => format,
                    None => {
                        eprintln!("Error: Unknown format: {}", args[i]);
                        process::exit(1);
                    }
                };
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "--check" => {
                check_only = true;
            }
            "-c" | "--comment" => {
                comment_mode = true;
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    init_logging(verbose);

    let raw_bytes: Vec<u8> = match input_path {
        Some(path) => match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    let exit_code = process_input(
        &raw_bytes,
        input_path,
        to_format,
        output_file,
        check_only,
        comment_mode,
    );
    process::exit(exit_code);
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "exyz=debug,libexyz=debug"
    } else {
        "exyz=warn,libexyz=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn read_document(
    input: &[u8],
    filename: Option<&str>,
    comment_mode: bool,
) -> Result<Document, ParseError> {
    if !comment_mode {
        return read_frames_from(input, filename).map(Document::Frames);
    }

    let text = std::str::from_utf8(input)
        .map_err(|e| ParseError::Generic(format!("input is not valid UTF-8: {}", e)))?;
    let ctx = ParseContext::new(filename);
    let mut lines = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        lines.push(parse_comment_line_with_context(line, &ctx.at_line(number))?);
    }
    Ok(Document::CommentLines(lines))
}

fn process_input(
    input: &[u8],
    input_file: Option<&str>,
    to_format: Format,
    output_file: Option<&str>,
    check_only: bool,
    comment_mode: bool,
) -> i32 {
    let filename = input_file.map(|p| {
        Path::new(p)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| p.to_string())
    });

    let document = match read_document(input, filename.as_deref(), comment_mode) {
        Ok(document) => document,
        Err(e) => {
            if let Some(path) = input_file {
                eprintln!("{}: {}", path, e);
            } else {
                eprintln!("Parse error: {}", e);
            }
            return 1;
        }
    };
    debug!(count = document.len(), comment_mode, "read input");

    if check_only {
        println!("{}: ok", input_file.unwrap_or("<stdin>"));
        return 0;
    }

    match to_format {
        Format::Exyz => match document.to_exyz() {
            Ok(output) => write_text_output(&output, output_file),
            Err(e) => {
                eprintln!("Error: Cannot write extended XYZ: {}", e);
                return 1;
            }
        },
        Format::Json => write_text_output(&to_json(&document.to_node()), output_file),
        Format::Yaml => match transcode::yaml::encode(&document.to_node()) {
            Ok(output) => write_text_output(&output, output_file),
            Err(e) => {
                eprintln!("Error: Cannot convert to YAML: {}", e);
                return 1;
            }
        },
        Format::Toml => match transcode::toml::encode(&document.to_node()) {
            Ok(output) => write_text_output(&output, output_file),
            Err(e) => {
                eprintln!("Error: Cannot convert to TOML: {}", e);
                return 1;
            }
        },
        Format::Cbor => {
            write_binary_output(&transcode::cbor::encode(&document.to_node()), output_file)
        }
        Format::CborDiag => {
            // Render from the encoded bytes so the text shows the wire form.
            let bytes = transcode::cbor::encode(&document.to_node());
            match transcode::cbor::diagnostic(&bytes) {
                Ok(output) => write_text_output(&output, output_file),
                Err(e) => {
                    eprintln!("Error: Cannot render CBOR diagnostic notation: {}", e);
                    return 1;
                }
            }
        }
    }

    0
}

fn write_text_output(output: &str, output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else {
        print!("{}", output);
        // Ensure output ends with newline
        if !output.ends_with('\n') {
            println!();
        }
    }
}

fn write_binary_output(output: &[u8], output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = handle.write_all(output) {
            eprintln!("Error writing to stdout: {}", e);
            process::exit(1);
        }
    }
}

fn print_help() {
    println!(
        "exyz - Extended XYZ command-line tool

USAGE:
    exyz [OPTIONS] [FILE]

ARGS:
    [FILE]    Input trajectory (reads from stdin if not provided or '-')

OPTIONS:
    -t, --to <FORMAT>      Output format [default: exyz]
                           Supported: exyz, json, yaml, toml, cbor, diag

                           'exyz' rewrites the input in canonical extended XYZ.
                           TOML output wraps the frames in a [[frames]] array
                           of tables.

    -o, --output <FILE>    Write output to specified file

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    -c, --comment          Read each non-empty line as a standalone comment line
                           instead of reading frames

    -v, --verbose          Log frames as they are read (RUST_LOG overrides)

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Validate a trajectory
    exyz --check traj.xyz

    # Rewrite a trajectory in canonical form
    exyz traj.xyz -o clean.xyz

    # Convert a trajectory to JSON
    exyz -t json traj.xyz

    # Convert a trajectory to YAML
    exyz -t yaml traj.xyz

    # Convert a trajectory to CBOR (binary)
    exyz -t cbor traj.xyz -o traj.cbor

    # View the CBOR encoding in diagnostic notation (RFC 8949 §8)
    exyz -t diag traj.xyz

    # Inspect comment lines on their own
    echo 'Properties=species:S:1:pos:R:3 energy=-1.5' | exyz -c -t json"
    );
}
