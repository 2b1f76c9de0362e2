//! Test harness for the extended XYZ reader against fixture files.
//!
//! Every .exyz file under test/exyz/ is read and its frames are compared,
//! as JSON, against test/json/<name>.json. Every .nay file under test/nay/
//! must fail with the message stored in the matching .error file.

use std::fs;
use std::path::{Path, PathBuf};

use libexyz::{read_frames_from, to_json, write_frames, Frame, Node};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files matching `*.<ext>` in a subdirectory of test/, sorted.
fn fixture_files(subdir: &str, ext: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(subdir).join(format!("*.{}", ext));
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .unwrap()
        .flatten()
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// Read a sibling file with the same stem.
fn read_expected(dir: &str, path: &Path, ext: &str) -> Option<String> {
    let stem = path.file_stem().unwrap().to_string_lossy();
    fs::read_to_string(test_root().join(dir).join(format!("{}.{}", stem, ext))).ok()
}

fn frames_json(frames: &[Frame]) -> String {
    to_json(&Node::List(frames.iter().map(Frame::to_node).collect()))
}

/// Run a single .exyz file (expected to succeed).
fn run_exyz_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content = fs::read(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let frames = read_frames_from(content.as_slice(), Some(&filename))
        .map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;

    let actual = frames_json(&frames);
    match read_expected("json", path, "json") {
        Some(expected) => {
            if actual.trim() != expected.trim() {
                return Err(format!(
                    "{}: Output mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual
                ));
            }
            println!("  {} => {} frames", filename, frames.len());
        }
        None => println!("  {} => {} (no expected output)", filename, actual),
    }

    // Writing the frames back must give the same frames.
    let mut written = Vec::new();
    write_frames(&mut written, &frames).map_err(|e| format!("{}: Write error: {}", filename, e))?;
    let reread = read_frames_from(written.as_slice(), None)
        .map_err(|e| format!("{}: Re-read error: {}", filename, e))?;
    if reread != frames {
        return Err(format!("{}: Frames changed after writing", filename));
    }
    Ok(())
}

/// Run a single .nay file (expected to fail with a specific error).
fn run_nay_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content = fs::read(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    match read_frames_from(content.as_slice(), Some(&filename)) {
        Ok(frames) => Err(format!(
            "{}: Expected parse error, but got success: {:?}",
            filename, frames
        )),
        Err(e) => {
            let actual = e.to_string();
            match read_expected("nay", path, "error") {
                Some(expected) if actual == expected.trim() => {
                    println!("  {} => error (as expected)", filename);
                    Ok(())
                }
                Some(expected) => Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual
                )),
                None => {
                    println!(
                        "  {} => error: {} (no .error file to compare)",
                        filename, actual
                    );
                    Ok(())
                }
            }
        }
    }
}

fn run_all(kind: &str, files: &[PathBuf], run: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "No .{} test files found!", kind);
    println!("\nRunning {} .{} test files:", files.len(), kind);

    let mut passed = 0;
    let mut failed = 0;
    let mut errors: Vec<String> = Vec::new();

    for file in files {
        match run(file) {
            Ok(()) => passed += 1,
            Err(e) => {
                failed += 1;
                errors.push(e);
            }
        }
    }

    println!("\nResults: {} passed, {} failed", passed, failed);

    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(failed == 0, "{} .{} tests failed", failed, kind);
}

#[test]
fn test_all_exyz_fixtures() {
    run_all("exyz", &fixture_files("exyz", "exyz"), run_exyz_test);
}

#[test]
fn test_all_nay_fixtures() {
    run_all("nay", &fixture_files("nay", "nay"), run_nay_test);
}
