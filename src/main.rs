use std::env;
use std::fs;
use std::process;

use ultrastar_txt::{Log, SongTxt};

/// Prints parser and fix messages to stderr; debug messages only when
/// verbose output was requested.
struct StderrLog {
    verbose: bool,
}

impl Log for StderrLog {
    fn error(&self, msg: &str) {
        eprintln!("error: {msg}");
    }

    fn warn(&self, msg: &str) {
        eprintln!("warning: {msg}");
    }

    fn info(&self, msg: &str) {
        eprintln!("{msg}");
    }

    fn debug(&self, msg: &str) {
        if self.verbose {
            eprintln!("{msg}");
        }
    }
}

fn usage() -> ! {
    eprintln!("Usage: ultrastar-txt [--no-fix] [--lyrics] [--verbose] <input.txt> [output.txt]");
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut no_fix = false;
    let mut lyrics = false;
    let mut verbose = false;
    let mut paths: Vec<&String> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "--no-fix" => no_fix = true,
            "--lyrics" => lyrics = true,
            "--verbose" => verbose = true,
            _ => paths.push(arg),
        }
    }
    if paths.is_empty() || paths.len() > 2 {
        usage();
    }

    let source = match fs::read_to_string(paths[0]) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", paths[0], e);
            process::exit(1);
        }
    };

    let log = StderrLog { verbose };
    let mut song = match SongTxt::parse(&source, &log) {
        Ok(song) => song,
        Err(e) => {
            eprintln!("Parse error: {e}");
            process::exit(1);
        }
    };

    if !no_fix {
        song.fix(&log);
    }

    if lyrics {
        let synced = song.synchronized_lyrics();
        match serde_json::to_string_pretty(&synced) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error encoding lyrics: {e}");
                process::exit(1);
            }
        }
        return;
    }

    match paths.get(1) {
        Some(path) => {
            if let Err(e) = fs::write(path, format!("{song}\n")) {
                eprintln!("Error writing to '{path}': {e}");
                process::exit(1);
            }
            eprintln!(
                "Wrote {} ({})",
                path,
                song.headers.artist_title_str()
            );
        }
        None => println!("{song}"),
    }
}
