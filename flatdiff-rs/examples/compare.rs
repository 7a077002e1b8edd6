//! Example: Compare two XML documents on a worker thread
//!
//! Streams progress to stderr and prints the differences.
//!
//! Usage: cargo run --example compare <left.xml> <right.xml>

use std::env;
use std::fs;

use xml_flatdiff::{spawn_compare, CompareEvent, CompareRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <left.xml> <right.xml>", args[0]);
        std::process::exit(1);
    }

    let request = CompareRequest::new(fs::read_to_string(&args[1])?, fs::read_to_string(&args[2])?);

    for event in spawn_compare(request)? {
        match event {
            CompareEvent::Progress(p) => eprintln!("[{:>3}%] {}", p.percent, p.message),
            CompareEvent::Completed(report) => {
                for record in &report.differences {
                    println!(
                        "{:<8} {} ({} -> {})",
                        record.status(),
                        record.key,
                        record.left_value().unwrap_or("-"),
                        record.right_value().unwrap_or("-")
                    );
                }
                eprintln!("{} differences", report.stats.total());
            }
            CompareEvent::Failed(failure) => {
                eprintln!("Comparison failed: {}", failure);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
