//! Remove the white background from a single icon.
//!
//! Usage:
//! ```sh
//! cargo run --example remove_background -- input.png output.png
//! ```

use std::env;
use std::process;

use icon_bg_removal::{BackgroundRemover, RemovalOptions};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output>", args[0]);
        process::exit(1);
    }

    let input = &args[1];
    let output = &args[2];

    let remover = BackgroundRemover::new(RemovalOptions::default()).expect("default options are valid");
    let result = remover.process_file(input.as_ref(), output.as_ref());

    if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
