fn main() {
    if let Err(e) = segment_rules::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
