use fintrack::cli::run_cli;

fn main() {
    // Tracing is initialized once the config (and its log filter) is loaded.
    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
