use std::env;

fn main() {
    escouade::logging::init();
    let args: Vec<String> = env::args().collect();
    std::process::exit(escouade::cli::run_with_args(&args));
}
