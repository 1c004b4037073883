fn main() {
    let code = sift_cli::run_from_env();
    std::process::exit(code);
}
