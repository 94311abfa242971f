fn main() {
    if let Err(err) = claims_cleaner::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
