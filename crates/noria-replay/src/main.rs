#![forbid(unsafe_code)]

fn main() {
    noria_replay::init_logging();
    if let Err(error) = noria_replay::run_from_env() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
