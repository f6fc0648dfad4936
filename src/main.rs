fn main() {
    if let Err(err) = voicelog_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
