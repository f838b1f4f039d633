fn main() {
    if let Err(err) = wallet_sim::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
