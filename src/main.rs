fn main() {
    if let Err(e) = parkmap_lib::run() {
        eprintln!("parkmap: {e}");
        std::process::exit(1);
    }
}
