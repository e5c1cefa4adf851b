fn main() {
    if let Err(err) = blogchat::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
