use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset)"),
        }
        match self.randomness {
            Some(randomness) => println!("  randomness: {randomness}"),
            None => println!("  randomness: (unset)"),
        }
        match self.stream_enabled() {
            true => println!("  stream: on"),
            false => println!("  stream: off"),
        }
        match &self.log_file {
            Some(path) => println!("  log-file: {path}"),
            None => println!("  log-file: (unset)"),
        }
    }
}
