//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod blog_list;
pub mod say;
pub mod settings;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::cli::blog_list::list_blogs;
use crate::cli::say::{run_say, SayOptions};
use crate::cli::settings::{apply_set, apply_unset, parse_randomness};
use crate::core::config::Config;
use crate::utils::logging::init_tracing;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "blogchat")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal client for a blog-generation agent")]
#[command(
    long_about = "blogchat sends a prompt to a blog-generation agent and prints the \
answer as it streams in. Overlapping fragments resent by the server are trimmed so \
the printed text grows without repetition.\n\n\
Environment Variables:\n\
  BLOGCHAT_API_URL     Base URL of the agent API (defaults to http://localhost:8000)\n\
  BLOGCHAT_CONFIG_DIR  Directory holding config.toml\n\
  RUST_LOG             Log filter for diagnostics written to stderr\n\n\
Controls:\n\
  Ctrl+C               Cancel the request in flight"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Append prompts and answers to the specified transcript file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Base URL of the blog-generation API
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Print debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a prompt and print the generated blog
    Say {
        /// Topic to generate for (defaults to the prompt itself)
        #[arg(short = 't', long)]
        topic: Option<String>,
        /// Randomness between 0.0 and 1.0
        #[arg(short = 'r', long, value_parser = randomness_arg)]
        randomness: Option<f64>,
        /// Wait for the whole answer instead of streaming it
        #[arg(long)]
        no_stream: bool,
        /// The prompt to send
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
    /// List previously generated blogs
    List,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

fn randomness_arg(input: &str) -> Result<f64, String> {
    parse_randomness(input).ok_or_else(|| "expected a number between 0.0 and 1.0".to_string())
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Say {
            topic,
            randomness,
            no_stream,
            prompt,
        } => {
            run_say(SayOptions {
                prompt,
                topic,
                randomness,
                no_stream,
                url: args.url,
                log: args.log,
            })
            .await
        }
        Commands::List => list_blogs(args.url).await,
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match value {
                Some(value) if !value.is_empty() => {
                    match apply_set(&mut config, &key, &value) {
                        Ok(message) => {
                            config.save()?;
                            println!("{message}");
                        }
                        Err(err) => {
                            err.print();
                            std::process::exit(1);
                        }
                    }
                }
                _ => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match apply_unset(&mut config, &key) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                }
                Err(err) => {
                    err.print();
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Config => {
            let config = Config::load()?;
            config.print_all();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn say_collects_trailing_prompt_words() {
        let args = Args::try_parse_from([
            "blogchat", "say", "-t", "rust", "-r", "0.3", "write", "about", "--ownership",
        ])
        .expect("parse");

        match args.command {
            Commands::Say {
                topic,
                randomness,
                no_stream,
                prompt,
            } => {
                assert_eq!(topic.as_deref(), Some("rust"));
                assert_eq!(randomness, Some(0.3));
                assert!(!no_stream);
                assert_eq!(prompt, vec!["write", "about", "--ownership"]);
            }
            _ => panic!("expected say command"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let args =
            Args::try_parse_from(["blogchat", "list", "--url", "http://agent:9000", "-v"])
                .expect("parse");
        assert!(matches!(args.command, Commands::List));
        assert_eq!(args.url.as_deref(), Some("http://agent:9000"));
        assert!(args.verbose);
    }

    #[test]
    fn out_of_range_randomness_is_rejected() {
        assert!(Args::try_parse_from(["blogchat", "say", "-r", "2", "hello"]).is_err());
    }

    #[test]
    fn say_requires_a_prompt() {
        assert!(Args::try_parse_from(["blogchat", "say"]).is_err());
    }
}
