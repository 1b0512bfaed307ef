//! Command-line interface definitions for Blog Digest.
//!
//! The binary takes no required arguments: running it with no flags pulls
//! the default feed and runs the whole batch. A YAML config file can be
//! supplied to point at another feed, move the output files or adjust the
//! extraction cascades.

use clap::Parser;

/// Command-line arguments for the Blog Digest application.
///
/// # Examples
///
/// ```sh
/// # Run the full batch with built-in defaults
/// blog_digest
///
/// # Use a config file
/// blog_digest -c ./digest.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "BLOG_DIGEST_CONFIG")]
    pub config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_without_flags() {
        let cli = Cli::parse_from(["blog_digest"]);
        // the env var may be set on a developer machine
        if std::env::var_os("BLOG_DIGEST_CONFIG").is_none() {
            assert_eq!(cli.config, None);
        }
    }

    #[test]
    fn test_cli_short_flag() {
        let cli = Cli::parse_from(["blog_digest", "-c", "/tmp/digest.yaml"]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/digest.yaml"));
    }

    #[test]
    fn test_cli_long_flag() {
        let cli = Cli::parse_from(["blog_digest", "--config", "digest.yaml"]);
        assert_eq!(cli.config.as_deref(), Some("digest.yaml"));
    }
}
