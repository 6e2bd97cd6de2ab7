use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to .env file (e.g., .env.kusama)
    #[arg(short, long, default_value = ".env")]
    pub env_file: String,

    /// Run a single balance cycle and exit
    #[arg(long, default_value_t = false)]
    pub once: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["account-monitor"]);
        assert_eq!(args.env_file, ".env");
        assert!(!args.once);
    }

    #[test]
    fn test_custom_env_file_and_once() {
        let args = Args::parse_from(["account-monitor", "-e", ".env.polkadot", "--once"]);
        assert_eq!(args.env_file, ".env.polkadot");
        assert!(args.once);
    }
}
