use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "croplens",
    version,
    about = "Crop and fertilizer recommendations from soil, satellite and weather data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend a crop and fertilizer for a plot
    Recommend {
        /// Input field as KEY=VALUE (N, P, K, temperature, humidity, moisture,
        /// ph, rainfall, soiltype, latitude, longitude)
        #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Fill missing latitude/longitude from the caller's IP address
        #[arg(long)]
        auto_locate: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print approximate coordinates for this machine's public IP
    Locate,
    /// Validate config and load both model artifacts
    Check,
    /// Run interactive setup
    Init,
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recommend_fields() {
        let cli = Cli::parse_from([
            "croplens",
            "recommend",
            "-f",
            "N=90",
            "--field",
            "soiltype=Black",
            "--json",
        ]);
        match cli.command {
            Commands::Recommend { fields, json, auto_locate } => {
                assert_eq!(
                    fields,
                    vec![
                        ("N".to_string(), "90".to_string()),
                        ("soiltype".to_string(), "Black".to_string())
                    ]
                );
                assert!(json);
                assert!(!auto_locate);
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn rejects_field_without_equals() {
        assert!(parse_field("N90").is_err());
        assert!(parse_field("=90").is_err());
        assert_eq!(
            parse_field("ph=6.5").unwrap(),
            ("ph".to_string(), "6.5".to_string())
        );
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["croplens", "-vv", "check"]);
        assert_eq!(cli.verbose, 2);
    }
}
