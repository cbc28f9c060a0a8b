use airport_lookup::{
    load_airports_with, load_regions_with, translate_image, AppConfig, LoadOptions,
    TranslatorClient, VisionClient,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "airport_lookup")]
#[command(about = "Look up regions and airports in reference CSV tables, or translate the text in a photo")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the state/province table
    Regions {
        /// CSV with a header row and `code,descriptor` rows
        regions: PathBuf,

        /// Only print these codes
        codes: Vec<String>,

        /// Reject descriptors with unexpected extra parts
        #[arg(long)]
        strict: bool,

        /// Print JSON instead of one line per record
        #[arg(long)]
        json: bool,
    },
    /// Print airports with their resolved city, state/province and country
    Airports {
        regions: PathBuf,

        airports: PathBuf,

        /// Only print these codes
        codes: Vec<String>,

        /// Reject descriptors that do not fit `city, region: name`
        #[arg(long)]
        strict: bool,

        /// Print JSON instead of one line per record
        #[arg(long)]
        json: bool,
    },
    /// Extract the text of an image and translate it
    Translate {
        image: PathBuf,

        /// Target language code, defaults to TRANSLATE_LANGUAGE or "en"
        #[arg(long, short)]
        language: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Regions {
            regions,
            codes,
            strict,
            json,
        } => {
            let regions = load_regions_with(&regions, LoadOptions { strict })
                .with_context(|| format!("loading regions from {}", regions.display()))?;
            print_selection(&regions, &codes, json)
        }
        Command::Airports {
            regions,
            airports,
            codes,
            strict,
            json,
        } => {
            let options = LoadOptions { strict };
            let regions = load_regions_with(&regions, options)
                .with_context(|| format!("loading regions from {}", regions.display()))?;
            let airports = load_airports_with(&airports, &regions, options)
                .with_context(|| format!("loading airports from {}", airports.display()))?;
            print_selection(&airports, &codes, json)
        }
        Command::Translate { image, language } => {
            let config = AppConfig::from_env()?;
            let bytes =
                fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
            let language = language.unwrap_or_else(|| config.default_language.clone());

            let vision = VisionClient::from_config(&config);
            let translator = TranslatorClient::from_config(&config);
            for line in translate_image(&vision, &translator, &bytes, &language) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

/// Prints the requested records (all of them, sorted by code, when `codes`
/// is empty). Unknown codes are reported after the known ones are printed.
fn print_selection<T>(table: &HashMap<String, T>, codes: &[String], json: bool) -> Result<()>
where
    T: Display + Serialize,
{
    let mut missing = Vec::new();
    let selected: Vec<&T> = if codes.is_empty() {
        let mut keys: Vec<&String> = table.keys().collect();
        keys.sort();
        keys.into_iter().map(|key| &table[key]).collect()
    } else {
        codes
            .iter()
            .filter_map(|code| {
                let found = table.get(code);
                if found.is_none() {
                    missing.push(code.as_str());
                }
                found
            })
            .collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
    } else {
        for record in &selected {
            println!("{}", record);
        }
    }

    if !missing.is_empty() {
        bail!("unknown code(s): {}", missing.join(", "));
    }
    Ok(())
}
