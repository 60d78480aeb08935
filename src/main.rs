use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use vcard_qr::config::{self, EngineConfig};
use vcard_qr::contact::ContactRecord;
use vcard_qr::imaging::DefaultLogoSource;
use vcard_qr::output::{self, BatchOutcome};
use vcard_qr::{synthesis, vcard};

#[derive(Parser)]
#[command(name = "vcard-qr")]
#[command(about = "Styled QR codes for contact cards")]
#[command(long_about = "\
Styled QR codes for contact cards

Contacts are JSON objects:

  {
    \"first_name\": \"John\",
    \"last_name\": \"Doe\",
    \"email\": \"john@x.com\",
    \"mobile_number\": \"9876543210\",
    \"address\": { \"city\": \"Mumbai\", \"country\": \"India\" }
  }

Only first_name and last_name are required. Phone numbers are normalized to
+<digits>; 10-digit numbers get the default country code.

Colors, pattern style, error correction and logo come from the [design]
table of the config file. Run 'vcard-qr gen-config' for a documented one.")]
#[command(version)]
struct Cli {
    /// Config file (vcard-qr.toml); stock defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log pipeline decisions (ECC fallback, logo handling) to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one contact to a PNG file
    Generate {
        /// Contact record (JSON object)
        #[arg(long)]
        contact: PathBuf,
        /// PNG file to write
        #[arg(long)]
        output: PathBuf,
        /// Encode a tracked `{URL}/r/{tracking_id}` link instead of the card
        #[arg(long)]
        redirect_base: Option<String>,
    },
    /// Print the vCard payload for a contact
    Payload {
        /// Contact record (JSON object)
        #[arg(long)]
        contact: PathBuf,
    },
    /// Render every contact of a JSON array into a directory
    Batch {
        /// Contact records (JSON array)
        #[arg(long)]
        contacts: PathBuf,
        /// Directory for the PNG files (created if missing)
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Print a stock vcard-qr.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Generate {
            contact,
            output: target,
            redirect_base,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let record: ContactRecord = read_json(&contact)?;
            let source = DefaultLogoSource::new(config.logo.fetch_timeout());
            let result = match redirect_base {
                Some(base) => {
                    synthesis::synthesize_redirect(&base, &record, &config.design, &source)?
                }
                None => synthesis::synthesize_with(&record, &config.design, &source)?,
            };
            std::fs::write(&target, &result.png)?;
            output::print_synthesis(&record, &target, &result, config.design.logo_url.is_some());
        }
        Command::Payload { contact } => {
            let record: ContactRecord = read_json(&contact)?;
            println!("{}", vcard::encode(&record)?);
        }
        Command::Batch { contacts, out_dir } => {
            let config = config::load_config(cli.config.as_deref())?;
            let records: Vec<ContactRecord> = read_json(&contacts)?;
            std::fs::create_dir_all(&out_dir)?;
            init_thread_pool(&config);
            batch(&records, &config, &out_dir)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn batch(
    records: &[ContactRecord],
    config: &EngineConfig,
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = DefaultLogoSource::new(config.logo.fetch_timeout());
    let results = synthesis::synthesize_all(records, &config.design, &source);

    let (mut written, mut failed) = (0, 0);
    for (i, (record, result)) in records.iter().zip(&results).enumerate() {
        let index = i + 1;
        match result {
            Ok(synthesis) => {
                let target = out_dir.join(output::batch_file_name(index, record));
                std::fs::write(&target, &synthesis.png)?;
                written += 1;
                output::print_batch_entry(
                    index,
                    record,
                    &BatchOutcome::Written {
                        target: &target,
                        result: synthesis,
                    },
                );
            }
            Err(err) => {
                failed += 1;
                output::print_batch_entry(index, record, &BatchOutcome::Failed(err.to_string()));
            }
        }
    }

    println!();
    println!("{}", output::format_batch_summary(written, failed));
    if failed > 0 {
        return Err(format!("{failed} of {} contacts failed", records.len()).into());
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {e}", path.display()).into())
}

/// Warnings (degraded ECC, skipped logo) by default; everything with
/// `--verbose`. `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(config: &EngineConfig) {
    let threads = config::effective_threads(&config.processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
