use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use linepos::mapper::stats;
use linepos::output::{self, Lookup};
use linepos::utils::{get_config_path, AppConfig};
use linepos::{open_mapper, MapError, PositionMapper, Strategy};
use log::{debug, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "linepos")]
#[command(about = "Map words to byte positions in sorted word lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read configuration from this file instead of the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the position of each key
    Encode {
        /// Sorted word list
        store: PathBuf,

        /// Keys to look up
        #[arg(required = true)]
        keys: Vec<String>,

        /// Mapping strategy
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the key at each position
    Decode {
        /// Sorted word list
        store: PathBuf,

        /// Byte positions of line starts
        #[arg(required = true, allow_negative_numbers = true)]
        positions: Vec<String>,

        /// Mapping strategy
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read keys (one per line) and write fixed-width positions
    Pack {
        /// Sorted word list
        store: PathBuf,

        /// Key file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mapping strategy
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Field width in bytes (1-8)
        #[arg(short, long)]
        byte_len: Option<usize>,
    },
    /// Read fixed-width positions and print their keys
    Unpack {
        /// Sorted word list
        store: PathBuf,

        /// Packed input (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Mapping strategy
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Field width in bytes (1-8)
        #[arg(short, long)]
        byte_len: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show word list statistics
    Stats {
        /// Sorted word list
        store: PathBuf,

        /// Encode every line through a cached mapper and report the cache shape
        #[arg(long)]
        warm_up: bool,
    },
    /// Check sortedness and that every strategy agrees on every line
    Verify {
        /// Word list to check
        store: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init,
    /// Print the configuration file path
    Path,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let color = config.color && !cli.no_color;

    match cli.command {
        Commands::Encode {
            store,
            keys,
            strategy,
            json,
        } => {
            let mapper = open_mapper(&store, strategy.unwrap_or(config.strategy))?;
            let lookups = keys
                .iter()
                .map(|key| -> Result<Lookup> {
                    Ok(Lookup::encoded(key, found(mapper.encode(key))?))
                })
                .collect::<Result<Vec<_>>>()?;
            print_lookups(&lookups, color, json)?;
        }
        Commands::Decode {
            store,
            positions,
            strategy,
            json,
        } => {
            let mapper = open_mapper(&store, strategy.unwrap_or(config.strategy))?;
            let lookups = positions
                .iter()
                .map(|query| decode_query(mapper.as_ref(), query))
                .collect::<Result<Vec<_>>>()?;
            print_lookups(&lookups, color, json)?;
        }
        Commands::Pack {
            store,
            input,
            output,
            strategy,
            byte_len,
        } => {
            let config = AppConfig {
                byte_len: byte_len.unwrap_or(config.byte_len),
                ..config
            };
            let mapper = open_mapper(&store, strategy.unwrap_or(config.strategy))?;
            let reader = open_input(input.as_deref())?;
            let writer: Box<dyn Write> = match output {
                Some(path) => Box::new(
                    File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                ),
                None => Box::new(io::stdout().lock()),
            };
            let count = pack(
                mapper.as_ref(),
                &config,
                BufReader::new(reader),
                BufWriter::new(writer),
            )?;
            debug!("packed {} keys", count);
        }
        Commands::Unpack {
            store,
            input,
            strategy,
            byte_len,
            json,
        } => {
            let config = AppConfig {
                byte_len: byte_len.unwrap_or(config.byte_len),
                ..config
            };
            let mapper = open_mapper(&store, strategy.unwrap_or(config.strategy))?;
            let reader = open_input(input.as_deref())?;
            let lookups = unpack(mapper.as_ref(), &config, BufReader::new(reader))?;
            print_lookups(&lookups, color, json)?;
        }
        Commands::Stats { store, warm_up } => {
            stats::show_stats(&store, warm_up)?;
        }
        Commands::Verify { store, json } => {
            let report = stats::verify_store(&store)?;
            output::print_verify_report(&report, color, json)?;
            if !report.is_ok() {
                bail!("{} failed verification", store.display());
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::Init => {
                let path = match cli.config {
                    Some(path) => {
                        AppConfig::default().save_to(&path)?;
                        path
                    }
                    None => AppConfig::default().save()?,
                };
                println!("Wrote {}", path.display());
            }
            ConfigAction::Path => {
                println!("{}", get_config_path()?.display());
            }
        },
    }

    Ok(())
}

/// A missing config file means defaults. An explicit file that exists must
/// parse; the default location falls back to defaults on any error.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) if path.exists() => AppConfig::load_from(path),
        Some(path) => {
            debug!("{} does not exist, using defaults", path.display());
            Ok(AppConfig::default())
        }
        None => Ok(AppConfig::load().unwrap_or_else(|e| {
            warn!("using default configuration: {:#}", e);
            AppConfig::default()
        })),
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    })
}

/// Turn a not-found outcome into `None`, keep real failures as errors
fn found<T>(result: linepos::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn decode_query(mapper: &dyn PositionMapper, query: &str) -> Result<Lookup> {
    let signed: i64 = query
        .trim()
        .parse()
        .with_context(|| format!("Invalid position: {:?}", query))?;

    // negative positions never name a line
    let Ok(position) = u64::try_from(signed) else {
        return Ok(Lookup::decoded(query, None, None));
    };

    let key = found(mapper.decode(position))?;
    Ok(Lookup::decoded(query, Some(position), key))
}

fn pack<R: BufRead, W: Write>(
    mapper: &dyn PositionMapper,
    config: &AppConfig,
    reader: R,
    mut writer: W,
) -> Result<usize> {
    let codec = config.codec()?;
    let mut count = 0;

    for line in reader.lines() {
        let key = line.context("Failed to read key")?;
        let position = match mapper.encode(&key) {
            Ok(position) => position,
            Err(MapError::EncodeNotFound(key)) => bail!("Key not found: {:?}", key),
            Err(e) => return Err(e.into()),
        };
        if !codec.fits(position) {
            bail!(
                "Position {} of {:?} does not fit in {} bytes",
                position,
                key,
                codec.byte_len()
            );
        }
        codec.encode_to(&mut writer, position)?;
        count += 1;
    }

    writer.flush()?;
    Ok(count)
}

fn unpack<R: Read>(
    mapper: &dyn PositionMapper,
    config: &AppConfig,
    mut reader: R,
) -> Result<Vec<Lookup>> {
    let codec = config.codec()?;
    let mut lookups = Vec::new();

    while let Some(position) = codec
        .decode_from(&mut reader)
        .context("Failed to read packed input")?
    {
        let key = found(mapper.decode(position))?;
        lookups.push(Lookup::decoded(&position.to_string(), Some(position), key));
    }

    Ok(lookups)
}

fn print_lookups(lookups: &[Lookup], color: bool, json: bool) -> io::Result<()> {
    if json {
        output::print_lookups_json(lookups)
    } else {
        output::print_lookups(lookups, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linepos::FullIndexMapper;

    const WORDS: &[u8] = b"a\nbcd\nefg\nhijk\n";

    #[test]
    fn test_decode_query() {
        let mapper = FullIndexMapper::from_reader(WORDS).unwrap();
        let hit = decode_query(&mapper, "2").unwrap();
        assert_eq!(hit.key.as_deref(), Some("bcd"));

        let negative = decode_query(&mapper, "-1").unwrap();
        assert!(!negative.found);
        assert_eq!(negative.position, None);

        assert!(!decode_query(&mapper, "15").unwrap().found);
        assert!(decode_query(&mapper, "abc").is_err());
    }

    #[test]
    fn test_pack_and_unpack() {
        let mapper = FullIndexMapper::from_reader(WORDS).unwrap();
        let config = AppConfig::default();

        let mut packed = Vec::new();
        let count = pack(&mapper, &config, &b"hijk\na\n"[..], &mut packed).unwrap();
        assert_eq!(count, 2);
        assert_eq!(packed, vec![0, 0, 10, 0, 0, 0]);

        let lookups = unpack(&mapper, &config, packed.as_slice()).unwrap();
        let keys: Vec<_> = lookups.iter().map(|l| l.key.clone().unwrap()).collect();
        assert_eq!(keys, vec!["hijk", "a"]);
    }

    #[test]
    fn test_pack_rejects_missing_and_oversized() {
        let mapper = FullIndexMapper::from_reader(WORDS).unwrap();
        let config = AppConfig::default();
        assert!(pack(&mapper, &config, &b"zzz\n"[..], Vec::new()).is_err());

        let narrow = AppConfig {
            byte_len: 1,
            ..Default::default()
        };
        let big: String = (0..100).map(|i| format!("k{i:03}\n")).collect();
        let mapper = FullIndexMapper::from_reader(big.as_bytes()).unwrap();
        assert!(pack(&mapper, &narrow, &b"k099\n"[..], Vec::new()).is_err());
    }

    #[test]
    fn test_unpack_truncated_input() {
        let mapper = FullIndexMapper::from_reader(WORDS).unwrap();
        let config = AppConfig::default();
        assert!(unpack(&mapper, &config, &[0u8, 0, 2, 0][..]).is_err());
    }
}
