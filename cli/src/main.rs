use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use tidewire::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tw")]
#[command(about = "Check, generate Rust from, or run tidewire schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tracing filter, e.g. `info` or `tidewire_compiler=debug`
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum EndianArg {
    Big,
    Little,
}

impl From<EndianArg> for Endian {
    fn from(endian: EndianArg) -> Endian {
        match endian {
            EndianArg::Big => Endian::Big,
            EndianArg::Little => Endian::Little,
        }
    }
}

#[derive(Args)]
struct BufferArgs {
    /// Byte order of multi-byte values
    #[arg(long, value_enum, default_value = "big")]
    endian: EndianArg,

    /// Buffer capacity in bytes (at least 1)
    #[arg(long, default_value_t = DEFAULT_CAPACITY, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    capacity: usize,
}

impl BufferArgs {
    fn config(&self) -> BufferConfig {
        BufferConfig::new(self.endian.into(), self.capacity)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a `.tw` schema and print a JSON summary of its messages
    Check {
        /// Input `.tw` schema file
        schema: PathBuf,
    },

    /// Generate Rust code from a `.tw` schema
    GenRust {
        /// Input `.tw` schema file
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.rs` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode a JSON record and print the bytes as hex
    Encode {
        /// Input `.tw` schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Message to encode
        #[arg(short, long)]
        message: String,

        /// JSON file holding the record
        #[arg(short, long)]
        input: PathBuf,

        /// Prefix the output with the message discriminant in this primitive
        #[arg(long)]
        tag: Option<String>,

        #[command(flatten)]
        buffer: BufferArgs,
    },

    /// Decode bytes (hex text by default) and print the record as JSON
    Decode {
        /// Input `.tw` schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Message to decode; required unless `--tag` is given
        #[arg(short, long, required_unless_present = "tag")]
        message: Option<String>,

        /// Read a leading discriminant in this primitive and dispatch on it
        #[arg(long)]
        tag: Option<String>,

        /// File holding the bytes
        #[arg(short, long)]
        input: PathBuf,

        /// Treat the input as raw bytes rather than hex text
        #[arg(long)]
        binary: bool,

        #[command(flatten)]
        buffer: BufferArgs,
    },
}

fn load_container(path: &Path) -> Result<CompiledContainer, WireError> {
    let text = fs::read_to_string(path)?;
    let container = compile_source(&text, &Extensions::new())?;
    info!(schema = %path.display(), messages = container.len(), "compiled schema");
    Ok(container)
}

fn parse_tag(tag: &Option<String>) -> Result<Option<Primitive>, WireError> {
    match tag {
        None => Ok(None),
        Some(name) => match Primitive::from_name(name) {
            Some(primitive) => Ok(Some(primitive)),
            None => Err(CodecError::InvalidTag(name.clone()).into()),
        },
    }
}

fn read_input(path: &Path, binary: bool) -> Result<Vec<u8>, WireError> {
    if binary {
        return Ok(fs::read(path)?);
    }
    let text = fs::read_to_string(path)?;
    let digits: String = text.split_whitespace().collect();
    hex::decode(digits).map_err(|err| WireError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

fn main() -> Result<(), WireError> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Check { schema } => {
            let container = load_container(schema)?;
            println!("{}", serde_json::to_string_pretty(&container.summary())?);
            Ok(())
        }

        Commands::GenRust { input, output } => {
            let text = fs::read_to_string(input)?;
            let schema = parse_source(&text)?;
            let rust_code = compile_schema_to_rust(&schema)?;
            if let Some(out_path) = output {
                fs::write(out_path, &rust_code)?;
                println!("Generated Rust code written to {}", out_path.display());
            } else {
                print!("{}", rust_code);
            }
            Ok(())
        }

        Commands::Encode { schema, message, input, tag, buffer } => {
            let container = load_container(schema)?;
            let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(input)?)?;
            let record = container.record_from_json(message, &json)?;

            let mut out = buffer.config().linear();
            match parse_tag(tag)? {
                Some(tag) => container.encode_tagged(message, tag, &mut out, &record)?,
                None => container.encode(message, &mut out, &record)?,
            }
            debug!(message = %message, bytes = out.len(), "encoded record");
            println!("{}", hex::encode(out.to_byte_range()));
            Ok(())
        }

        Commands::Decode { schema, message, tag, input, binary, buffer } => {
            let container = load_container(schema)?;
            let bytes = read_input(input, *binary)?;

            let config = buffer.config();
            let mut ring = config.with_capacity(config.capacity.max(bytes.len())).ring();
            ring.add(&bytes)?;

            let (name, record) = match parse_tag(tag)? {
                Some(tag) => {
                    let (name, record) = container.decode_tagged(tag, &mut ring)?;
                    (name.to_owned(), record)
                }
                None => {
                    let message = message
                        .as_deref()
                        .ok_or_else(|| CodecError::UnknownMessage(String::new()))?;
                    (message.to_owned(), container.decode(message, &mut ring)?)
                }
            };
            if ring.remaining() > 0 {
                info!(message = %name, trailing = ring.remaining(), "ignoring trailing bytes");
            }
            println!("{}", serde_json::to_string_pretty(&record_to_json(&record))?);
            Ok(())
        }
    }
}
