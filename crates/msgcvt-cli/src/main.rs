/// msgcvt: convert messages between encodings and inspect AvroX containers.
///
/// # Command overview
///
/// ```text
/// msgcvt [OPTIONS] [COMMAND]
///
/// Commands:
///   translate (t)  Render input as raw / quoted / hex / hexdump / JSON (default)
///   analyse        Pass input through and report what it is on stderr
///   avrox          Wrap literal input into an AvroX basic container
///
/// Input (first match wins):
///   -d, --data STRING   literal string
///   -x, --hex HEX       literal hex-encoded bytes
///   -f, --file PATH     file
///                       otherwise stdin
///
/// Decompression (first match wins):
///   --snappy, --snappy-stream, --gzip, --deflate
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                       |
/// |------|-----------------------------------------------|
/// | 0    | Success                                       |
/// | 1    | Error (I/O, decode, parse failure)            |
/// | 2    | Invalid command line                          |
/// | 5    | Internal fault (panic caught at the top)      |
///
/// Findings and errors go to stderr so stdout can be piped cleanly.
use std::any::Any;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process;
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use msgcvt_driver::Decompression;
use tracing_subscriber::EnvFilter;

mod cmd_analyse;
mod cmd_avrox;
mod cmd_translate;

const EXIT_ERROR: i32 = 1;
const EXIT_FAULT: i32 = 5;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Convert data between message encodings.
#[derive(Parser)]
#[command(name = "msgcvt", version, about = "Convert data between message encodings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    decompress: DecompressArgs,

    /// Log debug details (decompression, AVSC scanning) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where the input bytes come from.
#[derive(clap::Args)]
struct InputArgs {
    /// Read from the given string.
    #[arg(short, long, global = true, value_name = "STRING")]
    data: Option<String>,

    /// Read from the given hex-encoded bytes.
    #[arg(short = 'x', long = "hex", global = true, value_name = "HEX", value_parser = parse_hex)]
    hex: Option<HexBytes>,

    /// Read from the given file.
    #[arg(short, long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct HexBytes(Vec<u8>);

fn parse_hex(s: &str) -> Result<HexBytes, hex::FromHexError> {
    hex::decode(s).map(HexBytes)
}

#[derive(clap::Args)]
struct DecompressArgs {
    /// Decompress snappy block data (the input is used as-is if it is not snappy).
    #[arg(long, global = true)]
    snappy: bool,

    /// Decompress snappy framed stream data.
    #[arg(long, global = true)]
    snappy_stream: bool,

    /// Decompress gzip data.
    #[arg(long, global = true)]
    gzip: bool,

    /// Decompress raw DEFLATE data.
    #[arg(long, global = true)]
    deflate: bool,
}

impl DecompressArgs {
    fn selected(&self) -> Decompression {
        Decompression::from_flags(self.snappy, self.snappy_stream, self.gzip, self.deflate)
    }
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Translate input to a human readable output (default).
    #[command(visible_alias = "t")]
    Translate(TranslateArgs),
    /// Pass input through unchanged and report what it is on stderr.
    Analyse(AnalyseArgs),
    /// Create an AvroX basic container from literal input.
    Avrox(AvroxArgs),
}

#[derive(clap::Args, Default)]
pub struct TranslateArgs {
    #[command(subcommand)]
    pub format: Option<Format>,
}

/// Output format of `msgcvt translate`.
///
/// ```text
/// ┌───────────┬───────┬───────────────────────────────────────────────┐
/// │ Format    │ Alias │ Output                                        │
/// ├───────────┼───────┼───────────────────────────────────────────────┤
/// │ raw       │ r     │ unchanged bytes, AvroX basics unwrapped       │
/// │ quote     │ q     │ escaped double-quoted string                  │
/// │ hex       │ h     │ lowercase hex                                 │
/// │ hexdump   │ d     │ offset / hex / ASCII columns                  │
/// │ cbor      │       │ pretty JSON                                   │
/// │ gob       │       │ unsupported                                   │
/// │ avro FILE │       │ pretty JSON decoded with the given schema     │
/// └───────────┴───────┴───────────────────────────────────────────────┘
/// ```
#[derive(Subcommand)]
pub enum Format {
    /// Quote output string (escapes).
    #[command(visible_alias = "q")]
    Quote(DetectArgs),
    /// No translation, but AvroX basics are unwrapped.
    #[command(visible_alias = "r")]
    Raw(RawArgs),
    /// Output data as lowercase hex.
    #[command(visible_alias = "h")]
    Hex(DetectArgs),
    /// Output data as a hex dump.
    #[command(visible_alias = "d")]
    Hexdump,
    /// Output CBOR as JSON.
    Cbor,
    /// Output GOB as JSON (not supported).
    Gob,
    /// Output an Avro datum as JSON using the given schema file.
    Avro(AvroArgs),
}

/// AvroX detection flags shared by the text formats.
#[derive(clap::Args, Default)]
pub struct DetectArgs {
    /// Do not check for AvroX containers.
    #[arg(long)]
    pub no_avrox: bool,

    /// Paths scanned recursively for `.avsc` files used to decode non-basic
    /// AvroX containers.
    #[arg(long = "avsc", value_name = "PATH")]
    pub avsc: Vec<PathBuf>,

    /// Decode AvroX basics like any other container.
    #[arg(short = 'b', long)]
    pub no_basics: bool,

    /// Print decimals as the nearest float instead of a fraction.
    #[arg(long)]
    pub decimal_float: bool,
}

#[derive(clap::Args, Default)]
pub struct RawArgs {
    /// Make sure the output ends with a line feed.
    #[arg(short = 'l', long)]
    pub ensure_lf: bool,

    #[command(flatten)]
    pub detect: DetectArgs,
}

#[derive(clap::Args)]
pub struct AvroArgs {
    /// Avro schema file.
    pub schema: PathBuf,
}

#[derive(clap::Args)]
pub struct AnalyseArgs {
    /// Quote the output (escapes).
    #[arg(short, long)]
    pub quote: bool,
}

#[derive(clap::Args)]
pub struct AvroxArgs {
    /// Basic type to create.
    #[arg(value_enum)]
    pub kind: BasicType,

    /// Unquote the input as a string literal before parsing.
    #[arg(short, long)]
    pub unquote: bool,

    /// Remove one trailing line feed before parsing.
    #[arg(short, long)]
    pub strip_lf: bool,

    /// Compress the container body.
    #[arg(short, long, value_enum)]
    pub compress: Option<CompressArg>,

    /// Quote the output (escapes).
    #[arg(long)]
    pub quote: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BasicType {
    String,
    Int,
    Bytes,
    Decimal,
    #[value(name = "rawdate")]
    RawDate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CompressArg {
    Snappy,
    Gzip,
    Flate,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    process::exit(exit_code(panic::catch_unwind(AssertUnwindSafe(|| run(cli)))));
}

/// Map the outcome of [`run`] to the process exit code, reporting errors
/// and caught panics on stderr.
fn exit_code(outcome: thread::Result<Result<()>>) -> i32 {
    match outcome {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
        Err(payload) => {
            eprintln!("internal error: {}", panic_message(payload.as_ref()));
            EXIT_FAULT
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let input = open_input(&cli.input)?;
    let decompression = cli.decompress.selected();
    match cli.command {
        None => cmd_translate::run(&TranslateArgs::default(), decompression, input),
        Some(Commands::Translate(args)) => cmd_translate::run(&args, decompression, input),
        Some(Commands::Analyse(args)) => cmd_analyse::run(&args, decompression, input),
        Some(Commands::Avrox(args)) => cmd_avrox::run(&args, decompression, input),
    }
}

fn open_input(args: &InputArgs) -> Result<Box<dyn Read>> {
    if let Some(data) = &args.data {
        return Ok(Box::new(Cursor::new(data.clone().into_bytes())));
    }
    if let Some(HexBytes(bytes)) = args.hex.as_ref().filter(|h| !h.0.is_empty()) {
        return Ok(Box::new(Cursor::new(bytes.clone())));
    }
    if let Some(path) = &args.file {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        return Ok(Box::new(file));
    }
    Ok(Box::new(io::stdin().lock()))
}

/// `WARN` by default, `DEBUG` with `--verbose`; `RUST_LOG` overrides both.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
