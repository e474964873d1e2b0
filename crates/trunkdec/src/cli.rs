use std::fmt::Display;

use clap::{error::ErrorKind, CommandFactory, Parser};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program accepts hex-encoded P25 NID codewords, one per line, and corrects their bit errors with the BCH(63,16) decoder. Each recovered NID is printed as its NAC and data unit ID.

See --help for more details.
"#;

const USAGE_LONG: &str = r##"
This program accepts hex-encoded P25 NID codewords, one per line, and corrects their bit errors with the BCH(63,16) decoder. Each recovered NID is printed as its NAC and data unit ID.

Every codeword line must begin with 16 hex digits: the 63 codeword bits in transmission order, most significant digit first, plus one slack bit which is ignored. Blank lines and lines starting with "#" are skipped, and anything after the first whitespace is ignored, so annotated capture files work as-is.

    trunkdec --file capture.txt

One line is printed per codeword:

    0x293 TSBK errors=2
    uncorrectable

If you already know the channel's NAC, pass it with --nac to rescue codewords whose errors cluster in the NAC field:

    rtl_p25_dump | trunkdec --nac 0x293

With --track, the decoder learns the NAC from its own output instead: once three consecutive codewords agree, their NAC becomes the retry hint. --nac wins over --track when both are given.

Exits 0 if every codeword line decoded, and 1 otherwise.
"##;

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING, not even decoded codewords
    #[arg(short, long)]
    pub quiet: bool,

    /// Input file (or "-" for stdin)
    ///
    /// One codeword per line: 16 hex digits, optionally followed
    /// by whitespace and arbitrary annotations.
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Known NAC, in hex (decode hint)
    ///
    /// When a codeword fails to decode, its NAC field is overwritten
    /// with this value and decoding is retried once. Sites keep their
    /// NAC constant, so this recovers codewords whose errors landed
    /// in the NAC bits.
    #[arg(long, value_name = "HEX", value_parser = parse_nac)]
    pub nac: Option<u16>,

    /// Learn the decode hint from prior successes
    ///
    /// Tracks recently decoded NACs and retries failures with the
    /// confirmed value. Ignored when --nac is given.
    #[arg(long)]
    pub track: bool,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

/// Parse a twelve-bit NAC expressed in hex, like "0x293" or "293"
fn parse_nac(arg: &str) -> Result<u16, String> {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .unwrap_or(arg);
    let nac = u16::from_str_radix(digits, 16).map_err(|err| err.to_string())?;
    if nac > 0xFFF {
        return Err(format!("0x{:X} does not fit in twelve bits", nac));
    }
    Ok(nac)
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clap() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_nac() {
        assert_eq!(parse_nac("0x293"), Ok(0x293));
        assert_eq!(parse_nac("0X293"), Ok(0x293));
        assert_eq!(parse_nac("fff"), Ok(0xFFF));
        assert!(parse_nac("1000").is_err());
        assert!(parse_nac("-1").is_err());
        assert!(parse_nac("bogus").is_err());
        assert!(parse_nac("").is_err());
    }
}
