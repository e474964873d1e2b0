//! Line-oriented NID decoding
//!
//! The application is a filter: each input line carries one received
//! NID codeword as sixteen hex digits, and each output line reports
//! what the decoder made of it. Running totals are kept so the exit
//! status can reflect uncorrectable codewords.

use std::io::BufRead;

use log::{info, warn};

use trunkold::{Codeword, CorrectionStatus, NacTracker, Nid, NidDecoder, NID_BITS};

use crate::cli::Args;

/// Running totals for one decoding session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Input lines consumed, including blanks and comments
    pub lines: u64,

    /// Codewords recovered, with or without the hint
    pub decoded: u64,

    /// Codewords that stayed uncorrectable
    pub failed: u64,

    /// Lines that did not parse as codewords
    pub skipped: u64,

    /// Bit errors corrected across all recovered codewords
    pub corrected_bits: u64,
}

/// Run the application
///
/// Reads `input` to exhaustion, decoding one codeword per line and
/// printing one result line per codeword unless `--quiet`. The hint
/// for failed decodes comes from `--nac` if given, or from the NAC
/// tracker when `--track` is set. Returns the session totals; the
/// caller derives the process exit status from [`Stats::failed`].
pub fn run<R>(args: &Args, input: R) -> Result<Stats, anyhow::Error>
where
    R: BufRead,
{
    let decoder = NidDecoder::new();
    let mut tracker = NacTracker::new();
    let mut stats = Stats::default();

    for line in input.lines() {
        let line = line?;
        stats.lines += 1;

        // first token only; blanks and comments pass silently
        let token = match line.split_whitespace().next() {
            Some(token) if !token.starts_with('#') => token,
            _ => continue,
        };

        let mut codeword = match Codeword::from_hex(token, NID_BITS) {
            Ok(codeword) => codeword,
            Err(err) => {
                warn!("line {}: {}", stats.lines, err);
                stats.skipped += 1;
                continue;
            }
        };

        let hint = match args.nac {
            Some(nac) => nac,
            None if args.track => tracker.tracked().unwrap_or(0),
            None => 0,
        };

        match decoder.decode_with_hint(&mut codeword, hint) {
            CorrectionStatus::Corrected(count) => {
                stats.decoded += 1;
                stats.corrected_bits += count as u64;

                let nid = Nid::from_codeword(&codeword);
                if args.track {
                    tracker.track(nid.nac());
                }
                if !args.quiet {
                    println!(
                        "0x{:03X} {} errors={}",
                        nid.nac(),
                        nid.duid().as_str(),
                        count
                    );
                }
            }
            CorrectionStatus::Uncorrected => {
                stats.failed += 1;
                if !args.quiet {
                    println!("uncorrectable");
                }
            }
        }
    }

    info!(
        "{} lines: {} decoded, {} uncorrectable, {} skipped, {} bit errors corrected",
        stats.lines, stats.decoded, stats.failed, stats.skipped, stats.corrected_bits
    );

    Ok(stats)
}
