//! Command-line arguments for `ikectl`. There is no connection-config file
//! loader in this crate, so every input this binary needs — including the
//! daemon's `uniqueIDs` flag — arrives as a flat set of `clap` flags rather
//! than from a file.
use std::net::IpAddr;
use std::str::FromStr;

use clap::{App, Arg};

use ikecore::error::{CoreError, CoreResult};

/// Which demonstration this invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Parse a textual peer identity and print its tag, canonical form, and
    /// wildcard count.
    Identity,
    /// Install a pool, lease one address per `--id`, release the first
    /// lease, then re-lease it to demonstrate reuse.
    Pool,
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(Mode::Identity),
            "pool" => Ok(Mode::Pool),
            _ => Err(CoreError::malformed(format!("unknown mode '{s}' (expected 'identity' or 'pool')"))),
        }
    }
}

/// This structure holds the command line arguments: one struct, populated
/// from `clap::ArgMatches` in a single constructor.
#[derive(Debug)]
pub struct CliOptions {
    pub mode: Mode,
    pub text: Option<String>,
    pub oe_only: bool,
    pub start: Option<IpAddr>,
    pub end: Option<IpAddr>,
    pub ids: Vec<String>,
    pub unique_ids: bool,
    pub debug: bool,
}

impl CliOptions {
    pub fn options() -> CoreResult<Self> {
        let matches = App::new("ikectl")
            .version("0.1")
            .about(
                r#"Exercise the IKE peer-identity and address-pool cores from the command line

            mode=identity: --text '<identity text>' [--oe-only]
            mode=pool:     --start <ip> --end <ip> --id <identity text> [--id <identity text> ...] [--no-unique-ids]
            "#,
            )
            .arg(
                Arg::new("mode")
                    .short('m')
                    .long("mode")
                    .required(true)
                    .takes_value(true)
                    .long_help("'identity' or 'pool'"),
            )
            .arg(
                Arg::new("text")
                    .short('t')
                    .long("text")
                    .required(false)
                    .takes_value(true)
                    .long_help("identity text to parse (mode=identity)"),
            )
            .arg(
                Arg::new("oe-only")
                    .short('o')
                    .long("oe-only")
                    .required(false)
                    .takes_value(false)
                    .long_help("opportunistic-encryption mode (mode=identity)"),
            )
            .arg(
                Arg::new("start")
                    .long("start")
                    .required(false)
                    .takes_value(true)
                    .long_help("first address in the pool (mode=pool)"),
            )
            .arg(
                Arg::new("end")
                    .long("end")
                    .required(false)
                    .takes_value(true)
                    .long_help("last address in the pool, inclusive (mode=pool)"),
            )
            .arg(
                Arg::new("id")
                    .short('i')
                    .long("id")
                    .required(false)
                    .takes_value(true)
                    .multiple_values(true)
                    .long_help("peer identity text; one lease is acquired per value, in order (mode=pool)"),
            )
            .arg(
                Arg::new("no-unique-ids")
                    .long("no-unique-ids")
                    .required(false)
                    .takes_value(false)
                    .long_help("disable lease reuse by identity (daemon's uniqueIDs=false)"),
            )
            .arg(
                Arg::new("debug")
                    .short('g')
                    .long("debug")
                    .required(false)
                    .takes_value(false)
                    .long_help("debug mode"),
            )
            .get_matches();

        let mode = Mode::from_str(matches.value_of("mode").unwrap())?;
        let start = matches.value_of("start").map(IpAddr::from_str).transpose()?;
        let end = matches.value_of("end").map(IpAddr::from_str).transpose()?;
        let ids = matches.values_of("id").map(|vs| vs.map(String::from).collect()).unwrap_or_default();

        Ok(CliOptions {
            mode,
            text: matches.value_of("text").map(String::from),
            oe_only: matches.is_present("oe-only"),
            start,
            end,
            ids,
            unique_ids: !matches.is_present("no-unique-ids"),
            debug: matches.is_present("debug"),
        })
    }
}
