// Bitcoin formats library: consensus codecs, keys, scripts and PSBTs
// by LNP/BP Association (https://lnp-bp.org)
// Written in 2020-2022 by
//     Dr. Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the Apache-2.0 License
// along with this software.
// If not, see <https://opensource.org/licenses/Apache-2.0>.


#[macro_use]
extern crate amplify;
#[macro_use]
extern crate log;

use std::io::{stdin, stdout, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fs, io};

use amplify::IoError;
use bitcoin::hashes::hex::{self, FromHex, ToHex};
use bitcoinformats::blockchain::{Transaction, TxError};
use bitcoinformats::encoding::{self, Decode};
use bitcoinformats::hd::{self, DerivationPath, ExtendedKey, XkeyError, BIP32_SEED_SALT};
use bitcoinformats::psbt::raw::PSBT_MAGIC;
use bitcoinformats::psbt::{
    Fee, ProprietaryKeyDescriptor, ProprietaryKeyError, Psbt, PsbtError, PsbtVersion,
};
use bitcoinformats::scripts::opcodes::{disassemble, PushError};
use bitcoinformats::scripts::{AddressError, Chain, ScriptType};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

/// Command-line arguments
#[derive(Parser)]
#[derive(Clone, Eq, PartialEq, Debug)]
#[clap(
    author,
    version,
    name = "btc-formats",
    about = "Command-line tool for inspecting and converting bitcoin transactions, PSBTs, keys \
             and addresses"
)]
pub struct Args {
    /// Command to execute
    #[clap(subcommand)]
    pub command: Command,

    /// Network defining address and extended key formats
    #[clap(
        short,
        long,
        global = true,
        default_value = "mainnet",
        env = "BTCF_NETWORK"
    )]
    pub network: Chain,

    /// Increase verbosity level; overrides `RUST_LOG` when given
    #[clap(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Command to execute
#[derive(Subcommand)]
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Command {
    /// Decode hex-encoded transaction, printing its identifiers, structure
    /// and output addresses
    Tx {
        /// Transaction in hexadecimal consensus encoding
        tx: String,
    },

    /// Inspect partially signed transaction and optionally convert it to a
    /// different PSBT version or add proprietary keys to it
    Psbt {
        /// PSBT in base64 or hex encoding. If neither this argument nor
        /// `--file` is given, the PSBT is read from the standard input.
        psbt: Option<String>,

        /// File containing binary, base64 or hex PSBT
        #[clap(short, long, conflicts_with = "psbt")]
        file: Option<PathBuf>,

        /// Convert PSBT to the given version (0 or 2)
        #[clap(short, long)]
        convert: Option<u32>,

        /// Proprietary field to add, in form of
        /// `<map>/<prefix>(<subtype>)[/<key data>][=<value>]`, where map is
        /// `global`, `input:N` or `output:N`, and key data and value are hex
        #[clap(long = "set-proprietary")]
        proprietary: Vec<ProprietaryKeyDescriptor>,

        /// Save resulting PSBT in binary form to the file instead of
        /// printing it
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute address for a hex-encoded output script
    Address {
        /// Output script (`scriptPubkey`) in hex
        script: String,
    },

    /// Compute output script for an address
    Script {
        /// Address to decode
        address: String,
    },

    /// Derive child key from an extended key or a seed
    Derive {
        /// Extended private or public key to derive from
        #[clap(required_unless_present = "seed")]
        key: Option<String>,

        /// Hex-encoded seed to produce the master key from
        #[clap(short, long, conflicts_with = "key")]
        seed: Option<String>,

        /// Derivation path, like `m/84'/0'/0'/0/1`
        #[clap(short, long, default_value = "m")]
        path: DerivationPath,

        /// Print only the extended public key
        #[clap(long)]
        public: bool,
    },

    /// Normalize derivation path, printing it with the raw child indexes
    Path {
        /// Derivation path using `'`, `h` or `-` to mark hardened indexes
        path: DerivationPath,
    },
}

impl Args {
    fn init_logging(&self) {
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
        match self.verbose {
            0 => {}
            1 => {
                builder.filter_level(log::LevelFilter::Info);
            }
            2 => {
                builder.filter_level(log::LevelFilter::Debug);
            }
            _ => {
                builder.filter_level(log::LevelFilter::Trace);
            }
        }
        builder.init();
    }

    pub fn exec(&self) -> Result<(), Error> {
        debug!("Using {} network", self.network);
        match &self.command {
            Command::Tx { tx } => self.tx(tx),
            Command::Psbt {
                psbt,
                file,
                convert,
                proprietary,
                output,
            } => self.psbt(
                psbt.as_deref(),
                file.as_deref(),
                *convert,
                proprietary,
                output.as_deref(),
            ),
            Command::Address { script } => self.address(script),
            Command::Script { address } => self.script(address),
            Command::Derive {
                key,
                seed,
                path,
                public,
            } => self.derive(key.as_deref(), seed.as_deref(), path, *public),
            Command::Path { path } => Self::path(path),
        }
    }

    fn tx(&self, hex: &str) -> Result<(), Error> {
        let data = Vec::<u8>::from_hex(hex.trim())?;
        let tx = Transaction::deserialize(&data)?;
        let network = self.network.network();

        println!();
        println!("{:-8} {}", "Txid:".bright_white(), tx.txid().to_string().yellow());
        println!("{:-8} {}", "Wtxid:".bright_white(), tx.wtxid()?);
        println!("{:-8} {}", "Weight:".bright_white(), tx.weight()?);
        println!("{:-8} {}", "Vsize:".bright_white(), tx.vsize()?);
        println!("\n{}", serde_yaml::to_string(&tx)?);

        println!("{}", "Outputs:".bright_white());
        for (index, txout) in tx.outputs.iter().enumerate() {
            let script_type = txout.script_type();
            let address = script_type
                .to_address(&network)
                .unwrap_or_else(|_| s!("-"));
            println!(
                "{:>6} {} {} {}",
                format!("#{}", index).dimmed(),
                txout.amount.to_string().bright_yellow(),
                script_type.name(),
                address
            );
        }
        println!();
        Ok(())
    }

    fn psbt(
        &self,
        psbt: Option<&str>,
        file: Option<&Path>,
        convert: Option<u32>,
        proprietary: &[ProprietaryKeyDescriptor],
        output: Option<&Path>,
    ) -> Result<(), Error> {
        let mut psbt = match (psbt, file) {
            (Some(s), _) => parse_psbt(s)?,
            (None, Some(path)) => {
                let data = fs::read(path)?;
                if data.starts_with(&PSBT_MAGIC) {
                    Psbt::deserialize(&data)?
                } else {
                    parse_psbt(String::from_utf8_lossy(&data).trim())?
                }
            }
            (None, None) => {
                eprint!("Type in base64 or hex encoded PSBT and press enter: ");
                stdout().flush()?;
                let line = stdin().lock().lines().next().ok_or(Error::NoInput)??;
                parse_psbt(line.trim())?
            }
        };

        if let Some(version) = convert {
            let version = PsbtVersion::from_u32(version)?;
            debug!("Converting PSBT to version {}", version.to_u32());
            psbt = psbt.into_version(version)?;
        }
        for descriptor in proprietary {
            debug!("Adding proprietary key {}", descriptor);
            psbt.push_proprietary(descriptor)?;
        }

        let tx = psbt.unsigned_tx()?;
        println!();
        println!("{:-10} {}", "Version:".bright_white(), psbt.version()?.to_u32());
        println!("{:-10} {}", "Txid:".bright_white(), tx.txid().to_string().yellow());
        println!("{:-10} {}", "Inputs:".bright_white(), psbt.inputs.len());
        println!("{:-10} {}", "Outputs:".bright_white(), psbt.outputs.len());
        println!("{:-10} {}", "Locktime:".bright_white(), tx.locktime);
        match psbt.fee() {
            Ok(fee) => println!("{:-10} {}", "Fee:".bright_white(), fee.to_string().bright_yellow()),
            Err(err) => println!("{:-10} {}", "Fee:".bright_white(), err.to_string().dimmed()),
        }
        let proprietary = psbt.proprietary_fields();
        if !proprietary.is_empty() {
            println!("{}", "Proprietary:".bright_white());
            for field in proprietary {
                println!("  {}", field);
            }
        }

        if let Some(path) = output {
            fs::write(path, psbt.serialize()?)?;
            eprintln!("{} {}", "PSBT saved to".bright_green(), path.display());
        } else {
            println!("\n{} {}\n", "PSBT:".bright_white(), psbt);
        }
        Ok(())
    }

    fn address(&self, script: &str) -> Result<(), Error> {
        let script = Vec::<u8>::from_hex(script.trim())?;
        let script_type = ScriptType::from_script_pubkey(&script);
        println!("{:-9} {}", "Type:".bright_white(), script_type.name());
        println!("{:-9} {}", "Script:".bright_white(), disassemble(&script)?);
        println!(
            "{:-9} {}",
            "Address:".bright_white(),
            script_type.to_address(&self.network.network())?.yellow()
        );
        Ok(())
    }

    fn script(&self, address: &str) -> Result<(), Error> {
        let script_type = ScriptType::from_address(address.trim(), &self.network.network())?;
        let script = script_type.to_script_pubkey()?;
        println!("{:-9} {}", "Type:".bright_white(), script_type.name());
        println!("{:-9} {}", "Script:".bright_white(), script.to_hex().yellow());
        println!("{:-9} {}", "Asm:".bright_white(), disassemble(&script)?);
        Ok(())
    }

    fn derive(
        &self,
        key: Option<&str>,
        seed: Option<&str>,
        path: &DerivationPath,
        public: bool,
    ) -> Result<(), Error> {
        let network = self.network.network();
        let key = match (key, seed) {
            (Some(key), _) => ExtendedKey::from_str(key.trim())?.derive(path)?,
            (None, Some(seed)) => {
                let seed = Vec::<u8>::from_hex(seed.trim())?;
                ExtendedKey::Private(hd::from_seed(&seed, path, BIP32_SEED_SALT)?)
            }
            (None, None) => return Err(Error::NoInput),
        };

        let xpub = key.extended_public_key();
        println!();
        println!("{:-13} {}", "Path:".bright_white(), path);
        println!("{:-13} {}", "Fingerprint:", xpub.fingerprint()[..].to_hex());
        println!("{:-13} {}", "Identifier:", xpub.identifier()[..].to_hex());
        println!("{:-13} {}", "Depth:", xpub.depth);
        println!("{:-13} {}", "Public key:", xpub.public_key);
        println!("{:-13} {}", "Chain code:", xpub.chain_code[..].to_hex());
        println!("{:-13} {}", "Xpub:".bright_white(), xpub.to_string_with(&network)?.yellow());
        match key {
            ExtendedKey::Private(xpriv) if !public => {
                println!("{:-13} {}", "Xpriv:".bright_white(), xpriv.to_string_with(&network)?);
            }
            _ => {}
        }
        println!();
        Ok(())
    }

    fn path(path: &DerivationPath) -> Result<(), Error> {
        let indexes = path
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("/");
        println!("{}", path);
        println!("{:#}", path);
        println!("{}", indexes);
        Ok(())
    }
}

/// Parses PSBT given either as a hex or as a base64 string
fn parse_psbt(s: &str) -> Result<Psbt, PsbtError> {
    if s.starts_with(&PSBT_MAGIC[..].to_hex()) {
        Psbt::from_hex(s)
    } else {
        Psbt::from_str(s)
    }
}

#[derive(Debug, Display, Error, From)]
#[display(inner)]
pub enum Error {
    #[from(io::Error)]
    Io(IoError),

    #[from]
    Hex(hex::Error),

    #[from]
    Encoding(encoding::Error),

    #[from]
    Tx(TxError),

    #[from]
    Psbt(PsbtError),

    #[from]
    Address(AddressError),

    #[from]
    Script(PushError),

    #[from]
    Xkey(XkeyError),

    #[from]
    Yaml(serde_yaml::Error),

    /// can't set proprietary key for PSBT {0}
    #[from]
    #[display(doc_comments)]
    PsbtProprietaryKey(ProprietaryKeyError),

    /// no input data provided
    #[display(doc_comments)]
    NoInput,
}

fn main() {
    let args = Args::parse();
    args.init_logging();
    if let Err(err) = args.exec() {
        eprintln!("{}: {}\n", "Error".bright_red(), err);
        std::process::exit(1);
    }
}
