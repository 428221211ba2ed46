use ethereum_types::H256;

/// BerryVM trace prover.
#[derive(Debug, clap::Parser)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Executes a program and prints its result, trace root and result proof.
    Run(RunCmd),
    /// Prints the encoded single-step proof for one step of a program.
    Prove(ProveCmd),
}

/// Program to execute.
#[derive(Debug, clap::Args)]
pub struct ProgramArgs {
    /// Bytecode as hex, with or without `0x`.
    #[clap(long, value_parser = hex_bytes)]
    pub code: HexBytes,

    /// Calldata as hex.
    #[clap(long, value_parser = hex_bytes, default_value = "")]
    pub call_data: HexBytes,

    /// Stop after this many steps; 0 runs to completion.
    #[clap(long, default_value_t = 0)]
    pub steps: usize,
}

#[derive(Debug, clap::Parser)]
pub struct RunCmd {
    #[clap(flatten)]
    pub program: ProgramArgs,

    /// Print every level of the Merkle tree.
    #[clap(long)]
    pub print_tree: bool,

    /// Print per-opcode execution counts.
    #[clap(long)]
    pub stats: bool,
}

#[derive(Debug, clap::Parser)]
pub struct ProveCmd {
    #[clap(flatten)]
    pub program: ProgramArgs,

    /// Step to prove.
    #[clap(long)]
    pub step: usize,

    /// Dispute id the proof is submitted for.
    #[clap(long, value_parser = hash_parser, default_value = "0x00")]
    pub dispute_id: H256,
}

/// Raw bytes parsed from a hex argument.
#[derive(Debug, Clone)]
pub struct HexBytes(pub Vec<u8>);

fn hex_bytes(input: &str) -> Result<HexBytes, String> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(digits)
        .map(HexBytes)
        .map_err(|err| format!("invalid hex: {err}"))
}

/// Parses up to 32 bytes of hex as a right-aligned hash.
fn hash_parser(input: &str) -> Result<H256, String> {
    let HexBytes(bytes) = hex_bytes(input)?;
    if bytes.len() > 32 {
        return Err(format!("expected at most 32 bytes, got {}", bytes.len()));
    }
    let mut hash = H256::zero();
    hash.as_bytes_mut()[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(hash)
}
