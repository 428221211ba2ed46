//! BerryVM prover binary.

mod cli;
mod command;

fn main() -> anyhow::Result<()> {
    command::run()
}
