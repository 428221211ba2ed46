use bn::{AffineG1, AffineG2, Fq, Fq2, Fr, Group, Gt, G1, G2};

use super::{right_pad, Precompile, PrecompileOutput};

const POINT_LEN: usize = 64;
const PAIR_LEN: usize = 192;

fn read_fq(input: &[u8], start: usize) -> Option<Fq> {
    Fq::from_slice(&input[start..start + 32]).ok()
}

fn read_point(input: &[u8], start: usize) -> Option<G1> {
    let x = read_fq(input, start)?;
    let y = read_fq(input, start + 32)?;
    if x == Fq::zero() && y == Fq::zero() {
        return Some(G1::zero());
    }
    AffineG1::new(x, y).ok().map(Into::into)
}

fn encode_point(point: G1) -> Option<Vec<u8>> {
    let mut out = vec![0u8; POINT_LEN];
    if let Some(affine) = AffineG1::from_jacobian(point) {
        affine.x().to_big_endian(&mut out[..32]).ok()?;
        affine.y().to_big_endian(&mut out[32..]).ok()?;
    }
    Some(out)
}

fn into_output(output: Option<Vec<u8>>) -> PrecompileOutput {
    output.map_or_else(PrecompileOutput::failure, PrecompileOutput::ok)
}

/// `alt_bn128` point addition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bn128Add;

impl Precompile for Bn128Add {
    fn name(&self) -> &'static str {
        "ECADD"
    }

    fn call(&self, input: &[u8]) -> PrecompileOutput {
        into_output(Self::add(&right_pad(input, 2 * POINT_LEN)))
    }
}

impl Bn128Add {
    fn add(input: &[u8]) -> Option<Vec<u8>> {
        let p1 = read_point(input, 0)?;
        let p2 = read_point(input, POINT_LEN)?;
        encode_point(p1 + p2)
    }
}

/// `alt_bn128` scalar multiplication.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bn128Mul;

impl Precompile for Bn128Mul {
    fn name(&self) -> &'static str {
        "ECMUL"
    }

    fn call(&self, input: &[u8]) -> PrecompileOutput {
        into_output(Self::mul(&right_pad(input, POINT_LEN + 32)))
    }
}

impl Bn128Mul {
    fn mul(input: &[u8]) -> Option<Vec<u8>> {
        let point = read_point(input, 0)?;
        let scalar = Fr::from_slice(&input[POINT_LEN..POINT_LEN + 32]).ok()?;
        encode_point(point * scalar)
    }
}

/// `alt_bn128` pairing check. Returns a word holding 1 when the product of
/// the pairings is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bn128Pairing;

impl Bn128Pairing {
    fn read_pair(chunk: &[u8]) -> Option<(G1, G2)> {
        let a = read_point(chunk, 0)?;

        // G2 coordinates are encoded imaginary part first.
        let b_ax = read_fq(chunk, 96)?;
        let b_ay = read_fq(chunk, 64)?;
        let b_bx = read_fq(chunk, 160)?;
        let b_by = read_fq(chunk, 128)?;
        let ba = Fq2::new(b_ax, b_ay);
        let bb = Fq2::new(b_bx, b_by);
        let b = if ba.is_zero() && bb.is_zero() {
            G2::zero()
        } else {
            AffineG2::new(ba, bb).ok()?.into()
        };
        Some((a, b))
    }

    fn check(input: &[u8]) -> Option<bool> {
        if input.len() % PAIR_LEN != 0 {
            return None;
        }
        if input.is_empty() {
            return Some(true);
        }
        let pairs = input
            .chunks(PAIR_LEN)
            .map(Self::read_pair)
            .collect::<Option<Vec<_>>>()?;
        Some(bn::pairing_batch(&pairs) == Gt::one())
    }
}

impl Precompile for Bn128Pairing {
    fn name(&self) -> &'static str {
        "ECPAIRING"
    }

    fn call(&self, input: &[u8]) -> PrecompileOutput {
        match Self::check(input) {
            Some(holds) => {
                let mut word = vec![0u8; 32];
                word[31] = holds as u8;
                PrecompileOutput::ok(word)
            }
            None => PrecompileOutput::failure(),
        }
    }
}
