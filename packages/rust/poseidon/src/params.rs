//! Round-constant and MDS-matrix parameter tables, per permutation width.

use crate::grain::GrainLfsr;
use maci_field::Fp;

/// Number of full rounds, identical across every width this workspace uses
/// (matches circomlib's `nRoundsF = 8`).
pub const FULL_ROUNDS: usize = 8;

/// Bit-length of the SNARK scalar field, used to seed the Grain LFSR and to
/// size rejection-sampling draws.
const FIELD_BITS: u32 = 254;

/// Number of partial rounds for each supported state width `t` (index 0 is
/// `t = 2`). These are the canonical circomlib values for `x^5` S-boxes over
/// a ~254-bit prime field.
const PARTIAL_ROUNDS_BY_WIDTH: [usize; 5] = [56, 57, 56, 60, 60];

/// Smallest state width this crate supports (`Poseidon_1`, one absorbed
/// element beyond the capacity slot).
pub const MIN_WIDTH: usize = 2;

/// Largest state width this crate supports (`Poseidon_5`).
pub const MAX_WIDTH: usize = 6;

/// Full parameter set for one Poseidon permutation width.
#[derive(Clone, Debug)]
pub struct PoseidonParams {
    /// State width `t`.
    pub t: usize,
    /// Number of full rounds (first half, then second half around the
    /// partial rounds).
    pub full_rounds: usize,
    /// Number of partial rounds.
    pub partial_rounds: usize,
    /// Round constants, one `t`-vector per round, flattened row-major:
    /// `round_constants[round * t + i]`.
    pub round_constants: Vec<Fp>,
    /// The `t x t` MDS matrix, row-major.
    pub mds: Vec<Vec<Fp>>,
}

impl PoseidonParams {
    /// Derive the parameter set for state width `t` via the Grain LFSR
    /// construction (see [`crate::grain`]).
    pub fn generate(t: usize) -> Self {
        assert!(
            (MIN_WIDTH..=MAX_WIDTH).contains(&t),
            "unsupported Poseidon width t={t}"
        );
        let partial_rounds = PARTIAL_ROUNDS_BY_WIDTH[t - MIN_WIDTH];
        let full_rounds = FULL_ROUNDS;
        let mut lfsr = GrainLfsr::new(FIELD_BITS, t as u32, full_rounds as u32, partial_rounds as u32);

        let total_rounds = full_rounds + partial_rounds;
        let round_constants: Vec<Fp> = (0..total_rounds * t)
            .map(|_| lfsr.next_field_element(FIELD_BITS))
            .collect();

        let mds = generate_mds(&mut lfsr, t);

        Self {
            t,
            full_rounds,
            partial_rounds,
            round_constants,
            mds,
        }
    }

    /// Round constants for a given round, as a `t`-length slice.
    #[inline]
    pub fn round_constants_for(&self, round: usize) -> &[Fp] {
        &self.round_constants[round * self.t..(round + 1) * self.t]
    }
}

/// Build a Cauchy MDS matrix `M[i][j] = 1 / (x_i + y_j)` from two
/// LFSR-derived, pairwise-distinct sequences. Cauchy matrices are MDS by
/// construction whenever the `x_i` are pairwise distinct, the `y_j` are
/// pairwise distinct, and no `x_i + y_j` vanishes.
fn generate_mds(lfsr: &mut GrainLfsr, t: usize) -> Vec<Vec<Fp>> {
    let xs = distinct_sequence(lfsr, t, &[]);
    let ys = distinct_sequence(lfsr, t, &xs);

    let mut mds = vec![vec![Fp::zero(); t]; t];
    for i in 0..t {
        for j in 0..t {
            let denom = xs[i] + ys[j];
            mds[i][j] = denom
                .inverse()
                .expect("Cauchy MDS construction guarantees x_i + y_j != 0");
        }
    }
    mds
}

/// Draw `n` field elements from `lfsr`, pairwise distinct among themselves
/// and distinct from everything in `avoid`, resampling on collision.
fn distinct_sequence(lfsr: &mut GrainLfsr, n: usize, avoid: &[Fp]) -> Vec<Fp> {
    let mut out: Vec<Fp> = Vec::with_capacity(n);
    while out.len() < n {
        let candidate = lfsr.next_field_element(FIELD_BITS);
        if out.contains(&candidate) || avoid.contains(&candidate) {
            continue;
        }
        out.push(candidate);
    }
    out
}
