//! The Poseidon permutation itself: add-round-constants, S-box, MDS mix,
//! alternating full and partial rounds around a partial-round core.

use crate::params::PoseidonParams;
use maci_field::Fp;

/// Apply the `x^5` S-box in place.
#[inline]
fn sbox(x: Fp) -> Fp {
    let x2 = x * x;
    let x4 = x2 * x2;
    x4 * x
}

/// Apply the permutation `P_t` to `state` in place. `state.len()` must equal
/// `params.t`.
///
/// Round structure (standard Poseidon): `R_F / 2` full rounds, then
/// `R_P` partial rounds, then `R_F / 2` full rounds. A full round applies
/// the S-box to every state element; a partial round applies it only to
/// `state[0]`. Every round adds that round's constants before the S-box and
/// mixes with the MDS matrix after.
pub fn permute(state: &mut [Fp], params: &PoseidonParams) {
    assert_eq!(state.len(), params.t, "state width must match params.t");

    let half_full = params.full_rounds / 2;
    let mut round = 0usize;

    for _ in 0..half_full {
        full_round(state, params, round);
        round += 1;
    }
    for _ in 0..params.partial_rounds {
        partial_round(state, params, round);
        round += 1;
    }
    for _ in 0..half_full {
        full_round(state, params, round);
        round += 1;
    }
}

fn full_round(state: &mut [Fp], params: &PoseidonParams, round: usize) {
    let rc = params.round_constants_for(round);
    for (s, c) in state.iter_mut().zip(rc) {
        *s = sbox(*s + *c);
    }
    mix(state, params);
}

fn partial_round(state: &mut [Fp], params: &PoseidonParams, round: usize) {
    let rc = params.round_constants_for(round);
    for (s, c) in state.iter_mut().zip(rc) {
        *s = *s + *c;
    }
    state[0] = sbox(state[0]);
    mix(state, params);
}

fn mix(state: &mut [Fp], params: &PoseidonParams) {
    let t = params.t;
    let mut next = vec![Fp::zero(); t];
    for i in 0..t {
        let mut acc = Fp::zero();
        for j in 0..t {
            acc = acc + params.mds[i][j] * state[j];
        }
        next[i] = acc;
    }
    state.copy_from_slice(&next);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_is_deterministic() {
        let params = PoseidonParams::generate(5);
        let mut a = vec![Fp::from_u64(1), Fp::from_u64(2), Fp::from_u64(3), Fp::from_u64(4), Fp::from_u64(5)];
        let mut b = a.clone();
        permute(&mut a, &params);
        permute(&mut b, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn permutation_is_not_identity() {
        let params = PoseidonParams::generate(5);
        let input = vec![Fp::zero(); 5];
        let mut state = input.clone();
        permute(&mut state, &params);
        assert_ne!(state, input);
    }

    #[test]
    fn permutation_is_sensitive_to_every_input_slot() {
        let params = PoseidonParams::generate(4);
        let base = vec![Fp::from_u64(10), Fp::from_u64(20), Fp::from_u64(30), Fp::from_u64(40)];
        let mut base_out = base.clone();
        permute(&mut base_out, &params);
        for i in 0..base.len() {
            let mut tweaked = base.clone();
            tweaked[i] = tweaked[i] + Fp::one();
            permute(&mut tweaked, &params);
            assert_ne!(tweaked, base_out, "slot {i} did not affect output");
        }
    }
}
