//! ECDH over Baby-Jubjub (C6)

use crate::curve::{Point, Scalar};

/// A shared-secret point, exposed as its `(x, y)` coordinates — the duplex
/// sponge (C7) absorbs both into its capacity state.
pub type SharedKey = Point;

/// `generateECDHSharedKey(sk, peerPk) = (sk · peerPk)`.
///
/// Symmetric: `sk_a · (sk_b · B) == sk_b · (sk_a · B)`, so both sides of an
/// ECDH exchange derive the same point regardless of which side's ephemeral
/// key is "own" and which is "peer".
pub fn generate_ecdh_shared_key(sk: Scalar, peer_pk: Point) -> SharedKey {
    peer_pk.scalar_mul(sk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eddsa::EdDSAPrivateKey;

    #[test]
    fn shared_key_is_symmetric() {
        let mut rng = rand::thread_rng();
        let a = EdDSAPrivateKey::random(&mut rng);
        let b = EdDSAPrivateKey::random(&mut rng);

        let shared_from_a = generate_ecdh_shared_key(a.scalar(), b.public().point());
        let shared_from_b = generate_ecdh_shared_key(b.scalar(), a.public().point());

        assert_eq!(shared_from_a, shared_from_b);
    }

    #[test]
    fn different_peers_yield_different_keys() {
        let mut rng = rand::thread_rng();
        let a = EdDSAPrivateKey::random(&mut rng);
        let b = EdDSAPrivateKey::random(&mut rng);
        let c = EdDSAPrivateKey::random(&mut rng);

        let shared_ab = generate_ecdh_shared_key(a.scalar(), b.public().point());
        let shared_ac = generate_ecdh_shared_key(a.scalar(), c.public().point());
        assert_ne!(shared_ab, shared_ac);
    }
}
