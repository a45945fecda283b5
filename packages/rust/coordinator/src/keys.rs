//! Coordinator signing-key handling: loaded from an environment-provided
//! seed, never logged, zeroized on drop via the key type itself.

use maci_babyjub::EdDSAPrivateKey;
use maci_field::Fp;

/// Errors loading the coordinator's private key.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The named environment variable was not set.
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),
    /// The environment variable's value was not valid hex, or not exactly
    /// 32 bytes.
    #[error("environment variable {0} must hold a 32-byte hex-encoded seed")]
    MalformedSeed(String),
}

/// Load the coordinator's `EdDSAPrivateKey` from the hex-encoded seed held
/// in environment variable `var_name`. The raw seed never appears in logs —
/// only this function reads the environment value, and the returned key
/// zeroizes its backing bytes on drop.
pub fn load_coordinator_key(var_name: &str) -> Result<EdDSAPrivateKey, KeyError> {
    let hex_seed = std::env::var(var_name).map_err(|_| KeyError::MissingEnvVar(var_name.to_string()))?;
    let trimmed = hex_seed.strip_prefix("0x").unwrap_or(&hex_seed);
    let bytes = hex::decode(trimmed).map_err(|_| KeyError::MalformedSeed(var_name.to_string()))?;
    let seed: [u8; 32] = bytes
        .try_into()
        .map_err(|_| KeyError::MalformedSeed(var_name.to_string()))?;
    Ok(EdDSAPrivateKey::from_seed(seed))
}

/// `Poseidon_2(pubKeyX, pubKeyY)` for the coordinator's current public key,
/// as bound into every [`maci_processor::BatchWitness`].
pub fn coordinator_pubkey_hash(key: &EdDSAPrivateKey) -> Fp {
    let pk = key.public();
    maci_processor::coordinator_pub_key_hash(pk.x(), pk.y())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_var_is_reported() {
        let err = load_coordinator_key("MACI_TEST_DOES_NOT_EXIST_XYZ").unwrap_err();
        assert!(matches!(err, KeyError::MissingEnvVar(_)));
    }

    #[test]
    fn loads_a_valid_hex_seed() {
        let seed_hex: String = "01".repeat(32);
        std::env::set_var("MACI_TEST_COORDINATOR_SEED", &seed_hex);
        let key = load_coordinator_key("MACI_TEST_COORDINATOR_SEED").unwrap();
        let pk1 = key.public();
        let pk2 = key.public();
        assert_eq!(pk1, pk2);
        std::env::remove_var("MACI_TEST_COORDINATOR_SEED");
    }
}
