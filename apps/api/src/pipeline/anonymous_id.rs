//! Recruiter-facing candidate ids.
//!
//! The id is a UUID v5 of the candidate's internal id under a namespace
//! derived from a deployment secret, rendered as `CAND-` and 12 Crockford
//! base32 characters (60 bits). Without the secret a public id cannot be
//! traced back to, or checked against, an internal id.

use uuid::Uuid;

/// Used when `ANONYMOUS_ID_SECRET` is unset. Fine for local runs only.
pub const DEV_ANONYMOUS_ID_SECRET: &str = "blindhire-local-development";

const PREFIX: &str = "CAND-";
const ID_CHARS: u32 = 12;
const CROCKFORD: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnonymousIds {
    namespace: Uuid,
}

impl AnonymousIds {
    pub fn new(secret: &str) -> Self {
        Self {
            namespace: Uuid::new_v5(&Uuid::NAMESPACE_OID, secret.as_bytes()),
        }
    }

    /// Stable for a given candidate and secret.
    pub fn id_for(&self, candidate_id: Uuid) -> String {
        let digest = Uuid::new_v5(&self.namespace, candidate_id.as_bytes());
        // Low 64 bits hold the variant in their top two; the low 60 are hash.
        let bits = (digest.as_u128() as u64) & ((1_u64 << (5 * ID_CHARS)) - 1);

        let mut id = String::with_capacity(PREFIX.len() + ID_CHARS as usize);
        id.push_str(PREFIX);
        for i in (0..ID_CHARS).rev() {
            id.push(CROCKFORD[((bits >> (5 * i)) & 31) as usize] as char);
        }
        id
    }
}

impl Default for AnonymousIds {
    fn default() -> Self {
        Self::new(DEV_ANONYMOUS_ID_SECRET)
    }
}
