use crate::models::common::{ContentId, SessionId, TimestampNs, UserId};
use sha2::{Digest, Sha256};

const SESSION_ID_DOMAIN: &[u8] = b"micropay-session-v1";

/// Derives a session id from its owner, content, nonce and start time.
/// The nonce is unique per session, so ids never collide even when one user
/// opens several sessions on the same content in the same instant.
pub fn derive_session_id(user: &UserId, content_id: &ContentId, nonce: u64, now: TimestampNs) -> SessionId {
    let user_bytes = user.as_slice();
    let mut hasher = Sha256::new();
    hasher.update(SESSION_ID_DOMAIN);
    hasher.update([user_bytes.len() as u8]);
    hasher.update(user_bytes);
    hasher.update(content_id.0);
    hasher.update(nonce.to_be_bytes());
    hasher.update(now.to_be_bytes());
    SessionId(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;

    #[test]
    fn session_ids_differ_by_nonce() {
        let user = Principal::from_slice(&[9; 10]);
        let content = ContentId::from_label("video_001");
        let first = derive_session_id(&user, &content, 0, 1_000);
        let second = derive_session_id(&user, &content, 1, 1_000);
        assert_ne!(first, second);
        assert_eq!(first, derive_session_id(&user, &content, 0, 1_000));
    }
}
