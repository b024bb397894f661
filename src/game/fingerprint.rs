//! Request fingerprints and version tokens.
//!
//! Both are SHA-256 digests. Fingerprints identify a logical move so that a
//! retransmitted request is recognised; version tokens let clients present
//! the version they last saw without exposing the counter itself.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::instrument;

use super::{GameId, MoveRequest};

/// Canonical field order hashed for a move request.
#[derive(Serialize)]
struct FingerprintFields<'a> {
    game_id: &'a GameId,
    player_name: &'a str,
    row: i32,
    column: i32,
}

/// Derives the idempotency fingerprint of a move request.
///
/// Covers game id, player name, row and column. The version token is left
/// out: a retried request carrying a newer token is still the same move.
#[instrument(skip(request), fields(game_id = %request.game_id, player = %request.player_name))]
pub fn request_fingerprint(request: &MoveRequest) -> String {
    let fields = FingerprintFields {
        game_id: &request.game_id,
        player_name: &request.player_name,
        row: request.row,
        column: request.column,
    };
    // Serializing plain strings and integers cannot fail.
    let canonical = serde_json::to_vec(&fields).unwrap_or_default();
    STANDARD.encode(Sha256::digest(&canonical))
}

/// Derives the version token (ETag) for a game version.
#[instrument]
pub fn version_token(version: i32) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(version.to_le_bytes()))
}
