use crate::error::{AppError, Result};
use crate::types::{PairingSource, TokenPair};

/// Pair the yes/no outcome labels with their token ids.
///
/// Labels are matched by position when there is one label per token
/// (trimmed, case-insensitive `yes` / `no`). If that does not name both
/// sides, the first token is taken as yes and the second as no. The
/// positional fallback trusts the token order blindly; a market whose labels
/// are e.g. `["Up", "Down"]` ends up paired by position.
pub fn resolve_tokens(outcomes: &[String], token_ids: &[String]) -> Result<TokenPair> {
    if token_ids.len() < 2 {
        return Err(AppError::Metadata(format!(
            "expected 2 clobTokenIds, got {}: {token_ids:?}",
            token_ids.len()
        )));
    }

    if !outcomes.is_empty() && outcomes.len() == token_ids.len() {
        let mut yes = None;
        let mut no = None;
        for (label, token_id) in outcomes.iter().zip(token_ids) {
            let label = label.trim();
            if label.eq_ignore_ascii_case("yes") {
                yes = Some(token_id);
            } else if label.eq_ignore_ascii_case("no") {
                no = Some(token_id);
            }
        }

        let yes = yes.filter(|t| !t.is_empty());
        let no = no.filter(|t| !t.is_empty());
        if let (Some(yes), Some(no)) = (yes, no) {
            return Ok(TokenPair {
                yes_token_id: yes.clone(),
                no_token_id: no.clone(),
                source: PairingSource::Labels,
            });
        }
    }

    Ok(TokenPair {
        yes_token_id: token_ids[0].clone(),
        no_token_id: token_ids[1].clone(),
        source: PairingSource::Positional,
    })
}
