//! Outcome token resolution.
//!
//! Binary markets are conventionally ordered `[YES, NO]`, so a missing
//! outcome falls back to that order. Markets with more outcomes never guess.

use crate::error::SelectionError;
use crate::types::{OutcomeToken, Side};

/// Pick the token to trade for `side` and an optional outcome hint (label,
/// token id, or for multi-outcome markets a 0-based index).
pub fn select_token_id<'a>(
    tokens: &'a [OutcomeToken],
    side: Side,
    outcome: Option<&str>,
) -> Result<&'a str, SelectionError> {
    let outcome = outcome.map(str::trim).filter(|o| !o.is_empty());

    match tokens {
        [] => Err(SelectionError::NoTokens),
        [only] => Ok(only.token_id.as_str()),
        [first, second] => match outcome {
            Some(wanted) => {
                let needle = wanted.to_lowercase();
                tokens
                    .iter()
                    .find(|t| t.outcome.to_lowercase().contains(&needle) || t.token_id == wanted)
                    .map(|t| t.token_id.as_str())
                    .ok_or_else(|| SelectionError::BinaryOutcomeNotFound {
                        outcome: wanted.to_string(),
                    })
            }
            None => Ok(match side {
                Side::Buy => first.token_id.as_str(),
                Side::Sell => second.token_id.as_str(),
            }),
        },
        _ => {
            let Some(wanted) = outcome else {
                return Err(SelectionError::OutcomeRequired {
                    count: tokens.len(),
                    available: list_outcomes(tokens),
                });
            };
            select_multi(tokens, wanted).ok_or_else(|| SelectionError::OutcomeNotFound {
                outcome: wanted.to_string(),
                available: list_outcomes(tokens),
            })
        }
    }
}

fn select_multi<'a>(tokens: &'a [OutcomeToken], wanted: &str) -> Option<&'a str> {
    if let Some(t) = tokens.iter().find(|t| t.token_id == wanted) {
        return Some(t.token_id.as_str());
    }

    let needle = wanted.to_lowercase();
    if let Some(t) = tokens
        .iter()
        .find(|t| t.outcome.to_lowercase().contains(&needle))
    {
        return Some(t.token_id.as_str());
    }

    wanted
        .parse::<usize>()
        .ok()
        .and_then(|idx| tokens.get(idx))
        .map(|t| t.token_id.as_str())
}

fn list_outcomes(tokens: &[OutcomeToken]) -> String {
    tokens
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}: {}", i, t.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that an explicitly supplied token belongs to the market.
pub fn ensure_token_in_market(
    tokens: &[OutcomeToken],
    token_id: &str,
    market_id: &str,
) -> Result<(), SelectionError> {
    if tokens.iter().any(|t| t.token_id == token_id) {
        Ok(())
    } else {
        Err(SelectionError::TokenNotInMarket {
            token_id: token_id.to_string(),
            market_id: market_id.to_string(),
        })
    }
}

/// Redemption index set (bitmask over outcome slots) for a resolved position.
///
/// A known outcome index wins. Otherwise the label decides: Yes/Up is slot 0,
/// No/Down slot 1, a numeric label is its own slot, anything else slot 1.
pub fn index_set(outcome_index: Option<u32>, outcome: Option<&str>) -> u32 {
    if let Some(idx) = outcome_index {
        return 1u32.checked_shl(idx).unwrap_or(2);
    }
    match outcome.map(str::trim) {
        Some("Yes") | Some("Up") => 1,
        Some("No") | Some("Down") => 2,
        Some(label) => label
            .parse::<u32>()
            .ok()
            .and_then(|idx| 1u32.checked_shl(idx))
            .unwrap_or(2),
        None => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary() -> Vec<OutcomeToken> {
        vec![OutcomeToken::new("A", "Yes"), OutcomeToken::new("B", "No")]
    }

    fn three_way() -> Vec<OutcomeToken> {
        vec![
            OutcomeToken::new("t-trump", "Trump"),
            OutcomeToken::new("t-harris", "Harris"),
            OutcomeToken::new("t-other", "Other"),
        ]
    }

    #[test]
    fn binary_defaults_follow_side() {
        let tokens = binary();
        assert_eq!(select_token_id(&tokens, Side::Buy, None).unwrap(), "A");
        assert_eq!(select_token_id(&tokens, Side::Sell, None).unwrap(), "B");
        assert_eq!(select_token_id(&tokens, Side::Sell, Some("  ")).unwrap(), "B");
    }

    #[test]
    fn binary_explicit_outcome_matches_label_or_id() {
        let tokens = binary();
        assert_eq!(select_token_id(&tokens, Side::Buy, Some("no")).unwrap(), "B");
        assert_eq!(select_token_id(&tokens, Side::Sell, Some("YES")).unwrap(), "A");
        assert_eq!(select_token_id(&tokens, Side::Buy, Some("B")).unwrap(), "B");
    }

    #[test]
    fn binary_unknown_outcome_fails() {
        let err = select_token_id(&binary(), Side::Buy, Some("Maybe")).unwrap_err();
        assert_eq!(
            err,
            SelectionError::BinaryOutcomeNotFound {
                outcome: "Maybe".into()
            }
        );
    }

    #[test]
    fn single_token_is_returned_unconditionally() {
        let tokens = vec![OutcomeToken::new("only", "Yes")];
        assert_eq!(select_token_id(&tokens, Side::Sell, Some("nope")).unwrap(), "only");
    }

    #[test]
    fn empty_market_fails() {
        assert_eq!(
            select_token_id(&[], Side::Buy, None).unwrap_err(),
            SelectionError::NoTokens
        );
    }

    #[test]
    fn multi_outcome_requires_outcome() {
        let err = select_token_id(&three_way(), Side::Buy, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "multi-outcome market with 3 outcomes requires an outcome. Available: 0: Trump, 1: Harris, 2: Other"
        );
    }

    #[test]
    fn multi_outcome_resolution_order() {
        let tokens = three_way();
        assert_eq!(select_token_id(&tokens, Side::Buy, Some("t-other")).unwrap(), "t-other");
        assert_eq!(select_token_id(&tokens, Side::Buy, Some("harr")).unwrap(), "t-harris");
        assert_eq!(select_token_id(&tokens, Side::Buy, Some("1")).unwrap(), "t-harris");
        assert_eq!(select_token_id(&tokens, Side::Sell, Some("0")).unwrap(), "t-trump");
    }

    #[test]
    fn multi_outcome_label_beats_index() {
        let tokens = vec![
            OutcomeToken::new("a", "Under 2"),
            OutcomeToken::new("b", "2 to 5"),
            OutcomeToken::new("c", "Over 5"),
        ];
        // "2" is a label substring before it is an index
        assert_eq!(select_token_id(&tokens, Side::Buy, Some("2")).unwrap(), "a");
    }

    #[test]
    fn multi_outcome_unknown_lists_choices() {
        let err = select_token_id(&three_way(), Side::Buy, Some("7")).unwrap_err();
        assert_eq!(
            err,
            SelectionError::OutcomeNotFound {
                outcome: "7".into(),
                available: "0: Trump, 1: Harris, 2: Other".into(),
            }
        );
    }

    #[test]
    fn explicit_token_must_belong_to_market() {
        let tokens = binary();
        assert!(ensure_token_in_market(&tokens, "A", "m").is_ok());
        assert!(matches!(
            ensure_token_in_market(&tokens, "Z", "m"),
            Err(SelectionError::TokenNotInMarket { .. })
        ));
    }

    #[test]
    fn index_sets() {
        assert_eq!(index_set(Some(0), Some("No")), 1);
        assert_eq!(index_set(Some(1), None), 2);
        assert_eq!(index_set(Some(3), None), 8);
        assert_eq!(index_set(None, Some("Yes")), 1);
        assert_eq!(index_set(None, Some("Up")), 1);
        assert_eq!(index_set(None, Some("Down")), 2);
        assert_eq!(index_set(None, Some("2")), 4);
        assert_eq!(index_set(None, Some("Maybe")), 2);
        assert_eq!(index_set(None, None), 2);
    }
}
