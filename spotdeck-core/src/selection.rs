//! Operator-configured selection of key pairs and security groups.

use crate::error::SelectionError;
use crate::resources::{KeyPair, SecurityGroup};
use regex::Regex;

/// Pick the single candidate whose name matches `pattern`.
///
/// Zero or several matches are configuration errors naming what was seen.
pub fn select_unique<'a, T, F>(
    what: &'static str,
    pattern: &Regex,
    candidates: &'a [T],
    name: F,
) -> Result<&'a T, SelectionError>
where
    F: Fn(&T) -> &str,
{
    let matches: Vec<&T> = candidates.iter().filter(|c| pattern.is_match(name(c))).collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(SelectionError::NoMatch {
            what,
            pattern: pattern.as_str().to_string(),
            candidates: candidates.iter().map(|c| name(c).to_string()).collect(),
        }),
        many => Err(SelectionError::Ambiguous {
            what,
            pattern: pattern.as_str().to_string(),
            matches: many.iter().map(|c| name(c).to_string()).collect(),
        }),
    }
}

pub fn select_key_pair<'a>(
    pattern: &Regex,
    key_pairs: &'a [KeyPair],
) -> Result<&'a KeyPair, SelectionError> {
    select_unique("Key pair", pattern, key_pairs, |k| k.name.as_str())
}

pub fn select_security_group<'a>(
    pattern: &Regex,
    groups: &'a [SecurityGroup],
) -> Result<&'a SecurityGroup, SelectionError> {
    select_unique("Security group", pattern, groups, |g| g.name.as_str())
}
