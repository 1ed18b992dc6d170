//! Matching of held permission tokens against the tokens a route allows.
//!
//! A token is either `resource` or `resource:scope`. Allowed entries come in three shapes:
//! * with a scope, e.g. `view:log`: the user must hold exactly `view:log`.
//! * with the wildcard scope, e.g. `edit:*`: the user must hold exactly `edit:*`.
//! * without a scope, e.g. `admin`: holding `admin` under any scope is enough.

/// Splits a permission token on its first colon into `(base, scope)`
pub fn split(token: &str) -> (&str, Option<&str>) {
    match token.split_once(':') {
        Some((base, scope)) => (base, Some(scope)),
        None => (token, None),
    }
}

/// Returns true when any of the `held` tokens is accepted by `allowed`
pub fn matches<S: AsRef<str>>(allowed: &[String], held: impl IntoIterator<Item = S>) -> bool {
    held.into_iter().any(|token| {
        let token = token.as_ref();
        let (base, _) = split(token);
        allowed.iter().any(|entry| entry == token || entry == base)
    })
}
