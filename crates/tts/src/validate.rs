/// Whether `requested` is one of the engine's language codes, ignoring case
///
/// Speaker names are not checked here; the engine is the authority on those.
pub fn validate_language<S: AsRef<str>>(requested: &str, supported: &[S]) -> bool {
    supported
        .iter()
        .any(|language| language.as_ref().eq_ignore_ascii_case(requested))
}
