/// Expand `${VAR}` and `${VAR:-fallback}` placeholders in a raw option value.
///
/// Unset variables without a fallback, and unterminated placeholders, are
/// kept literally.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// [`substitute_env`] with an injectable lookup, so tests do not touch the
/// process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let Some(end) = body.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let expr = &body[..end];
        let (name, fallback) = match expr.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (expr, None),
        };
        let resolved = if name.is_empty() {
            None
        } else {
            lookup(name).or_else(|| fallback.map(str::to_string))
        };
        match resolved {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn lookup(name: &str) -> Option<String> {
        match name {
            "LOG_HOST" => Some("collector.local".to_string()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[rstest]
    #[case("${LOG_HOST}", "collector.local")]
    #[case("tcp://${LOG_HOST}:514", "tcp://collector.local:514")]
    #[case("${NOPE}", "${NOPE}")]
    #[case("${NOPE:-fallback}", "fallback")]
    #[case("${LOG_HOST:-fallback}", "collector.local")]
    #[case("${EMPTY:-fallback}", "")]
    #[case("${}", "${}")]
    #[case("${LOG_HOST", "${LOG_HOST")]
    #[case("a ${LOG_HOST} b ${NOPE} c", "a collector.local b ${NOPE} c")]
    #[case("$LOG_HOST", "$LOG_HOST")]
    fn expands_placeholders(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_env_with(input, lookup), expected);
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
