use std::{io::Write, path::Path};

use {
    anyhow::{Context, Result},
    modopts_config::{Schema, Severity, ValidationResult, validate_file},
    tracing::info,
};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Check `config` against `schema` and print the diagnostics to stderr.
///
/// Returns `true` when at least one error was found.
pub fn check(schema: &Path, config: &Path, verbose: bool) -> Result<bool> {
    let schema_doc = Schema::load(schema)
        .with_context(|| format!("failed to load schema {}", schema.display()))?;
    info!(
        schema = %schema.display(),
        modules = schema_doc.modules.len(),
        "checking configuration"
    );

    let result = validate_file(&schema_doc, config);
    let stderr = std::io::stderr();
    print_report(&result, verbose, &mut stderr.lock())?;
    Ok(result.has_errors())
}

fn print_report(result: &ValidationResult, verbose: bool, out: &mut impl Write) -> Result<()> {
    if let Some(ref path) = result.config_path {
        writeln!(out, "Checking {}\n", path.display())?;
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => CYAN,
        };

        if d.path.is_empty() {
            writeln!(out, "  {BOLD}{color}{}{RESET} {}", d.severity, d.message)?;
        } else {
            writeln!(
                out,
                "  {BOLD}{color}{}{RESET} {}: {}",
                d.severity, d.path, d.message
            )?;
        }
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        writeln!(out)?;
    }

    if errors == 0 && warnings == 0 {
        writeln!(out, "No issues found.")?;
    } else {
        writeln!(out, "{errors} error(s), {warnings} warning(s)")?;
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
[[modules.network.options]]
name = "port"
type = "integer"
required = true

[[modules.network.options]]
name = "tls.key"

[[modules.network.options]]
name = "tls.cert"
depends_on = "tls.key"
"#;

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    fn render(result: &ValidationResult, verbose: bool) -> String {
        let mut out = Vec::new();
        print_report(result, verbose, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn clean_config_reports_no_issues() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(&dir, "schema.toml", SCHEMA);
        let config = write_file(
            &dir,
            "modopts.toml",
            "[network]\nport = 514\n\n[network.tls]\nkey = \"k.pem\"\n",
        );

        assert!(!check(&schema, &config, false).unwrap());
        let result = validate_file(&Schema::load(&schema).unwrap(), &config);
        assert!(render(&result, false).ends_with("No issues found.\n"));
    }

    #[test]
    fn dependency_error_is_printed_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(&dir, "schema.toml", SCHEMA);
        let config = write_file(
            &dir,
            "modopts.toml",
            "[network]\nport = 514\n\n[network.tls]\ncert = \"c.pem\"\n",
        );

        assert!(check(&schema, &config, false).unwrap());
        let result = validate_file(&Schema::load(&schema).unwrap(), &config);
        let text = render(&result, false);
        assert!(text.contains("network.tls.cert: option tls.key is a dependency of tls.cert"));
        assert!(text.contains("1 error(s), 0 warning(s)"));
    }

    #[test]
    fn info_is_hidden_unless_verbose() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_file(&dir, "schema.toml", "[[modules.disk.options]]\nname = \"dir\"\n");
        let config = write_file(&dir, "modopts.toml", "");
        let result = validate_file(&Schema::load(&schema).unwrap(), &config);

        assert!(!render(&result, false).contains("module not configured"));
        assert!(render(&result, true).contains("disk: module not configured"));
    }

    #[test]
    fn missing_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "modopts.toml", "");
        let err = check(&dir.path().join("nope.toml"), &config, false).unwrap_err();
        assert!(err.to_string().contains("failed to load schema"));
    }
}
