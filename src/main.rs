use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use readmeforge::config::{self, RemoteConfig, StrategyKind};
use readmeforge::export;
use readmeforge::gemini::GeminiClient;
use readmeforge::logging;
use readmeforge::remote::Unavailable;
use readmeforge::{Generation, Generator, ProjectFields, Strategy, TextGenerator};

/// Generate a README.md from a project fields file.
#[derive(Debug, Parser)]
#[command(name = "readmeforge", version, about)]
struct Cli {
    /// Project fields file (TOML, or JSON when the extension is `.json`)
    fields: PathBuf,

    /// Ask the remote model, falling back to local assembly on failure
    #[arg(long, conflicts_with = "local")]
    remote: bool,

    /// Assemble the README locally
    #[arg(long)]
    local: bool,

    /// Output file or directory (defaults to `output.path` from config)
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Print the README instead of writing it
    #[arg(long)]
    stdout: bool,

    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn strategy_kind(&self, configured: StrategyKind) -> StrategyKind {
        if self.remote {
            StrategyKind::Remote
        } else if self.local {
            StrategyKind::Local
        } else {
            configured
        }
    }
}

/// Reads project fields, choosing the format from the file extension.
fn read_fields(path: &Path) -> Result<ProjectFields> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fields file {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid JSON in {}", path.display()))
    } else {
        toml::from_str(&contents).with_context(|| format!("Invalid TOML in {}", path.display()))
    }
}

/// Builds the Gemini client for `remote`.
///
/// A missing key is reported by the client on first use. A client that cannot
/// be built is replaced by [`Unavailable`]; both degrade to local assembly.
fn remote_generator(remote: &RemoteConfig) -> Box<dyn TextGenerator> {
    let api_key = remote.api_key().unwrap_or_default();
    match GeminiClient::new(api_key, remote.gemini_config()) {
        Ok(client) => Box::new(client),
        Err(e) => {
            warn!(error = %e, "gemini_client_unavailable");
            Box::new(Unavailable::new(remote.model.clone(), e.to_string()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    // Initialize logging before anything else
    let logging_ctx = match logging::init() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    let loaded_config = config::load_config(cli.config.as_deref());
    debug!(
        config_path = %loaded_config.config_path.display(),
        status = ?loaded_config.status,
        "config_loaded"
    );
    let config = loaded_config.config;

    if let Some(ref ctx) = logging_ctx {
        if let Err(e) = logging::update_log_level(&ctx.reload_handle, &config.logging.level) {
            warn!(error = %e, "log_level_update_failed");
        }
        logging::cleanup_old_logs(&ctx.log_directory);
    }

    let result = run(&cli, &config).await;

    if let Some(ctx) = logging_ctx {
        info!(
            session_id = %ctx.session_id,
            duration_secs = start_time.elapsed().as_secs_f64(),
            "session_end"
        );
    }

    result
}

async fn run(cli: &Cli, config: &config::Config) -> Result<()> {
    let fields = read_fields(&cli.fields)?;
    let generator = Generator::new();

    let generation = match cli.strategy_kind(config.behavior.strategy) {
        StrategyKind::Local => generator.generate(&fields, Strategy::Local).await?,
        StrategyKind::Remote => {
            let remote = remote_generator(&config.remote);
            generator
                .generate(&fields, Strategy::Remote(remote.as_ref()))
                .await?
        }
    };

    if let Generation::Degraded { ref error, .. } = generation {
        eprintln!(
            "Warning: remote generation failed ({}); using the locally assembled README instead.",
            error
        );
    }

    let markdown = generation.into_markdown();
    if cli.stdout {
        io::stdout()
            .write_all(markdown.as_bytes())
            .context("Failed to write README to stdout")?;
    } else {
        let target = cli.output.clone().unwrap_or_else(|| config.output_path());
        let written = export::write_readme(&target, &markdown)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        println!("Wrote {}", written.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from(["readmeforge", "project.toml", "--remote", "--stdout"])
            .unwrap();
        assert!(cli.remote);
        assert!(cli.stdout);
        assert_eq!(cli.strategy_kind(StrategyKind::Local), StrategyKind::Remote);
    }

    #[test]
    fn test_cli_conflicting_strategies() {
        assert!(Cli::try_parse_from(["readmeforge", "p.toml", "--remote", "--local"]).is_err());
        assert!(
            Cli::try_parse_from(["readmeforge", "p.toml", "--stdout", "-o", "out.md"]).is_err()
        );
    }

    #[test]
    fn test_strategy_defaults_to_config() {
        let cli = Cli::try_parse_from(["readmeforge", "p.toml"]).unwrap();
        assert_eq!(cli.strategy_kind(StrategyKind::Remote), StrategyKind::Remote);
        assert_eq!(cli.strategy_kind(StrategyKind::Local), StrategyKind::Local);
    }

    #[test]
    fn test_read_fields_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("project.toml");
        fs::write(
            &toml_path,
            "projectName = \"Foo\"\ndescription = \"A tool.\"\nfeatures = \"fast\\nsimple\"\n",
        )
        .unwrap();
        let fields = read_fields(&toml_path).unwrap();
        assert_eq!(fields.project_name, "Foo");
        assert_eq!(fields.features.as_deref(), Some("fast\nsimple"));

        let json_path = dir.path().join("project.JSON");
        fs::write(
            &json_path,
            r#"{"projectName": "Bar", "description": "X", "license": "None"}"#,
        )
        .unwrap();
        let fields = read_fields(&json_path).unwrap();
        assert_eq!(fields.project_name, "Bar");
        assert!(fields.license.is_none());
    }

    #[test]
    fn test_remote_generator_uses_configured_model() {
        let remote = RemoteConfig {
            model: "gemini-2.5-pro".to_string(),
            ..Default::default()
        };
        assert_eq!(remote_generator(&remote).model(), "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn test_remote_without_key_degrades_to_local() {
        let remote = RemoteConfig {
            api_key_env: "READMEFORGE_TEST_UNSET_KEY".to_string(),
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let fields = ProjectFields {
            project_name: "Foo".to_string(),
            description: "A tool.".to_string(),
            ..Default::default()
        };
        let generator = Generator::new();
        let client = remote_generator(&remote);
        let result = generator
            .generate(&fields, Strategy::Remote(client.as_ref()))
            .await
            .unwrap();
        assert!(result.is_degraded());
        assert_eq!(
            result.markdown(),
            readmeforge::assemble_markdown(&fields.validate().unwrap())
        );
    }

    #[test]
    fn test_read_fields_missing_file() {
        let err = read_fields(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read fields file"));
    }
}
