use curriculum_rollup::config::{load_rule_set, AppConfig};
use curriculum_rollup::error::AppError;
use curriculum_rollup::evidence::InMemoryRecordStore;
use curriculum_rollup::rollup::{RuleSet, Snapshot};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub(crate) fn load_snapshot(path: &Path) -> Result<Snapshot, AppError> {
    read_json(path)
}

pub(crate) fn load_records(path: &Path) -> Result<InMemoryRecordStore, AppError> {
    read_json(path)
}

/// An explicit `--rules` file wins over `ROLLUP_RULES_PATH`; otherwise the built-in rules apply.
pub(crate) fn resolve_rules(config: &AppConfig, rules: Option<&Path>) -> Result<RuleSet, AppError> {
    let rule_set = match rules {
        Some(path) => load_rule_set(path)?,
        None => config.rules.resolve()?,
    };
    Ok(rule_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use curriculum_rollup::config::ConfigError;
    use std::env;

    fn scratch(name: &str, contents: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("rollup-cli-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).expect("write scratch file");
        path
    }

    #[test]
    fn snapshot_accepts_source_target_edges() {
        let path = scratch(
            "snapshot.json",
            r#"{
                "entities": [
                    { "id": "quiz", "kind": "assessment" },
                    { "id": "q1", "kind": "question", "data": { "average_pct": 80 } }
                ],
                "edges": [{ "source": "quiz", "target": "q1" }]
            }"#,
        );
        let snapshot = load_snapshot(&path).expect("snapshot parses");
        std::fs::remove_file(&path).ok();
        assert_eq!(snapshot.entities.len(), 2);
        assert_eq!(snapshot.edges[0].parent.as_str(), "quiz");
        assert_eq!(snapshot.entities[1].data.average_pct, Some(80.0));
    }

    #[test]
    fn malformed_records_surface_as_json_errors() {
        let path = scratch("records.json", "{ not json");
        let error = load_records(&path).expect_err("expected parse error");
        std::fs::remove_file(&path).ok();
        assert!(matches!(error, AppError::Json(_)));
    }

    #[test]
    fn explicit_rules_path_wins() {
        let mut rules = RuleSet::standard();
        rules.rules.truncate(1);
        let path = scratch(
            "rules.json",
            &serde_json::to_string(&rules).expect("serialize rules"),
        );
        let config = AppConfig {
            environment: curriculum_rollup::config::AppEnvironment::Test,
            telemetry: curriculum_rollup::config::TelemetryConfig {
                log_level: "info".to_string(),
                target: curriculum_rollup::config::LogTarget::Stderr,
            },
            rules: curriculum_rollup::config::RulesConfig::default(),
        };

        let resolved = resolve_rules(&config, Some(&path)).expect("rules load");
        std::fs::remove_file(&path).ok();
        assert_eq!(resolved, rules);
        assert_eq!(
            resolve_rules(&config, None).expect("defaults"),
            RuleSet::standard()
        );

        let missing = resolve_rules(&config, Some(Path::new("./no-such-rules.json")))
            .expect_err("expected read error");
        assert!(matches!(
            missing,
            AppError::Config(ConfigError::RulesRead { .. })
        ));
    }
}
