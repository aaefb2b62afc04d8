//! The four delivery stages: checkout, build, login, push.

use super::exec::CommandSpec;
use super::PipelineError;
use crate::config::PipelineConfig;
use std::path::PathBuf;

/// What a stage does when it runs.
#[derive(Clone, Debug, PartialEq)]
pub enum StageAction {
    /// Run an external command to completion.
    Run(CommandSpec),
    /// Verify that a directory exists (local checkout).
    EnsureDir(PathBuf),
}

/// A named, sequential pipeline step.
#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub name: &'static str,
    pub action: StageAction,
}

/// Registry credentials resolved from the configured environment variables.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    /// Resolve credentials, failing on the first missing variable.
    pub fn from_env(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let username = std::env::var(&config.username_env).map_err(|_| {
            PipelineError::MissingCredential {
                var: config.username_env.clone(),
            }
        })?;
        let password = std::env::var(&config.password_env).map_err(|_| {
            PipelineError::MissingCredential {
                var: config.password_env.clone(),
            }
        })?;
        Ok(Self { username, password })
    }

    pub(super) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Plan the four stages in order.
///
/// Without credentials (dry-run before the variables are set) the login
/// command carries a `$VAR` placeholder username and no stdin payload, so
/// the printed plan stays honest and secret-free.
pub fn plan(config: &PipelineConfig, creds: Option<&Credentials>) -> Vec<Stage> {
    let image_ref = format!("{}/{}:{}", config.registry, config.image, config.tag);
    let local_tag = format!("{}:{}", config.image, config.tag);
    let context = config.context.display().to_string();

    let checkout = match &config.repo_url {
        Some(url) => StageAction::Run(CommandSpec::new(
            "git",
            &["clone", "--depth", "1", url.as_str(), context.as_str()],
        )),
        None => StageAction::EnsureDir(config.context.clone()),
    };

    let build = StageAction::Run(CommandSpec::new(
        "docker",
        &[
            "build",
            "-t",
            local_tag.as_str(),
            "-t",
            image_ref.as_str(),
            context.as_str(),
        ],
    ));

    let login = match creds {
        Some(creds) => StageAction::Run(
            CommandSpec::new(
                "docker",
                &[
                    "login",
                    config.registry.as_str(),
                    "--username",
                    creds.username.as_str(),
                    "--password-stdin",
                ],
            )
            .with_stdin(format!("{}\n", creds.password())),
        ),
        None => {
            let placeholder = format!("${}", config.username_env);
            StageAction::Run(CommandSpec::new(
                "docker",
                &[
                    "login",
                    config.registry.as_str(),
                    "--username",
                    placeholder.as_str(),
                    "--password-stdin",
                ],
            ))
        }
    };

    let push = StageAction::Run(CommandSpec::new("docker", &["push", image_ref.as_str()]));

    vec![
        Stage {
            name: "checkout",
            action: checkout,
        },
        Stage {
            name: "build",
            action: build,
        },
        Stage {
            name: "login",
            action: login,
        },
        Stage {
            name: "push",
            action: push,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            image: "webcalc".to_string(),
            tag: "1.0".to_string(),
            registry: "registry.example.com".to_string(),
            context: PathBuf::from("site"),
            repo_url: None,
            username_env: "REGISTRY_USERNAME".to_string(),
            password_env: "REGISTRY_PASSWORD".to_string(),
        }
    }

    #[test]
    fn test_four_stages_in_order() {
        let stages = plan(&test_config(), None);
        let names: Vec<_> = stages.iter().map(|s| s.name).collect();
        assert_eq!(names, ["checkout", "build", "login", "push"]);
    }

    #[test]
    fn test_local_checkout_verifies_context() {
        let stages = plan(&test_config(), None);
        assert_eq!(
            stages[0].action,
            StageAction::EnsureDir(PathBuf::from("site"))
        );
    }

    #[test]
    fn test_remote_checkout_clones() {
        let mut config = test_config();
        config.repo_url = Some("https://example.com/calc.git".to_string());
        let stages = plan(&config, None);
        match &stages[0].action {
            StageAction::Run(spec) => {
                assert_eq!(spec.program, "git");
                assert!(spec.args.contains(&"clone".to_string()));
                assert!(spec.args.contains(&"https://example.com/calc.git".to_string()));
            }
            other => panic!("expected a git command, got {other:?}"),
        }
    }

    #[test]
    fn test_build_tags_local_and_registry() {
        let stages = plan(&test_config(), None);
        let StageAction::Run(spec) = &stages[1].action else {
            panic!("build must be a command");
        };
        assert_eq!(spec.program, "docker");
        assert!(spec.args.contains(&"webcalc:1.0".to_string()));
        assert!(spec.args.contains(&"registry.example.com/webcalc:1.0".to_string()));
    }

    #[test]
    fn test_login_keeps_password_off_argv() {
        let creds = Credentials {
            username: "ci-bot".to_string(),
            password: "hunter2".to_string(),
        };
        let stages = plan(&test_config(), Some(&creds));
        let StageAction::Run(spec) = &stages[2].action else {
            panic!("login must be a command");
        };
        assert!(spec.args.contains(&"ci-bot".to_string()));
        assert!(!spec.args.iter().any(|a| a.contains("hunter2")));
        assert_eq!(spec.stdin.as_deref(), Some("hunter2\n"));
    }

    #[test]
    fn test_login_placeholder_without_credentials() {
        let stages = plan(&test_config(), None);
        let StageAction::Run(spec) = &stages[2].action else {
            panic!("login must be a command");
        };
        assert!(spec.args.contains(&"$REGISTRY_USERNAME".to_string()));
        assert!(spec.stdin.is_none());
    }

    #[test]
    fn test_push_targets_registry_ref() {
        let stages = plan(&test_config(), None);
        let StageAction::Run(spec) = &stages[3].action else {
            panic!("push must be a command");
        };
        assert_eq!(
            spec.args,
            vec!["push".to_string(), "registry.example.com/webcalc:1.0".to_string()]
        );
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials {
            username: "ci-bot".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_missing_credential_env_fails() {
        let mut config = test_config();
        config.username_env = "WEBCALC_TEST_UNSET_USER".to_string();
        config.password_env = "WEBCALC_TEST_UNSET_PASS".to_string();
        let err = Credentials::from_env(&config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingCredential { var } if var == "WEBCALC_TEST_UNSET_USER"
        ));
    }
}
