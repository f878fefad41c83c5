//! Command implementations
//!
//! Each subcommand lives in its own module and implements
//! [`Command`](crate::command::Command).

pub mod config;
pub mod hooks;
pub mod patches;
pub mod plugins;

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]

    use crate::common::RuntimeContext;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Temporary project with two installed plugins
    pub struct Project {
        _temp: TempDir,
        pub root: PathBuf,
        pub plugins_root: PathBuf,
    }

    impl Project {
        pub fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path().join("project");
            let plugins_root = temp.path().join("plugins");
            fs::create_dir_all(&plugins_root).unwrap();

            fs::write(
                plugins_root.join("mail.toml"),
                r#"
version = "1.2.0"

[config.defaults]
MAIL_HOST = "localhost"

[config.overrides]
LANGUAGE = "fr"

[patches]
nginx = "location /mail { }"
"#,
            )
            .unwrap();
            fs::write(
                plugins_root.join("forum.toml"),
                r#"
[config.defaults]
FORUM_PORT = 4567

[patches]
nginx = "location /forum { }"
"#,
            )
            .unwrap();

            Self {
                _temp: temp,
                root,
                plugins_root,
            }
        }

        /// Start a fresh engine, as a new process would
        pub fn start(&self) -> RuntimeContext {
            RuntimeContext::start(&self.root, &self.plugins_root).unwrap()
        }
    }
}
