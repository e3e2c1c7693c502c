//! CloudFormation init metadata
//!
//! Resource metadata read by `cfn-init` on the instance: named config sets,
//! each config downloading files and running commands.

use std::collections::BTreeMap;

use cirrus_core::value::Value;

/// Metadata key read by `cfn-init`
pub const INIT_KEY: &str = "AWS::CloudFormation::Init";

/// File fetched onto the instance
#[derive(Debug, Clone, PartialEq)]
pub enum InitFile {
    Source(Value),
    Content(Value),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitConfig {
    pub files: BTreeMap<String, InitFile>,
    /// Commands run in key order
    pub commands: BTreeMap<String, Value>,
}

impl InitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, file: InitFile) -> Self {
        self.files.insert(path.into(), file);
        self
    }

    pub fn with_command(mut self, key: impl Into<String>, command: impl Into<Value>) -> Self {
        self.commands.insert(key.into(), command.into());
        self
    }
}

impl From<InitConfig> for Value {
    fn from(config: InitConfig) -> Self {
        let mut entries = Vec::new();
        if !config.files.is_empty() {
            let files = config.files.into_iter().map(|(path, file)| {
                let entry = match file {
                    InitFile::Source(v) => Value::map([("source", v)]),
                    InitFile::Content(v) => Value::map([("content", v)]),
                };
                (path, entry)
            });
            entries.push(("files", Value::map(files)));
        }
        if !config.commands.is_empty() {
            let commands = config
                .commands
                .into_iter()
                .map(|(key, command)| (key, Value::map([("command", command)])));
            entries.push(("commands", Value::map(commands)));
        }
        Value::map(entries)
    }
}

/// `AWS::CloudFormation::Init` metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Init {
    pub config_sets: BTreeMap<String, Vec<String>>,
    pub configs: BTreeMap<String, InitConfig>,
}

impl Init {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_set<I, S>(mut self, name: impl Into<String>, configs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_sets
            .insert(name.into(), configs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_config(mut self, name: impl Into<String>, config: InitConfig) -> Self {
        self.configs.insert(name.into(), config);
        self
    }
}

impl From<Init> for Value {
    fn from(init: Init) -> Self {
        let mut body: BTreeMap<String, Value> = init
            .configs
            .into_iter()
            .map(|(name, config)| (name, config.into()))
            .collect();
        if !init.config_sets.is_empty() {
            let sets = init
                .config_sets
                .into_iter()
                .map(|(name, configs)| (name, Value::list(configs)));
            body.insert("configSets".to_string(), Value::map(sets));
        }
        Value::map([(INIT_KEY, Value::Map(body))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn renders_config_sets_files_and_commands() {
        let init = Init::new()
            .with_config_set("ascending", ["config1"])
            .with_config(
                "config1",
                InitConfig::new()
                    .with_file(
                        r"c:\Packages\agent.msi",
                        InitFile::Source("http://example.com/agent.msi".into()),
                    )
                    .with_command("1-install", r"msiexec.exe /i c:\Packages\agent.msi /quiet"),
            );

        assert_eq!(
            Value::from(init).to_wire(),
            json!({
                "AWS::CloudFormation::Init": {
                    "configSets": { "ascending": ["config1"] },
                    "config1": {
                        "files": {
                            "c:\\Packages\\agent.msi": { "source": "http://example.com/agent.msi" }
                        },
                        "commands": {
                            "1-install": { "command": "msiexec.exe /i c:\\Packages\\agent.msi /quiet" }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn empty_config_renders_empty_object() {
        let init = Init::new().with_config("config1", InitConfig::new());
        assert_eq!(
            Value::from(init).to_wire(),
            json!({ "AWS::CloudFormation::Init": { "config1": {} } })
        );
    }
}
