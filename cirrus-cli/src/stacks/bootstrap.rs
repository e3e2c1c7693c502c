//! Instance bootstrap scripts
//!
//! User data is a `Join` of script text interleaved with references, wrapped
//! in the tag the Windows launch agent looks for, then base64 encoded.

use cirrus_core::value::{Pseudo, Value};
use cirrus_provider_aws::init::{Init, InitConfig, InitFile};

/// Tag the launch agent uses to pick the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    Batch,
    PowerShell,
}

impl Wrapper {
    fn open(&self) -> &'static str {
        match self {
            Wrapper::Batch => "<script>\n",
            Wrapper::PowerShell => "<powershell>\n",
        }
    }

    fn close(&self) -> &'static str {
        match self {
            Wrapper::Batch => "</script>\n",
            Wrapper::PowerShell => "</powershell>",
        }
    }
}

/// Script fragments; adjacent text is merged into one literal part
#[derive(Debug, Clone)]
pub struct Script {
    wrapper: Wrapper,
    parts: Vec<Value>,
}

impl Script {
    pub fn new(wrapper: Wrapper) -> Self {
        Self {
            wrapper,
            parts: vec![Value::from(wrapper.open())],
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        if let Some(Value::String(last)) = self.parts.last_mut() {
            last.push_str(text);
        } else {
            self.parts.push(Value::from(text));
        }
        self
    }

    pub fn line(self, text: &str) -> Self {
        self.text(text).text("\n")
    }

    /// Splice in a value resolved by the provisioning engine
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.parts.push(value.into());
        self
    }

    /// Close the wrapper and encode the script as user data
    pub fn into_user_data(self) -> Value {
        let close = self.wrapper.close();
        let script = self.text(close);
        Value::base64(Value::join("", script.parts))
    }
}

/// Parameters that register a tentacle with the deployment server
pub struct TentacleRegistration<'a> {
    pub server_url: &'a str,
    pub api_key: &'a str,
    pub thumbprint: &'a str,
    pub role: &'a str,
    pub environment: &'a str,
}

const TENTACLE_HOME: &str = r#"pushd "C:\Program Files\Octopus Deploy\Tentacle""#;
const TENTACLE_PORT: u16 = 10933;
const TENTACLE_MSI: &str = r"c:\Packages\Octopus.Tentacle.Latest-x64.msi";
const TENTACLE_DOWNLOAD: &str = "http://octopusdeploy.com/downloads/latest/OctopusTentacle64";

/// Batch script running `cfn-init` for `resource`, then installing and
/// registering a listening tentacle
pub fn tentacle_user_data(resource: &str, registration: &TentacleRegistration<'_>) -> Value {
    Script::new(Wrapper::Batch)
        .text(r#"cfn-init -s ""#)
        .value(Pseudo::StackName)
        .text(r#"" --region "#)
        .value(Pseudo::Region)
        .line(&format!(" -r {} -c ascending", resource))
        .line(TENTACLE_HOME)
        .line(r#"Tentacle.exe create-instance --instance "Tentacle" --config "C:\Octopus\Tentacle\Tentacle.config" --console"#)
        .line(r#"Tentacle.exe new-certificate --instance "Tentacle" --console"#)
        .line(r#"Tentacle.exe configure --instance "Tentacle" --home "C:\Octopus" --console"#)
        .line(r#"Tentacle.exe configure --instance "Tentacle" --app "C:\Octopus\Applications" --console"#)
        .line(&format!(
            r#"Tentacle.exe configure --instance "Tentacle" --port "{}" --console"#,
            TENTACLE_PORT
        ))
        .text(r#"Tentacle.exe configure --instance "Tentacle" --trust ""#)
        .value(Value::reference(registration.thumbprint))
        .line(r#"" --console"#)
        .text(r#"Tentacle.exe register-with --instance "Tentacle" --server ""#)
        .value(Value::reference(registration.server_url))
        .text(r#"" --apiKey=""#)
        .value(Value::reference(registration.api_key))
        .line(&format!(
            r#"" --role "{}" --environment "{}" --comms-style TentaclePassive --console"#,
            registration.role, registration.environment
        ))
        .line(r#"Tentacle.exe service --instance "Tentacle" --install --start --console"#)
        .line("popd")
        .into_user_data()
}

/// `cfn-init` metadata downloading and installing the tentacle package
pub fn tentacle_init() -> Init {
    Init::new()
        .with_config_set("ascending", ["config1"])
        .with_config_set("descending", ["config1"])
        .with_config(
            "config1",
            InitConfig::new()
                .with_file(TENTACLE_MSI, InitFile::Source(TENTACLE_DOWNLOAD.into()))
                .with_command(
                    "1-install-octopus-tentacle",
                    format!("msiexec.exe /i {} /quiet", TENTACLE_MSI),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn adjacent_text_is_merged() {
        let user_data = Script::new(Wrapper::PowerShell)
            .line("Write-Host one")
            .line("Write-Host two")
            .into_user_data();

        assert_eq!(
            user_data.to_wire(),
            json!({
                "Fn::Base64": {
                    "Fn::Join": ["", ["<powershell>\nWrite-Host one\nWrite-Host two\n</powershell>"]]
                }
            })
        );
    }

    #[test]
    fn references_split_the_text() {
        let user_data = Script::new(Wrapper::Batch)
            .text("echo ")
            .value(Value::reference("KeyName"))
            .line("")
            .into_user_data();

        assert_eq!(
            user_data.to_wire(),
            json!({
                "Fn::Base64": {
                    "Fn::Join": ["", ["<script>\necho ", { "Ref": "KeyName" }, "\n</script>\n"]]
                }
            })
        );
    }

    #[test]
    fn tentacle_script_references() {
        let registration = TentacleRegistration {
            server_url: "OctopusMasterUrl",
            api_key: "OctopusApiKey",
            thumbprint: "OctopusThumbprint",
            role: "web-server",
            environment: "Dev",
        };
        let user_data = tentacle_user_data("Web1", &registration);

        let names = user_data.referenced_names();
        for name in [
            "AWS::StackName",
            "AWS::Region",
            "OctopusMasterUrl",
            "OctopusApiKey",
            "OctopusThumbprint",
        ] {
            assert!(names.contains(name), "missing {}", name);
        }

        let wire = user_data.to_wire();
        let parts = wire["Fn::Base64"]["Fn::Join"][1].as_array().unwrap();
        assert_eq!(parts[0], json!("<script>\ncfn-init -s \""));
        assert_eq!(parts[1], json!({ "Ref": "AWS::StackName" }));
        assert_eq!(parts[2], json!("\" --region "));
        assert_eq!(parts[3], json!({ "Ref": "AWS::Region" }));
        assert!(parts[4].as_str().unwrap().starts_with(" -r Web1 -c ascending\npushd"));
        assert_eq!(parts[8], json!("\" --apiKey=\""));
        let last = parts.last().and_then(|p| p.as_str()).unwrap();
        assert!(last.contains("--role \"web-server\" --environment \"Dev\""));
        assert!(last.ends_with("popd\n</script>\n"));
    }

    #[test]
    fn init_installs_the_package() {
        let init = Value::from(tentacle_init()).to_wire();
        let config = &init["AWS::CloudFormation::Init"]["config1"];
        assert_eq!(
            config["commands"]["1-install-octopus-tentacle"]["command"],
            json!(r"msiexec.exe /i c:\Packages\Octopus.Tentacle.Latest-x64.msi /quiet")
        );
        assert_eq!(
            init["AWS::CloudFormation::Init"]["configSets"]["descending"],
            json!(["config1"])
        );
    }
}
