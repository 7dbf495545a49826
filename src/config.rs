use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "devboot.toml";

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub prerequisites: Prerequisites,

    #[serde(default)]
    pub object_store: ObjectStoreConfig,

    #[serde(default)]
    pub kv_emulator: KvEmulatorConfig,

    #[serde(default)]
    pub env_file: EnvFileConfig,
}

impl Config {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config at {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        Ok(cfg)
    }

    /// The configured tool list, followed by any launch program it leaves out.
    /// Whatever the bootstrap will exec is checked before the first side effect.
    pub fn required_tools(&self) -> Vec<ToolRequirement> {
        let mut tools = self.prerequisites.tools.clone();
        let launched = [
            (&self.object_store.runtime, "runs the object store container"),
            (&self.kv_emulator.java, "runs the key-value emulator"),
        ];
        for (program, role) in launched {
            if !tools.iter().any(|t| &t.name == program) {
                tools.push(ToolRequirement {
                    name: program.clone(),
                    hint: format!("'{program}' {role}; install it or point the config at another program."),
                });
            }
        }
        tools
    }
}

// ---------- prerequisites ----------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Prerequisites {
    #[serde(default = "default_tools")]
    pub tools: Vec<ToolRequirement>,
}

impl Default for Prerequisites {
    fn default() -> Self {
        Self {
            tools: default_tools(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolRequirement {
    pub name: String,
    pub hint: String,
}

fn default_tools() -> Vec<ToolRequirement> {
    vec![
        ToolRequirement {
            name: "docker".to_string(),
            hint: "Docker is required to run MinIO. Install it from https://docs.docker.com/get-docker/ and make sure the daemon is running.".to_string(),
        },
        ToolRequirement {
            name: "java".to_string(),
            hint: "A Java runtime (17 or newer) is required to run DynamoDB Local. Install one, e.g. from https://adoptium.net/.".to_string(),
        },
    ]
}

// ---------- object store ----------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectStoreConfig {
    /// Container CLI used for `ps` and `run`; must accept docker's flags.
    #[serde(default = "default_runtime")]
    pub runtime: String,

    #[serde(default = "default_container_name")]
    pub container_name: String,

    #[serde(default = "default_image")]
    pub image: String,

    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default = "default_console_port")]
    pub console_port: u16,

    /// Host directory mounted at /data. Accepts {workdir}/{home}/{user}.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_root_user")]
    pub root_user: String,

    #[serde(default = "default_root_password")]
    pub root_password: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            container_name: default_container_name(),
            image: default_image(),
            api_port: default_api_port(),
            console_port: default_console_port(),
            data_dir: default_data_dir(),
            root_user: default_root_user(),
            root_password: default_root_password(),
        }
    }
}

impl ObjectStoreConfig {
    pub fn console_url(&self) -> String {
        format!("http://localhost:{}", self.console_port)
    }

    pub fn api_url(&self) -> String {
        format!("http://localhost:{}", self.api_port)
    }
}

fn default_runtime() -> String {
    "docker".to_string()
}

fn default_container_name() -> String {
    "local-minio".to_string()
}

fn default_image() -> String {
    "minio/minio".to_string()
}

fn default_api_port() -> u16 {
    9000
}

fn default_console_port() -> u16 {
    9001
}

fn default_data_dir() -> String {
    "{workdir}/minio_data".to_string()
}

fn default_root_user() -> String {
    "minioadmin".to_string()
}

fn default_root_password() -> String {
    "minioadmin".to_string()
}

// ---------- key-value emulator ----------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KvEmulatorConfig {
    /// Java launcher for the emulator jar.
    #[serde(default = "default_java")]
    pub java: String,

    #[serde(default = "default_archive_url")]
    pub archive_url: String,

    /// File name the archive is downloaded to inside the working directory.
    #[serde(default = "default_archive_name")]
    pub archive_name: String,

    /// Also used as the process-identification substring.
    #[serde(default = "default_jar")]
    pub jar: String,

    #[serde(default = "default_lib_dir")]
    pub lib_dir: String,

    #[serde(default = "default_true")]
    pub shared_db: bool,

    /// Passed as `-port`; the emulator listens on 8000 when unset.
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for KvEmulatorConfig {
    fn default() -> Self {
        Self {
            java: default_java(),
            archive_url: default_archive_url(),
            archive_name: default_archive_name(),
            jar: default_jar(),
            lib_dir: default_lib_dir(),
            shared_db: true,
            port: None,
        }
    }
}

impl KvEmulatorConfig {
    pub fn endpoint_url(&self) -> String {
        format!("http://localhost:{}", self.port.unwrap_or(8000))
    }
}

fn default_java() -> String {
    "java".to_string()
}

fn default_archive_url() -> String {
    "https://s3.us-west-2.amazonaws.com/dynamodb-local/dynamodb_local_latest.tar.gz".to_string()
}

fn default_archive_name() -> String {
    "dynamodb_local_latest.tar.gz".to_string()
}

fn default_jar() -> String {
    "DynamoDBLocal.jar".to_string()
}

fn default_lib_dir() -> String {
    "./DynamoDBLocal_lib".to_string()
}

fn default_true() -> bool {
    true
}

// ---------- env file ----------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvFileConfig {
    #[serde(default = "default_env_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub use_local_services: bool,

    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    #[serde(default = "default_table_name")]
    pub table_name: String,

    #[serde(default = "default_secret_arn")]
    pub secret_arn: String,
}

impl Default for EnvFileConfig {
    fn default() -> Self {
        Self {
            path: default_env_path(),
            use_local_services: true,
            bucket_name: default_bucket_name(),
            table_name: default_table_name(),
            secret_arn: default_secret_arn(),
        }
    }
}

fn default_env_path() -> String {
    "{workdir}/.env".to_string()
}

fn default_bucket_name() -> String {
    "my-local-minio-bucket".to_string()
}

fn default_table_name() -> String {
    "my-local-devices-table".to_string()
}

fn default_secret_arn() -> String {
    "a_very_long_and_random_string_of_characters".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_yields_fixed_defaults() {
        let cfg = Config::from_toml("").unwrap();

        let tools: Vec<&str> = cfg
            .prerequisites
            .tools
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(tools, ["docker", "java"]);

        assert_eq!(cfg.object_store.runtime, "docker");
        assert_eq!(cfg.object_store.container_name, "local-minio");
        assert_eq!(cfg.object_store.api_port, 9000);
        assert_eq!(cfg.object_store.console_port, 9001);
        assert_eq!(cfg.object_store.console_url(), "http://localhost:9001");

        assert_eq!(cfg.kv_emulator.java, "java");
        assert_eq!(cfg.kv_emulator.jar, "DynamoDBLocal.jar");
        assert!(cfg.kv_emulator.shared_db);
        assert_eq!(cfg.kv_emulator.endpoint_url(), "http://localhost:8000");

        assert!(cfg.env_file.use_local_services);
        assert_eq!(cfg.env_file.bucket_name, "my-local-minio-bucket");
        assert_eq!(cfg.env_file.table_name, "my-local-devices-table");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::from_toml(
            r#"
[object_store]
console_port = 9101

[kv_emulator]
port = 8500
"#,
        )
        .unwrap();

        assert_eq!(cfg.object_store.console_port, 9101);
        assert_eq!(cfg.object_store.api_port, 9000);
        assert_eq!(cfg.object_store.root_user, "minioadmin");
        assert_eq!(cfg.kv_emulator.port, Some(8500));
        assert_eq!(cfg.kv_emulator.endpoint_url(), "http://localhost:8500");
    }

    #[test]
    fn custom_tool_list_replaces_defaults() {
        let cfg = Config::from_toml(
            r#"
[prerequisites]
tools = [{ name = "podman", hint = "install podman" }]
"#,
        )
        .unwrap();

        assert_eq!(
            cfg.prerequisites.tools,
            vec![ToolRequirement {
                name: "podman".into(),
                hint: "install podman".into()
            }]
        );
    }

    #[test]
    fn unknown_types_are_rejected() {
        let err = Config::from_toml("[object_store]\napi_port = \"nope\"\n").unwrap_err();
        assert!(err.to_string().contains("u16"));
    }

    #[test]
    fn default_required_tools_match_the_configured_list() {
        let cfg = Config::default();
        assert_eq!(cfg.required_tools(), cfg.prerequisites.tools);
    }

    #[test]
    fn launch_programs_are_always_required() {
        let cfg = Config::from_toml(
            r#"
[prerequisites]
tools = [{ name = "podman", hint = "install podman" }]

[object_store]
runtime = "podman"

[kv_emulator]
java = "/opt/jdk/bin/java"
"#,
        )
        .unwrap();

        let names: Vec<String> = cfg.required_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["podman", "/opt/jdk/bin/java"]);
    }
}
