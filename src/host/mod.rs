use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

mod proxmox;

pub use proxmox::*;

/// Read-only view of a cluster's guests
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List hardware nodes in the cluster
    async fn list_nodes(&self) -> Result<Vec<NodeResponse>>;

    /// List all guests across the cluster
    async fn list_vms(&self) -> Result<Vec<VmSummary>>;

    /// Get the current config of a single guest
    async fn get_vm_config(&self, vm: &VmSummary) -> Result<VmConfig>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VmType {
    Qemu,
    Lxc,
}

impl Display for VmType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VmType::Qemu => write!(f, "qemu"),
            VmType::Lxc => write!(f, "lxc"),
        }
    }
}

/// A guest as listed by `/cluster/resources?type=vm`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VmSummary {
    pub node: String,
    #[serde(rename = "vmid")]
    pub vm_id: u32,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub vm_type: VmType,
}

impl VmSummary {
    /// Guest name, falling back to the vmid for unnamed guests
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(n) if !n.is_empty() => n.clone(),
            _ => self.vm_id.to_string(),
        }
    }
}

/// Raw guest config, key to value
///
/// Non-string values (eg. `cores: 4`) are kept as their JSON text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmConfig(pub BTreeMap<String, String>);

impl<'de> Deserialize<'de> for VmConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(VmConfig(
            raw.into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect(),
        ))
    }
}

impl VmConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}
