use crate::host::{ClusterApi, NodeResponse, NodeStatus, VmConfig, VmSummary, VmType};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// In-memory cluster
#[derive(Default)]
pub struct MockCluster {
    nodes: Vec<(String, NodeStatus)>,
    vms: Vec<VmSummary>,
    configs: HashMap<u32, VmConfig>,
    failing: HashSet<u32>,
}

impl MockCluster {
    pub fn add_node(&mut self, name: &str, status: NodeStatus) {
        self.nodes.push((name.to_string(), status));
    }

    pub fn add_vm(
        &mut self,
        node: &str,
        vm_id: u32,
        name: Option<&str>,
        vm_type: VmType,
        config: &[(&str, &str)],
    ) {
        self.vms.push(VmSummary {
            node: node.to_string(),
            vm_id,
            name: name.map(|n| n.to_string()),
            vm_type,
        });
        self.configs.insert(
            vm_id,
            VmConfig(
                config
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        );
    }

    /// Make config requests for `vm_id` fail
    pub fn fail_config(&mut self, vm_id: u32) {
        self.failing.insert(vm_id);
    }
}

#[async_trait]
impl ClusterApi for MockCluster {
    async fn list_nodes(&self) -> Result<Vec<NodeResponse>> {
        Ok(self
            .nodes
            .iter()
            .map(|(name, status)| NodeResponse {
                name: name.clone(),
                status: *status,
            })
            .collect())
    }

    async fn list_vms(&self) -> Result<Vec<VmSummary>> {
        Ok(self.vms.clone())
    }

    async fn get_vm_config(&self, vm: &VmSummary) -> Result<VmConfig> {
        if self.failing.contains(&vm.vm_id) {
            bail!("500 Internal Server Error");
        }
        match self.configs.get(&vm.vm_id) {
            Some(c) => Ok(c.clone()),
            None => bail!(
                "Configuration file 'nodes/{}/qemu-server/{}.conf' does not exist",
                vm.node,
                vm.vm_id
            ),
        }
    }
}
