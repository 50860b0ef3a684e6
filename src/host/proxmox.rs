use crate::host::{ClusterApi, VmConfig, VmSummary};
use crate::json_api::JsonApi;
use crate::settings::Credentials;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Authenticated Proxmox VE API session
#[derive(Clone)]
pub struct ProxmoxClient {
    api: JsonApi,
}

impl ProxmoxClient {
    /// Exchange username/password for a ticket and return a client carrying it
    ///
    /// https://pve.proxmox.com/pve-docs/api-viewer/#/access/ticket
    pub async fn login(base: Url, creds: &Credentials) -> Result<Self> {
        let allow_invalid_certs = !creds.verify_tls;
        let anon = JsonApi::new(base.clone(), allow_invalid_certs)?;

        debug!("Requesting ticket for {} from {}", creds.username, base);
        let rsp: ResponseBase<TicketResponse> = anon
            .post_form(
                "/api2/json/access/ticket",
                &TicketRequest {
                    username: &creds.username,
                    password: &creds.password,
                },
            )
            .await
            .with_context(|| format!("Authentication failed for {}", creds.username))?;

        Ok(Self {
            api: JsonApi::cookie(
                base,
                &format!("PVEAuthCookie={}", rsp.data.ticket),
                allow_invalid_certs,
            )?,
        })
    }
}

#[async_trait]
impl ClusterApi for ProxmoxClient {
    async fn list_nodes(&self) -> Result<Vec<NodeResponse>> {
        let rsp: ResponseBase<Vec<NodeResponse>> = self.api.get("/api2/json/nodes").await?;
        Ok(rsp.data)
    }

    async fn list_vms(&self) -> Result<Vec<VmSummary>> {
        let rsp: ResponseBase<Vec<VmSummary>> = self
            .api
            .get("/api2/json/cluster/resources?type=vm")
            .await?;
        debug!("vm_list={:?}", rsp.data);
        Ok(rsp.data)
    }

    /// https://pve.proxmox.com/pve-docs/api-viewer/#/nodes/{node}/qemu/{vmid}/config
    async fn get_vm_config(&self, vm: &VmSummary) -> Result<VmConfig> {
        let rsp: ResponseBase<VmConfig> = self
            .api
            .get(&format!(
                "/api2/json/nodes/{}/{}/{}/config",
                vm.node, vm.vm_type, vm.vm_id
            ))
            .await?;
        Ok(rsp.data)
    }
}

#[derive(Serialize)]
struct TicketRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
pub struct ResponseBase<T> {
    pub data: T,
}

#[derive(Deserialize)]
pub struct TicketResponse {
    pub ticket: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeResponse {
    #[serde(rename = "node")]
    pub name: String,
    pub status: NodeStatus,
}
