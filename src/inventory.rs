use crate::disks::{DiskClassifier, DiskMap};
use crate::host::{ClusterApi, NodeStatus};
use anyhow::{Context, Result};
use log::{debug, info, warn};

/// Walk every guest in the cluster and collect its disks
///
/// Requests are made one after another, the first failure aborts the walk.
pub async fn collect_disks(api: &dyn ClusterApi, classifier: &DiskClassifier) -> Result<DiskMap> {
    let nodes = api.list_nodes().await.context("Failed to list nodes")?;
    for n in &nodes {
        if n.status == NodeStatus::Online {
            info!("Node {} is online", n.name);
        } else {
            warn!("Node {} is {:?}", n.name, n.status);
        }
    }

    let vms = api.list_vms().await.context("Failed to list VMs")?;
    debug!("Found {} guests", vms.len());

    let mut disks = DiskMap::new();
    for vm in &vms {
        let config = api.get_vm_config(vm).await.with_context(|| {
            format!(
                "Failed to get config of {} {} on {}",
                vm.vm_type, vm.vm_id, vm.node
            )
        })?;
        debug!("{}/{} config: {:?}", vm.vm_id, vm.display_name(), config);
        for record in classifier.classify(vm, &config) {
            disks.insert(record);
        }
    }
    Ok(disks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disks::UnattachedPolicy;
    use crate::filter::LineFilter;
    use crate::host::VmType;
    use crate::mocks::MockCluster;
    use crate::report::{Mode, render};

    fn cluster() -> MockCluster {
        let mut c = MockCluster::default();
        c.add_node("pve1", NodeStatus::Online);
        c.add_node("pve2", NodeStatus::Online);
        c.add_vm(
            "pve1",
            100,
            Some("web01"),
            VmType::Qemu,
            &[
                ("scsi0", "local-lvm:vm-100-disk-0,size=32G"),
                ("ide2", "none,media=cdrom"),
                ("scsihw", "virtio-scsi-pci"),
                ("net0", "virtio=bc:24:11:00:00:01,bridge=vmbr0"),
            ],
        );
        c.add_vm(
            "pve2",
            101,
            Some("db01"),
            VmType::Qemu,
            &[
                ("virtio0", "vm-block-storage-VMs:vm-101-disk-0,size=64G"),
                ("virtio1", "local-lvm:vm-101-disk-1,size=128G"),
                ("efidisk0", "local-lvm:vm-101-disk-2,size=1M"),
            ],
        );
        c.add_vm(
            "pve2",
            200,
            None,
            VmType::Lxc,
            &[
                ("rootfs", "local-lvm:vm-200-disk-0,size=8G"),
                ("unused0", "local-lvm:vm-200-disk-1"),
            ],
        );
        c
    }

    #[tokio::test]
    async fn collect_all_guests() -> Result<()> {
        let c = cluster();
        let disks = collect_disks(&c, &DiskClassifier::default()).await?;

        assert_eq!(disks.get("web01").map(|d| d.len()), Some(2));
        assert_eq!(disks.get("db01").map(|d| d.len()), Some(2));
        assert_eq!(disks.get("200").map(|d| d.len()), Some(1));
        assert_eq!(disks.sorted().len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn collect_skip_unattached() -> Result<()> {
        let c = cluster();
        let disks = collect_disks(&c, &DiskClassifier::new(UnattachedPolicy::Skip)).await?;
        assert_eq!(disks.get("web01").map(|d| d.len()), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn config_failure_aborts() {
        let mut c = cluster();
        c.fail_config(101);
        let err = collect_disks(&c, &DiskClassifier::default())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("qemu 101 on pve2"));
    }

    #[tokio::test]
    async fn move_report() -> Result<()> {
        let c = cluster();
        let disks = collect_disks(&c, &DiskClassifier::default()).await?;
        let lines = render(
            &disks,
            &Mode::Move {
                target: "vm-block-storage-VMs".to_string(),
            },
            &LineFilter::default(),
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("qm move_disk 100 scsi0 vm-block-storage-VMs --delete 1"));
        assert!(lines[1].starts_with("qm move_disk 101 virtio1 vm-block-storage-VMs --delete 1"));
        assert!(lines[2].starts_with("pct move-volume 200 unused0 vm-block-storage-VMs --delete 1"));
        assert!(lines[2].ends_with("# pve2:200"));
        Ok(())
    }

    #[tokio::test]
    async fn listing_over_http() -> Result<()> {
        use crate::host::ProxmoxClient;
        use crate::settings::Credentials;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let ok = |body: serde_json::Value| ResponseTemplate::new(200).set_body_json(body);
        Mock::given(method("POST"))
            .and(path("/api2/json/access/ticket"))
            .respond_with(ok(serde_json::json!({"data": {"ticket": "PVE:t"}})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes"))
            .respond_with(ok(serde_json::json!({"data": [{"node": "node1", "status": "online"}]})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api2/json/cluster/resources"))
            .respond_with(ok(serde_json::json!({
                "data": [{"type": "qemu", "node": "node1", "vmid": 100, "name": "vm1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes/node1/qemu/100/config"))
            .respond_with(ok(serde_json::json!({
                "data": {
                    "scsi0": "local-lvm:100/disk-0.qcow2,size=10G",
                    "scsihw": "virtio-scsi-pci",
                    "cores": 2
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let creds = Credentials {
            host: "node1".to_string(),
            username: "root@pam".to_string(),
            password: "x".to_string(),
            port: None,
            verify_tls: false,
        };
        let client = ProxmoxClient::login(server.uri().parse()?, &creds).await?;
        let disks = collect_disks(&client, &DiskClassifier::default()).await?;
        let lines = render(&disks, &Mode::List, &LineFilter::default());
        assert_eq!(
            lines,
            vec!["node1 vm1                  100 scsi0     local-lvm:100/disk-0.qcow2,size=10G"]
        );
        Ok(())
    }
}
