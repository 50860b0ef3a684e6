use crate::host::{VmConfig, VmSummary, VmType};
use log::info;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Config keys which reference a disk image: a bus prefix and a port number
static DISK_SLOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(scsi|virtio|ide|sata|unused)\d+").unwrap());

/// Whether a guest config key names a disk slot
pub fn is_disk_slot(key: &str) -> bool {
    DISK_SLOT.is_match(key)
}

/// What to do with drives that have no media attached (`none,media=cdrom`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnattachedPolicy {
    #[default]
    Include,
    Skip,
}

/// One disk slot of one guest
///
/// Field order gives the sort order: node, vmid, name, slot, descriptor
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiskRecord {
    pub node: String,
    pub vm_id: u32,
    pub vm_name: String,
    pub slot: String,
    /// Raw config value, eg. `local-lvm:vm-100-disk-0,size=32G`
    pub descriptor: String,
    pub vm_type: VmType,
}

impl DiskRecord {
    pub fn is_cdrom(&self) -> bool {
        self.descriptor.contains("cdrom")
    }

    pub fn is_unattached(&self) -> bool {
        self.descriptor.starts_with("none")
    }
}

/// Guest name to the disks of that guest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskMap(BTreeMap<String, Vec<DiskRecord>>);

impl DiskMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: DiskRecord) {
        self.0
            .entry(record.vm_name.clone())
            .or_default()
            .push(record);
    }

    pub fn get(&self, vm_name: &str) -> Option<&[DiskRecord]> {
        self.0.get(vm_name).map(Vec::as_slice)
    }

    /// All records in presentation order
    pub fn sorted(&self) -> Vec<&DiskRecord> {
        let mut all: Vec<&DiskRecord> = self.0.values().flatten().collect();
        all.sort();
        all
    }
}

impl FromIterator<DiskRecord> for DiskMap {
    fn from_iter<T: IntoIterator<Item = DiskRecord>>(iter: T) -> Self {
        let mut map = DiskMap::new();
        for r in iter {
            map.insert(r);
        }
        map
    }
}

/// Picks the disk slots out of guest configs
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskClassifier {
    pub unattached: UnattachedPolicy,
}

impl DiskClassifier {
    pub fn new(unattached: UnattachedPolicy) -> Self {
        Self { unattached }
    }

    pub fn classify(&self, vm: &VmSummary, config: &VmConfig) -> Vec<DiskRecord> {
        let name = vm.display_name();
        let mut ret = Vec::new();
        for (key, value) in config.iter() {
            if !is_disk_slot(key) {
                continue;
            }
            info!("{}/{} drive: {}:{}", vm.vm_id, name, key, value);
            let record = DiskRecord {
                node: vm.node.clone(),
                vm_id: vm.vm_id,
                vm_name: name.clone(),
                slot: key.clone(),
                descriptor: value.clone(),
                vm_type: vm.vm_type,
            };
            if self.unattached == UnattachedPolicy::Skip && record.is_unattached() {
                info!(" not attached, skipping");
                continue;
            }
            ret.push(record);
        }
        ret
    }
}
