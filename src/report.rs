use crate::disks::{DiskMap, DiskRecord};
use crate::filter::LineFilter;
use crate::host::VmType;
use log::{debug, info};

/// Column the `# node:name` comment of a move command starts at
pub const MOVE_COMMENT_COLUMN: usize = 56;

/// What to print for each disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Manifest of every disk
    List,
    /// Commands moving every disk not already on `target`
    Move { target: String },
}

/// Render the report lines for `mode`
pub fn render(disks: &DiskMap, mode: &Mode, filter: &LineFilter) -> Vec<String> {
    match mode {
        Mode::List => device_lines(disks, filter),
        Mode::Move { target } => move_commands(disks, target, filter),
    }
}

/// `node name vmid slot descriptor`, one line per disk
pub fn device_lines(disks: &DiskMap, filter: &LineFilter) -> Vec<String> {
    disks
        .sorted()
        .into_iter()
        .map(format_device)
        .filter(|l| filter.accepts(l))
        .collect()
}

pub fn format_device(r: &DiskRecord) -> String {
    format!(
        "{} {:20} {:3} {:9} {}",
        r.node, r.vm_name, r.vm_id, r.slot, r.descriptor
    )
}

/// Move commands for every disk which can be and needs to be moved to `target`
pub fn move_commands(disks: &DiskMap, target: &str, filter: &LineFilter) -> Vec<String> {
    let mut ret = Vec::new();
    for r in disks.sorted() {
        debug!("{:?}", r);
        if r.is_cdrom() {
            debug!("Skipping: cannot move CDROM images");
            continue;
        }
        if r.descriptor.contains(target) {
            info!(
                "Skipping: target ({}) is same as current location ({})",
                target, r.descriptor
            );
            continue;
        }
        let line = format_move(r, target);
        if filter.accepts(&line) {
            ret.push(line);
        }
    }
    ret
}

pub fn format_move(r: &DiskRecord, target: &str) -> String {
    let cmd = match r.vm_type {
        VmType::Qemu => format!("qm move_disk {} {} {} --delete 1", r.vm_id, r.slot, target),
        VmType::Lxc => format!(
            "pct move-volume {} {} {} --delete 1",
            r.vm_id, r.slot, target
        ),
    };
    format!(
        "{:width$} # {}:{}",
        cmd,
        r.node,
        r.vm_name,
        width = MOVE_COMMENT_COLUMN
    )
}
