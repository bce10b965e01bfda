//! Version-scoped endpoint table of the SDI OS REST API.
//!
//! Every `(category, operation)` pair maps to the HTTP verbs the resource
//! accepts and an ordered list of version ranges, each carrying the path
//! template that is valid for it. The table is the contract between this
//! client and the server and must follow server releases.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::{SdiosError, SdiosResult};
use crate::types::HttpMethod;
use crate::types::HttpMethod::{
    Delete as DELETE, Get as GET, Head as HEAD, Options as OPTIONS, Post as POST, Put as PUT,
};
use crate::version::{ApiVersion, VersionRange};

/// Most recent API version known to this client.
pub const CURRENT_API_VERSION: ApiVersion = ApiVersion::new(2, 1, 0);

const V1: ApiVersion = ApiVersion::new(1, 0, 0);
const V2: ApiVersion = ApiVersion::new(2, 0, 0);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Categories
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resource family, the first level of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiCategory {
    #[serde(rename = "authentication")]
    Authentication,
    #[serde(rename = "users")]
    Users,
    #[serde(rename = "groups")]
    Groups,
    #[serde(rename = "tenancies")]
    Tenancies,
    #[serde(rename = "system settings")]
    SystemSettings,
    #[serde(rename = "system status")]
    SystemStatus,
    #[serde(rename = "system tasks")]
    SystemTasks,
    #[serde(rename = "disks")]
    Disks,
    #[serde(rename = "general")]
    General,
    #[serde(rename = "SDI files")]
    SdiFiles,
    #[serde(rename = "SDIs")]
    Sdis,
    #[serde(rename = "machines")]
    Machines,
    #[serde(rename = "machine interfaces")]
    MachineInterfaces,
    #[serde(rename = "machine drives")]
    MachineDrives,
    #[serde(rename = "machine snapshots")]
    MachineSnapshots,
    #[serde(rename = "machine routing")]
    MachineRouting,
    #[serde(rename = "networks")]
    Networks,
    #[serde(rename = "sharing")]
    Sharing,
}

impl ApiCategory {
    pub const ALL: [ApiCategory; 18] = [
        ApiCategory::Authentication,
        ApiCategory::Users,
        ApiCategory::Groups,
        ApiCategory::Tenancies,
        ApiCategory::SystemSettings,
        ApiCategory::SystemStatus,
        ApiCategory::SystemTasks,
        ApiCategory::Disks,
        ApiCategory::General,
        ApiCategory::SdiFiles,
        ApiCategory::Sdis,
        ApiCategory::Machines,
        ApiCategory::MachineInterfaces,
        ApiCategory::MachineDrives,
        ApiCategory::MachineSnapshots,
        ApiCategory::MachineRouting,
        ApiCategory::Networks,
        ApiCategory::Sharing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiCategory::Authentication => "authentication",
            ApiCategory::Users => "users",
            ApiCategory::Groups => "groups",
            ApiCategory::Tenancies => "tenancies",
            ApiCategory::SystemSettings => "system settings",
            ApiCategory::SystemStatus => "system status",
            ApiCategory::SystemTasks => "system tasks",
            ApiCategory::Disks => "disks",
            ApiCategory::General => "general",
            ApiCategory::SdiFiles => "SDI files",
            ApiCategory::Sdis => "SDIs",
            ApiCategory::Machines => "machines",
            ApiCategory::MachineInterfaces => "machine interfaces",
            ApiCategory::MachineDrives => "machine drives",
            ApiCategory::MachineSnapshots => "machine snapshots",
            ApiCategory::MachineRouting => "machine routing",
            ApiCategory::Networks => "networks",
            ApiCategory::Sharing => "sharing",
        }
    }
}

impl fmt::Display for ApiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiCategory {
    type Err = SdiosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SdiosError::invalid_url(format!("Unknown API category: {s}")))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Templates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Relative URL path with `{name}` placeholders, e.g. `sdis/{sdi_id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointTemplate(String);

impl EndpointTemplate {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    names.push(&after[..close]);
                    rest = &after[close + 1..];
                }
                None => break,
            }
        }
        names
    }

    /// Substitute every `{name}` with its value from `args`.
    ///
    /// Args that no placeholder mentions are ignored.
    pub fn render(&self, args: &HashMap<String, String>) -> SdiosResult<String> {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                SdiosError::url_format(format!("Unterminated placeholder in template {}", self.0))
            })?;
            let name = &after[..close];
            let value = args.get(name).ok_or_else(|| {
                SdiosError::url_format(format!(
                    "Missing URL argument {name:?} for template {}",
                    self.0
                ))
            })?;
            out.push_str(value);
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl fmt::Display for EndpointTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One `(category, operation)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub methods: Vec<HttpMethod>,
    /// Ranges in table order; resolution is first-match.
    pub urls: Vec<(VersionRange, EndpointTemplate)>,
}

impl Endpoint {
    pub fn new(methods: &[HttpMethod]) -> Self {
        Self {
            methods: methods.to_vec(),
            urls: Vec::new(),
        }
    }

    pub fn url(mut self, range: VersionRange, template: impl Into<String>) -> Self {
        self.urls.push((range, EndpointTemplate::new(template)));
        self
    }

    pub fn allows(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }

    /// Reject entries whose ranges overlap.
    pub fn validate(&self) -> SdiosResult<()> {
        for (i, (a, ta)) in self.urls.iter().enumerate() {
            for (b, tb) in &self.urls[i + 1..] {
                if a.overlaps(b) {
                    return Err(SdiosError::invalid_table(format!(
                        "Version ranges {a} ({ta}) and {b} ({tb}) overlap"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// `(category, operation) -> Endpoint` lookup.
#[derive(Debug, Clone, Default)]
pub struct VersionTable {
    entries: HashMap<ApiCategory, HashMap<String, Endpoint>>,
}

lazy_static! {
    static ref STANDARD_TABLE: Arc<VersionTable> = Arc::new(VersionTable::from_trusted(standard_entries()));
}

impl VersionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the built-in SDI OS table.
    pub fn standard() -> Arc<VersionTable> {
        Arc::clone(&STANDARD_TABLE)
    }

    /// Add an entry, rejecting overlapping ranges and duplicates.
    pub fn insert(
        &mut self,
        category: ApiCategory,
        operation: impl Into<String>,
        endpoint: Endpoint,
    ) -> SdiosResult<()> {
        let operation = operation.into();
        endpoint
            .validate()
            .map_err(|e| SdiosError::invalid_table(format!("{category}/{operation}: {}", e.message)))?;
        let ops = self.entries.entry(category).or_default();
        if ops.contains_key(&operation) {
            return Err(SdiosError::invalid_table(format!(
                "Duplicate endpoint {category}/{operation}"
            )));
        }
        ops.insert(operation, endpoint);
        Ok(())
    }

    pub fn try_from_entries<I, S>(entries: I) -> SdiosResult<Self>
    where
        I: IntoIterator<Item = (ApiCategory, S, Endpoint)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (category, operation, endpoint) in entries {
            table.insert(category, operation, endpoint)?;
        }
        Ok(table)
    }

    fn from_trusted(entries: Vec<(ApiCategory, &'static str, Endpoint)>) -> Self {
        let mut table = Self::new();
        for (category, operation, endpoint) in entries {
            table
                .entries
                .entry(category)
                .or_default()
                .insert(operation.to_string(), endpoint);
        }
        table
    }

    pub fn get(&self, category: ApiCategory, operation: &str) -> Option<&Endpoint> {
        self.entries.get(&category)?.get(operation)
    }

    /// Like [`get`](Self::get) but fails with `InvalidUrl` for unknown entries.
    pub fn endpoint(&self, category: ApiCategory, operation: &str) -> SdiosResult<&Endpoint> {
        self.get(category, operation).ok_or_else(|| {
            SdiosError::invalid_url(format!("No endpoint {operation:?} in category {category}"))
        })
    }

    pub fn operations(&self, category: ApiCategory) -> Vec<&str> {
        let mut ops: Vec<&str> = self
            .entries
            .get(&category)
            .map(|ops| ops.keys().map(String::as_str).collect())
            .unwrap_or_default();
        ops.sort_unstable();
        ops
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Built-in SDI OS table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const R: &[HttpMethod] = &[GET, HEAD, OPTIONS];
const RC: &[HttpMethod] = &[GET, POST, HEAD, OPTIONS];
const RU: &[HttpMethod] = &[GET, PUT, HEAD, OPTIONS];
const RUD: &[HttpMethod] = &[GET, PUT, DELETE, HEAD, OPTIONS];
const RD: &[HttpMethod] = &[GET, DELETE, HEAD, OPTIONS];
const C: &[HttpMethod] = &[POST, HEAD, OPTIONS];
const U: &[HttpMethod] = &[PUT, HEAD, OPTIONS];
const ACTION: &[HttpMethod] = &[PUT, OPTIONS];

/// Valid for every released version.
fn all(methods: &[HttpMethod], path: &str) -> Endpoint {
    Endpoint::new(methods).url(VersionRange::closed(V1, CURRENT_API_VERSION), path)
}

/// Valid from 2.0.0 only.
fn since_v2(methods: &[HttpMethod], path: &str) -> Endpoint {
    Endpoint::new(methods).url(VersionRange::closed(V2, CURRENT_API_VERSION), path)
}

/// Valid in 1.0.0 only.
fn v1_only(methods: &[HttpMethod], path: &str) -> Endpoint {
    Endpoint::new(methods).url(VersionRange::exact(V1), path)
}

/// Moved in 2.0.0.
fn moved(methods: &[HttpMethod], legacy: &str, current: &str) -> Endpoint {
    Endpoint::new(methods)
        .url(VersionRange::exact(V1), legacy)
        .url(VersionRange::closed(V2, CURRENT_API_VERSION), current)
}

/// Per-SDI resources: `clouds/{pk}/{sdi_id}/...` in 1.0.0, `sdis/{sdi_id}/...` since.
fn sdi_scoped(methods: &[HttpMethod], suffix: &str) -> Endpoint {
    moved(
        methods,
        &format!("clouds/{{pk}}/{{sdi_id}}/{suffix}"),
        &format!("sdis/{{sdi_id}}/{suffix}"),
    )
}

/// Per-machine resources.
fn machine_scoped(methods: &[HttpMethod], suffix: &str) -> Endpoint {
    sdi_scoped(methods, &format!("machines/{{machine_id}}/{suffix}"))
}

fn standard_entries() -> Vec<(ApiCategory, &'static str, Endpoint)> {
    use ApiCategory::*;

    vec![
        (Authentication, "token", all(RC, "accounts/login/token/")),
        // users
        (Users, "list", all(RC, "accounts/users/")),
        (Users, "detail", all(RUD, "accounts/users/{pk}/")),
        (Users, "sharing_networks", since_v2(R, "accounts/users/{pk}/networks/")),
        (Users, "sharing_sdis", since_v2(R, "accounts/users/{pk}/sdis/")),
        (Users, "sharing_disks", since_v2(R, "accounts/users/{pk}/disks/")),
        // groups
        (Groups, "list", all(RC, "accounts/groups/")),
        (Groups, "detail", all(RUD, "accounts/groups/{group_pk}/")),
        (Groups, "membership", all(RU, "accounts/groups/{group_pk}/membership/")),
        (Groups, "sharing_networks", since_v2(R, "accounts/groups/{group_pk}/networks/")),
        (Groups, "sharing_sdis", since_v2(R, "accounts/groups/{group_pk}/sdis/")),
        (Groups, "sharing_disks", since_v2(R, "accounts/groups/{group_pk}/disks/")),
        // tenancies
        (Tenancies, "list", all(RC, "accounts/tenancies/")),
        (Tenancies, "detail", all(RUD, "accounts/tenancies/{ten_pk}/")),
        (Tenancies, "security", all(RU, "accounts/tenancies/{ten_pk}/security/")),
        (Tenancies, "default", all(R, "accounts/tenancies/default/")),
        // system
        (SystemSettings, "detail", all(RU, "system/settings/")),
        (SystemSettings, "physical_networks", all(RU, "system/settings/physical_networks/")),
        (SystemSettings, "license", all(R, "system/settings/license/")),
        (SystemSettings, "ssl", all(RU, "system/settings/ssl/")),
        (SystemSettings, "version", all(R, "system/settings/version/")),
        (SystemStatus, "detail", all(R, "system/status/")),
        (SystemStatus, "nodes", all(R, "system/status/nodes/")),
        (SystemTasks, "system_list", all(R, "system/tasks/")),
        (SystemTasks, "user_list", all(R, "system/tasks/{pk}/")),
        (SystemTasks, "user_detail", moved(RD, "system/tasks/{pk}/{lrpid}/", "system/tasks/{lrpid}/")),
        (SystemTasks, "reorder", all(&[POST, OPTIONS], "system/tasks/reorder/")),
        // disks
        (Disks, "list", all(RC, "storage/disks/")),
        (Disks, "upload_list", moved(RU, "storage/disks/{pk}/upload/", "storage/disks/{pk}/uploads/")),
        (
            Disks,
            "upload_detail",
            moved(RUD, "storage/disks/{pk}/upload/{disk_upload_key}/", "storage/disks/uploads/{disk_upload_key}/"),
        ),
        (Disks, "user_list", all(RC, "storage/disks/{pk}/")),
        (Disks, "user_detail", moved(RUD, "storage/disks/{pk}/{image_id}/", "storage/disks/{image_id}/")),
        (Disks, "copy", moved(C, "storage/disks/{pk}/{image_id}/copy/", "storage/disks/{image_id}/copy/")),
        (
            Disks,
            "permissions",
            moved(RU, "storage/disks/{pk}/{image_id}/permissions/", "storage/disks/{image_id}/permissions/"),
        ),
        // general storage
        (General, "list", all(R, "storage/general/")),
        (General, "user_list", all(RC, "storage/general/{pk}/")),
        (
            General,
            "directory_list",
            all(&[GET, POST, DELETE, HEAD, OPTIONS], "storage/general/{pk}/directory/{directory_key}/"),
        ),
        (General, "file_details", all(RD, "storage/general/{pk}/file/{file_key}/")),
        (General, "file_move", all(U, "storage/general/{pk}/file/{file_key}/move/")),
        (General, "upload_list", moved(RC, "storage/general/{pk}/upload/", "storage/general/{pk}/uploads/")),
        (
            General,
            "upload_details",
            moved(
                RUD,
                "storage/general/{pk}/upload/{general_upload_key}/",
                "storage/general/uploads/{general_upload_key}/",
            ),
        ),
        // SDI files
        (SdiFiles, "list", moved(R, "storage/ici/", "storage/sdi/")),
        (SdiFiles, "user_list", moved(R, "storage/ici/{pk}/", "storage/sdi/{pk}/")),
        (SdiFiles, "file_detail", moved(RD, "storage/ici/{pk}/file/{file_key}/", "storage/sdi/{pk}/file/{file_key}/")),
        (
            SdiFiles,
            "import",
            moved(U, "storage/ici/{pk}/file/{file_key}/import/", "storage/sdi/{pk}/file/{file_key}/import/"),
        ),
        (SdiFiles, "upload_list", moved(RC, "storage/ici/{pk}/upload/", "storage/sdi/{pk}/uploads/")),
        (
            SdiFiles,
            "upload_detail",
            moved(RUD, "storage/ici/{pk}/upload/{file_upload_key}/", "storage/sdi/uploads/{file_upload_key}/"),
        ),
        // SDIs
        (Sdis, "list", moved(R, "clouds/", "sdis/")),
        (Sdis, "user_list", moved(RC, "clouds/{pk}/", "sdis/{pk}/")),
        (Sdis, "user_detail", sdi_scoped(RUD, "")),
        (Sdis, "copy", sdi_scoped(C, "copy/")),
        (Sdis, "export", sdi_scoped(C, "export/")),
        (Sdis, "permissions", sdi_scoped(RU, "permissions/")),
        (Sdis, "start", sdi_scoped(C, "start/")),
        (Sdis, "stop", sdi_scoped(C, "stop/")),
        (Sdis, "settings", sdi_scoped(RU, "settings/")),
        (Sdis, "checkpoint", sdi_scoped(RC, "checkpoints/")),
        (Sdis, "checkpoint_detail", sdi_scoped(RUD, "checkpoints/{check_tag}/")),
        (Sdis, "port_list", sdi_scoped(RC, "ports/")),
        (Sdis, "history", sdi_scoped(R, "history/")),
        (Sdis, "status", sdi_scoped(R, "status/")),
        (Sdis, "persist", sdi_scoped(RU, "persist/")),
        (Sdis, "overview", sdi_scoped(R, "overview/")),
        // machines
        (Machines, "list", sdi_scoped(RC, "machines/")),
        (Machines, "detail", machine_scoped(RUD, "")),
        (Machines, "vnc", machine_scoped(R, "vnc/")),
        (Machines, "status", machine_scoped(R, "status/")),
        (Machines, "start", machine_scoped(ACTION, "start/")),
        (Machines, "stop", machine_scoped(ACTION, "stop/")),
        (Machines, "power_off", machine_scoped(ACTION, "power_off/")),
        (Machines, "resume", machine_scoped(ACTION, "resume/")),
        (Machines, "suspend", machine_scoped(ACTION, "suspend/")),
        (MachineInterfaces, "list", machine_scoped(RC, "interfaces/")),
        (MachineInterfaces, "detail", machine_scoped(RUD, "interfaces/{connection_id}/")),
        (MachineInterfaces, "port_list", machine_scoped(R, "interfaces/{connection_id}/ports/")),
        (MachineInterfaces, "vlan_list", machine_scoped(RC, "interfaces/{connection_id}/vlans/")),
        (MachineInterfaces, "vlan_detail", machine_scoped(RUD, "interfaces/{connection_id}/vlans/{vlan_id}/")),
        (
            MachineInterfaces,
            "vlan_port_list",
            machine_scoped(RC, "interfaces/{connection_id}/vlans/{vlan_id}/ports/"),
        ),
        (
            MachineInterfaces,
            "vlan_port_detail",
            machine_scoped(RD, "interfaces/{connection_id}/vlans/{vlan_id}/ports/{port_id}"),
        ),
        (MachineDrives, "list", machine_scoped(RC, "drives/")),
        (MachineDrives, "order", machine_scoped(RU, "drives/order/")),
        (MachineDrives, "detail", machine_scoped(RUD, "drives/{disk_slot}/")),
        (MachineDrives, "save_new", machine_scoped(U, "drives/{disk_slot}/save_new/")),
        (MachineDrives, "save_base", machine_scoped(U, "drives/{disk_slot}/save_base/")),
        (MachineSnapshots, "list", machine_scoped(RC, "snapshots/")),
        (MachineSnapshots, "detail", machine_scoped(RUD, "snapshots/{snap_tag}/")),
        (MachineRouting, "detail", machine_scoped(R, "routing/")),
        (MachineRouting, "settings", machine_scoped(RU, "routing/settings/")),
        (MachineRouting, "keychains", machine_scoped(RU, "routing/keychains/")),
        (MachineRouting, "interface_list", machine_scoped(R, "routing/interfaces/")),
        (MachineRouting, "interface_detail", machine_scoped(RU, "routing/interfaces/{connection_id}/")),
        // networks
        (Networks, "list", sdi_scoped(RC, "networks/")),
        (Networks, "detail", sdi_scoped(RUD, "networks/{network_id}/")),
        (Networks, "replug", sdi_scoped(U, "networks/{network_id}/replug/")),
        (Networks, "service_list", sdi_scoped(RC, "networks/{network_id}/services/")),
        (Networks, "service_detail", sdi_scoped(RUD, "networks/{network_id}/services/{service_id}/")),
        (Networks, "pool_list", sdi_scoped(RC, "networks/{network_id}/services/{service_id}/pools/")),
        (
            Networks,
            "pool_detail",
            sdi_scoped(RUD, "networks/{network_id}/services/{service_id}/pools/{pool_id}/"),
        ),
        // sharing (1.0.0 layout, folded into accounts/ since 2.0.0)
        (Sharing, "network_list", v1_only(R, "sharing/networks/")),
        (Sharing, "user_list", v1_only(R, "sharing/networks/users/")),
        (Sharing, "user_detail", moved(R, "sharing/networks/users/{pk}/", "accounts/users/{pk}/networks/")),
        (Sharing, "group_list", v1_only(R, "sharing/networks/groups/")),
        (
            Sharing,
            "group_detail",
            moved(R, "sharing/networks/groups/{group_pk}/", "accounts/groups/{group_pk}/networks/"),
        ),
    ]
}
