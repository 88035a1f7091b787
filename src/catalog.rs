// nrcctl - CLI for the nagrestconf REST API
// Copyright (C) 2024 The nrcctl authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Static field catalogs for every entity kind the REST API exposes.
//!
//! Each kind declares its fields once, in the order the server documents
//! them. That order is used for rendering; [`EntityKind::list_fields`] gives
//! the sorted view used for listings.

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum EntityKind {
    Hosts,
    Services,
    Servicesets,
    Hosttemplates,
    Servicetemplates,
    Hostgroups,
    Servicegroups,
    Contacts,
    Contactgroups,
    Commands,
    Hostextinfo,
    Serviceesc,
}

const HOST_FIELDS: &[&str] = &[
    "name",
    "alias",
    "ipaddress",
    "template",
    "hostgroup",
    "contact",
    "contactgroups",
    "activechecks",
    "servicesets",
    "disable",
    "displayname",
    "parents",
    "command",
    "initialstate",
    "maxcheckattempts",
    "checkinterval",
    "retryinterval",
    "passivechecks",
    "checkperiod",
    "obsessoverhost",
    "checkfreshness",
    "freshnessthresh",
    "eventhandler",
    "eventhandlerenabled",
    "lowflapthresh",
    "highflapthresh",
    "flapdetectionenabled",
    "flapdetectionoptions",
    "processperfdata",
    "retainstatusinfo",
    "retainnonstatusinfo",
    "notifinterval",
    "firstnotifdelay",
    "notifperiod",
    "notifopts",
    "notifications_enabled",
    "stalkingoptions",
    "notes",
    "notes_url",
    "icon_image",
    "icon_image_alt",
    "vrml_image",
    "statusmap_image",
    "coords2d",
    "coords3d",
    "action_url",
    "customvars",
];

// Services and service sets share one layout.
const SERVICE_FIELDS: &[&str] = &[
    "name",
    "template",
    "command",
    "svcdesc",
    "svcgroup",
    "contacts",
    "contactgroups",
    "freshnessthresh",
    "activechecks",
    "customvars",
    "disable",
    "displayname",
    "isvolatile",
    "initialstate",
    "maxcheckattempts",
    "checkinterval",
    "retryinterval",
    "passivechecks",
    "checkperiod",
    "obsessoverservice",
    "manfreshnessthresh",
    "checkfreshness",
    "eventhandler",
    "eventhandlerenabled",
    "lowflapthresh",
    "highflapthresh",
    "flapdetectionenabled",
    "flapdetectionoptions",
    "processperfdata",
    "retainstatusinfo",
    "retainnonstatusinfo",
    "notifinterval",
    "firstnotifdelay",
    "notifperiod",
    "notifopts",
    "notifications_enabled",
    "stalkingoptions",
    "notes",
    "notes_url",
    "action_url",
    "icon_image",
    "icon_image_alt",
    "vrml_image",
    "statusmap_image",
    "coords2d",
    "coords3d",
];

const HOST_TEMPLATE_FIELDS: &[&str] = &[
    "name",
    "use",
    "contacts",
    "contactgroups",
    "normchecki",
    "checkinterval",
    "retryinterval",
    "notifperiod",
    "notifopts",
    "disable",
    "checkperiod",
    "maxcheckattempts",
    "checkcommand",
    "notifinterval",
    "passivechecks",
    "obsessoverhost",
    "checkfreshness",
    "freshnessthresh",
    "eventhandler",
    "eventhandlerenabled",
    "lowflapthresh",
    "highflapthresh",
    "flapdetectionenabled",
    "flapdetectionoptions",
    "processperfdata",
    "retainstatusinfo",
    "retainnonstatusinfo",
    "firstnotifdelay",
    "notifications_enabled",
    "stalkingoptions",
    "notes",
    "notes_url",
    "icon_image",
    "icon_image_alt",
    "vrml_image",
    "statusmap_image",
    "coords2d",
    "coords3d",
    "action_url",
];

const SERVICE_TEMPLATE_FIELDS: &[&str] = &[
    "name",
    "use",
    "contacts",
    "contactgroups",
    "notifopts",
    "checkinterval",
    "normchecki",
    "retryinterval",
    "notifinterval",
    "notifperiod",
    "disable",
    "checkperiod",
    "maxcheckattempts",
    "freshnessthresh",
    "activechecks",
    "customvars",
    "isvolatile",
    "initialstate",
    "passivechecks",
    "obsessoverservice",
    "manfreshnessthresh",
    "checkfreshness",
    "eventhandler",
    "eventhandlerenabled",
    "lowflapthresh",
    "highflapthresh",
    "flapdetectionenabled",
    "flapdetectionoptions",
    "processperfdata",
    "retainstatusinfo",
    "retainnonstatusinfo",
    "firstnotifdelay",
    "notifications_enabled",
    "stalkingoptions",
    "notes",
    "notes_url",
    "action_url",
    "icon_image",
    "icon_image_alt",
    "vrml_image",
    "statusmap_image",
    "coords2d",
    "coords3d",
];

const HOST_GROUP_FIELDS: &[&str] = &[
    "name",
    "alias",
    "disable",
    "members",
    "hostgroupmembers",
    "notes",
    "notes_url",
    "action_url",
];

const SERVICE_GROUP_FIELDS: &[&str] = &[
    "name",
    "alias",
    "disable",
    "members",
    "servicegroupmembers",
    "notes",
    "notes_url",
    "action_url",
];

const CONTACT_FIELDS: &[&str] = &[
    "name",
    "use",
    "alias",
    "emailaddr",
    "svcnotifperiod",
    "svcnotifopts",
    "svcnotifcmds",
    "hstnotifperiod",
    "hstnotifopts",
    "hstnotifcmds",
    "cansubmitcmds",
    "disable",
    "svcnotifenabled",
    "hstnotifenabled",
    "pager",
    "address1",
    "address2",
    "address3",
    "address4",
    "address5",
    "address6",
    "retainstatusinfo",
    "retainnonstatusinfo",
    "contactgroups",
];

const CONTACT_GROUP_FIELDS: &[&str] = &["name", "alias", "members", "disable"];

const COMMAND_FIELDS: &[&str] = &["name", "command", "disable"];

const HOST_EXT_INFO_FIELDS: &[&str] = &[
    "hostname",
    "notes",
    "notes_url",
    "action_url",
    "icon_image",
    "icon_image_alt",
    "vrml_image",
    "statusmap_image",
    "coords2d",
    "coords3d",
    "disable",
];

const SERVICE_ESC_FIELDS: &[&str] = &[
    "hostname",
    "hostgroupname",
    "svcdesc",
    "contacts",
    "contactgroups",
    "firstnotif",
    "lastnotif",
    "notifinterval",
    "period",
    "escopts",
    "disable",
];

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Hosts,
        EntityKind::Services,
        EntityKind::Servicesets,
        EntityKind::Hosttemplates,
        EntityKind::Servicetemplates,
        EntityKind::Hostgroups,
        EntityKind::Servicegroups,
        EntityKind::Contacts,
        EntityKind::Contactgroups,
        EntityKind::Commands,
        EntityKind::Hostextinfo,
        EntityKind::Serviceesc,
    ];

    /// Name used in endpoint paths, e.g. `show/hosttemplates`.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Hosts => "hosts",
            EntityKind::Services => "services",
            EntityKind::Servicesets => "servicesets",
            EntityKind::Hosttemplates => "hosttemplates",
            EntityKind::Servicetemplates => "servicetemplates",
            EntityKind::Hostgroups => "hostgroups",
            EntityKind::Servicegroups => "servicegroups",
            EntityKind::Contacts => "contacts",
            EntityKind::Contactgroups => "contactgroups",
            EntityKind::Commands => "commands",
            EntityKind::Hostextinfo => "hostextinfo",
            EntityKind::Serviceesc => "serviceesc",
        }
    }

    /// Fields in declaration order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::Hosts => HOST_FIELDS,
            EntityKind::Services | EntityKind::Servicesets => SERVICE_FIELDS,
            EntityKind::Hosttemplates => HOST_TEMPLATE_FIELDS,
            EntityKind::Servicetemplates => SERVICE_TEMPLATE_FIELDS,
            EntityKind::Hostgroups => HOST_GROUP_FIELDS,
            EntityKind::Servicegroups => SERVICE_GROUP_FIELDS,
            EntityKind::Contacts => CONTACT_FIELDS,
            EntityKind::Contactgroups => CONTACT_GROUP_FIELDS,
            EntityKind::Commands => COMMAND_FIELDS,
            EntityKind::Hostextinfo => HOST_EXT_INFO_FIELDS,
            EntityKind::Serviceesc => SERVICE_ESC_FIELDS,
        }
    }

    /// Fields sorted lexicographically.
    pub fn list_fields(self) -> Vec<&'static str> {
        let mut fields = self.fields().to_vec();
        fields.sort_unstable();
        fields
    }

    /// Fields that must be present when adding a record of this kind.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::Hosttemplates => &[
                "name",
                "checkinterval",
                "retryinterval",
                "notifperiod",
                "checkperiod",
                "maxcheckattempts",
                "notifinterval",
            ],
            EntityKind::Services | EntityKind::Servicesets => {
                &["name", "template", "command", "svcdesc"]
            }
            EntityKind::Commands => &["name", "command"],
            EntityKind::Contactgroups => &["name", "alias", "members"],
            EntityKind::Hostgroups => &["name", "alias"],
            _ => &[],
        }
    }

    /// Fields the server stores percent-encoded.
    pub fn encoded_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::Hosts => &["command", "alias"],
            EntityKind::Services | EntityKind::Servicesets => &["name", "command", "svcdesc"],
            EntityKind::Hosttemplates => &["checkcommand", "action_url"],
            EntityKind::Servicetemplates => &["action_url"],
            EntityKind::Commands => &["name", "command"],
            _ => &[],
        }
    }

    pub fn contains(self, field: &str) -> bool {
        self.fields().contains(&field)
    }

    pub fn is_encoded(self, field: &str) -> bool {
        self.encoded_fields().contains(&field)
    }

    pub fn position(self, field: &str) -> Option<usize> {
        self.fields().iter().position(|f| *f == field)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown entity kind `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn list_fields_is_sorted_and_complete() {
        for kind in EntityKind::ALL {
            let listed = kind.list_fields();
            let mut sorted = listed.clone();
            sorted.sort();
            assert_eq!(listed, sorted, "{kind} not sorted");
            assert_eq!(listed.len(), kind.fields().len());
            assert_eq!(kind.list_fields(), listed);
        }
    }

    #[test]
    fn field_names_are_unique_per_kind() {
        for kind in EntityKind::ALL {
            let unique: HashSet<_> = kind.fields().iter().collect();
            assert_eq!(unique.len(), kind.fields().len(), "{kind} has duplicates");
        }
    }

    #[test]
    fn required_and_encoded_fields_belong_to_the_catalog() {
        for kind in EntityKind::ALL {
            for field in kind.required_fields().iter().chain(kind.encoded_fields()) {
                assert!(kind.contains(field), "{kind} lacks {field}");
            }
        }
    }

    #[test]
    fn host_template_required_fields() {
        let required: HashSet<_> = EntityKind::Hosttemplates
            .required_fields()
            .iter()
            .copied()
            .collect();
        let expected: HashSet<_> = [
            "name",
            "checkinterval",
            "retryinterval",
            "notifperiod",
            "checkperiod",
            "maxcheckattempts",
            "notifinterval",
        ]
        .into_iter()
        .collect();
        assert_eq!(required, expected);
        assert!(EntityKind::Hostextinfo.required_fields().is_empty());
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("servicesets".parse::<EntityKind>(), Ok(EntityKind::Servicesets));
        assert_eq!(EntityKind::Serviceesc.to_string(), "serviceesc");
        assert!("Hosts".parse::<EntityKind>().is_err());
        let value = <EntityKind as ValueEnum>::from_str("hosttemplates", false);
        assert_eq!(value, Ok(EntityKind::Hosttemplates));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(EntityKind::Commands.contains("command"));
        assert!(!EntityKind::Commands.contains("Command"));
        assert_eq!(EntityKind::Commands.position("disable"), Some(2));
        assert!(EntityKind::Hosts.is_encoded("command"));
        assert!(!EntityKind::Hosts.is_encoded("name"));
    }
}
