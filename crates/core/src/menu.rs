//! Static navigation menu served to the admin frontend.
//!
//! Each top-level entry is gated by one permission; children inherit the
//! gate of their parent.

use serde::Serialize;

use crate::roles::permissions;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: &'static str,
    pub path: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    #[serde(skip)]
    pub permission: Option<&'static str>,
    #[serde(skip_serializing_if = "has_no_children")]
    pub children: &'static [MenuItem],
}

fn has_no_children(children: &&'static [MenuItem]) -> bool {
    children.is_empty()
}

const fn leaf(name: &'static str, path: &'static str, title: &'static str, icon: &'static str) -> MenuItem {
    MenuItem {
        name,
        path,
        title,
        icon,
        permission: None,
        children: &[],
    }
}

pub static MENU: &[MenuItem] = &[
    MenuItem {
        name: "Dashboard",
        path: "/dashboard",
        title: "Dashboard",
        icon: "lucide:layout-dashboard",
        permission: Some(permissions::ANALYSIS),
        children: &[
            leaf("FarmDashboard", "/farm-dashboard", "Farm overview", "lucide:sprout"),
            leaf("Workspace", "/workspace", "Workspace", "carbon:workspace"),
        ],
    },
    MenuItem {
        name: "Monitor",
        path: "/monitor",
        title: "Field monitoring",
        icon: "ep:monitor",
        permission: Some(permissions::MONITOR),
        children: &[],
    },
    MenuItem {
        name: "Field",
        path: "/field",
        title: "Fields",
        icon: "lucide:leaf",
        permission: Some(permissions::FARM),
        children: &[
            leaf("FieldManagement", "/field/management", "Field management", "lucide:trees"),
            leaf("FieldDetail", "/field/detail/:id", "Field detail", "lucide:microscope"),
        ],
    },
    MenuItem {
        name: "Activity",
        path: "/activity",
        title: "Farming activities",
        icon: "lucide:calendar-days",
        permission: Some(permissions::FARM),
        children: &[
            leaf("ActivityManagement", "/activity", "Activity management", "lucide:list-todo"),
            leaf("ActivityDetail", "/activity/detail/:id", "Activity detail", "lucide:file-text"),
            leaf("ActivityStatistics", "/activity/statistics", "Activity statistics", "lucide:bar-chart-3"),
        ],
    },
    MenuItem {
        name: "Equipment",
        path: "/equipment",
        title: "Equipment",
        icon: "ep:monitor",
        permission: Some(permissions::EQUIPMENT),
        children: &[
            leaf("EquipmentManagement", "/equipment/management", "Equipment management", "ep:list"),
            leaf("EquipmentDetail", "/equipment/detail/:id", "Equipment detail", "ep:document"),
        ],
    },
    MenuItem {
        name: "Alert",
        path: "/alert",
        title: "Alerts",
        icon: "lucide:bell-ring",
        permission: Some(permissions::ALERT),
        children: &[leaf("AlertManagement", "/alert", "Alert management", "lucide:bell")],
    },
    MenuItem {
        name: "System",
        path: "/system",
        title: "System",
        icon: "ep:setting",
        permission: Some(permissions::SYSTEM),
        children: &[
            leaf("SystemRole", "/system/role", "Roles", "ep:user-filled"),
            leaf("SystemUser", "/system/user", "Users", "ep:user"),
            leaf("Log", "/system/log", "Operation log", "list"),
        ],
    },
];

/// Top-level menu entries visible to a holder of `granted` permissions.
pub fn visible_menu<S: AsRef<str>>(granted: &[S]) -> Vec<&'static MenuItem> {
    MENU.iter()
        .filter(|item| match item.permission {
            None => true,
            Some(required) => granted.iter().any(|p| p.as_ref() == required),
        })
        .collect()
}
