//! Selectable scenarios and mods derived from the catalog.

use crate::models::{CatalogEntry, ModRef};
use serde::Serialize;

pub const OFFICIAL_GROUP_LABEL: &str = "Official Scenarios";

/// Scenarios shipped with the game, always offered first.
pub const BUILTIN_SCENARIOS: [&str; 3] = [
    "{ECC61978EDCC2B5A}Missions/23_Campaign.conf",
    "{59AD59368755F41A}Missions/21_GM_Eden.conf",
    "{2BBBE828037C6F4B}Missions/22_GM_Arland.conf",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioGroup {
    pub label: String,
    pub scenario_ids: Vec<String>,
}

pub fn project_scenarios(catalog: &[CatalogEntry]) -> Vec<ScenarioGroup> {
    let official = ScenarioGroup {
        label: OFFICIAL_GROUP_LABEL.to_string(),
        scenario_ids: BUILTIN_SCENARIOS.iter().map(|id| id.to_string()).collect(),
    };

    std::iter::once(official)
        .chain(
            catalog
                .iter()
                .filter(|entry| !entry.scenario_ids.is_empty())
                .map(|entry| ScenarioGroup {
                    label: entry.name.clone(),
                    scenario_ids: entry.scenario_ids.clone(),
                }),
        )
        .collect()
}

pub fn mod_options(catalog: &[CatalogEntry]) -> Vec<ModRef> {
    catalog.iter().map(ModRef::from).collect()
}

/// `{GUID}Missions/Name.conf` -> `Name`.
pub fn scenario_display_name(scenario_id: &str) -> Option<String> {
    let marker = "Missions/";
    let start = scenario_id.find(marker).map(|idx| idx + marker.len())?;
    let name_with_ext = &scenario_id[start..];
    let name = name_with_ext.strip_suffix(".conf").unwrap_or(name_with_ext);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, scenarios: &[&str]) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            scenario_ids: scenarios.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn official_group_leads_and_empty_entries_drop() {
        let catalog = vec![entry("A", "Mod A", &["s1"]), entry("B", "Mod B", &[])];
        let groups = project_scenarios(&catalog);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Official Scenarios", "Mod A"]);
        assert_eq!(groups[0].scenario_ids.len(), 3);
        assert_eq!(groups[1].scenario_ids, vec!["s1"]);
    }

    #[test]
    fn empty_catalog_still_offers_builtins() {
        let groups = project_scenarios(&[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].scenario_ids, BUILTIN_SCENARIOS.to_vec());
    }

    #[test]
    fn groups_keep_catalog_order() {
        let catalog = vec![
            entry("C", "Zeta", &["z"]),
            entry("D", "Alpha", &["a1", "a2"]),
        ];
        let labels: Vec<String> = project_scenarios(&catalog)
            .into_iter()
            .skip(1)
            .map(|g| g.label)
            .collect();
        assert_eq!(labels, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn mod_options_carry_ids_and_names() {
        let options = mod_options(&[entry("A", "Mod A", &[])]);
        assert_eq!(options, vec![ModRef::new("A", "Mod A")]);
    }

    #[test]
    fn display_name_strips_guid_and_extension() {
        assert_eq!(
            scenario_display_name(BUILTIN_SCENARIOS[0]),
            Some("23_Campaign".to_string())
        );
        assert_eq!(scenario_display_name("{ABC}Missions/"), None);
        assert_eq!(scenario_display_name("no-marker"), None);
    }
}
