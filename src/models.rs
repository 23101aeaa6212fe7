use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_GAME_PORT: u16 = 2001;
pub const DEFAULT_A2S_PORT: u16 = 17777;

/// Distribution targets a server can accept players from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "PLATFORM_PC")]
    Pc,
    #[serde(rename = "PLATFORM_XBL")]
    Xbox,
    #[serde(rename = "PLATFORM_PSN")]
    PlayStation,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Pc, Platform::Xbox, Platform::PlayStation];

    /// Always present in `supportedPlatforms`.
    pub const BASE: Platform = Platform::Pc;

    /// Cannot be combined with mods.
    pub const MOD_INCOMPATIBLE: Platform = Platform::PlayStation;

    pub fn tag(self) -> &'static str {
        match self {
            Platform::Pc => "PLATFORM_PC",
            Platform::Xbox => "PLATFORM_XBL",
            Platform::PlayStation => "PLATFORM_PSN",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|platform| platform.tag() == value.trim())
            .ok_or_else(|| format!("unknown platform tag: {value}"))
    }
}

/// The server.json document handed to the dedicated server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(flatten)]
    pub network: NetworkSettings,
    pub a2s: A2sSettings,
    pub operating: OperatingSettings,
    pub game: GameSettings,
}

impl ConfigDocument {
    pub fn has_mods(&self) -> bool {
        !self.game.mods.is_empty()
    }

    pub fn supports(&self, platform: Platform) -> bool {
        self.game.supported_platforms.contains(&platform)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkSettings {
    pub bind_address: String,
    #[serde(deserialize_with = "saturating::port")]
    pub bind_port: u16,
    pub public_address: String,
    #[serde(deserialize_with = "saturating::port")]
    pub public_port: u16,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            bind_address: String::new(),
            bind_port: DEFAULT_GAME_PORT,
            public_address: String::new(),
            public_port: DEFAULT_GAME_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct A2sSettings {
    pub address: String,
    #[serde(deserialize_with = "saturating::port")]
    pub port: u16,
}

impl Default for A2sSettings {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_A2S_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperatingSettings {
    pub lobby_player_synchronise: bool,
    #[serde(deserialize_with = "saturating::unsigned")]
    pub player_save_time: u32,
    /// `-1` means no cap.
    #[serde(deserialize_with = "saturating::signed")]
    pub ai_limit: i32,
}

impl Default for OperatingSettings {
    fn default() -> Self {
        Self {
            lobby_player_synchronise: true,
            player_save_time: 120,
            ai_limit: -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    pub name: String,
    pub password: String,
    pub password_admin: String,
    pub scenario_id: String,
    #[serde(deserialize_with = "saturating::unsigned")]
    pub player_count_limit: u32,
    pub visible: bool,
    pub supported_platforms: Vec<Platform>,
    pub game_properties: GameProperties,
    pub mods: Vec<ModRef>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            password: String::new(),
            password_admin: String::new(),
            scenario_id: String::new(),
            player_count_limit: 32,
            visible: true,
            supported_platforms: vec![Platform::BASE],
            game_properties: GameProperties::default(),
            mods: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameProperties {
    #[serde(deserialize_with = "saturating::unsigned")]
    pub server_max_view_distance: u32,
    #[serde(deserialize_with = "saturating::unsigned")]
    pub server_min_grass_distance: u32,
    #[serde(deserialize_with = "saturating::unsigned")]
    pub network_view_distance: u32,
    pub disable_third_person: bool,
    pub fast_validation: bool,
    pub battl_eye: bool,
    #[serde(rename = "VONDisableUI")]
    pub von_disable_ui: bool,
    #[serde(rename = "VONDisableDirectSpeechUI")]
    pub von_disable_direct_speech_ui: bool,
    /// Passed through to the server untouched.
    pub mission_header: serde_json::Map<String, serde_json::Value>,
}

impl Default for GameProperties {
    fn default() -> Self {
        Self {
            server_max_view_distance: 1600,
            server_min_grass_distance: 0,
            network_view_distance: 1500,
            disable_third_person: false,
            fast_validation: true,
            battl_eye: true,
            von_disable_ui: false,
            von_disable_direct_speech_ui: false,
            mission_header: serde_json::Map::new(),
        }
    }
}

/// A selected catalog entry as it appears in `game.mods`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModRef {
    pub mod_id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl ModRef {
    pub fn new(mod_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mod_id: mod_id.into(),
            name: name.into(),
            version: String::new(),
        }
    }
}

/// One item of the remote optional-content catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "scenariosIds", alias = "scenarioIds")]
    pub scenario_ids: Vec<String>,
}

impl From<&CatalogEntry> for ModRef {
    fn from(entry: &CatalogEntry) -> Self {
        ModRef::new(entry.id.clone(), entry.name.clone())
    }
}

/// Numeric fields read any JSON number and saturate into their storage type,
/// leaving the range checks to `engine::normalize`.
mod saturating {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireNumber {
        Integer(i64),
        Float(f64),
    }

    fn wide<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(match WireNumber::deserialize(deserializer)? {
            WireNumber::Integer(value) => value,
            // `as` saturates and truncates, matching form input.
            WireNumber::Float(value) => value as i64,
        })
    }

    pub fn port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        let value = wide(deserializer)?;
        Ok(u16::try_from(value).unwrap_or(if value < 0 { 0 } else { u16::MAX }))
    }

    pub fn unsigned<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = wide(deserializer)?;
        Ok(u32::try_from(value).unwrap_or(if value < 0 { 0 } else { u32::MAX }))
    }

    pub fn signed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        let value = wide(deserializer)?;
        Ok(i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_sample() {
        let doc = ConfigDocument::default();
        assert_eq!(doc.network.bind_port, 2001);
        assert_eq!(doc.a2s.port, 17777);
        assert_eq!(doc.game.player_count_limit, 32);
        assert_eq!(doc.game.supported_platforms, vec![Platform::Pc]);
        assert!(doc.game.mods.is_empty());
        assert_eq!(doc.operating.ai_limit, -1);
    }

    #[test]
    fn network_keys_sit_at_top_level() {
        let value = serde_json::to_value(ConfigDocument::default()).expect("serialize");
        assert_eq!(value.get("bindPort").and_then(|v| v.as_u64()), Some(2001));
        assert!(value.get("network").is_none());
        let props = &value["game"]["gameProperties"];
        assert_eq!(props.get("VONDisableUI"), Some(&serde_json::Value::Bool(false)));
        assert_eq!(props.get("battlEye"), Some(&serde_json::Value::Bool(true)));
    }

    #[test]
    fn platform_tags_parse() {
        assert_eq!("PLATFORM_XBL".parse::<Platform>(), Ok(Platform::Xbox));
        assert!("PLATFORM_SWITCH".parse::<Platform>().is_err());
    }

    #[test]
    fn catalog_entry_accepts_both_spellings() {
        let wire: CatalogEntry =
            serde_json::from_str(r#"{"id":"A","name":"Mod A","scenariosIds":["s1"]}"#).expect("wire");
        let alt: CatalogEntry =
            serde_json::from_str(r#"{"id":"A","name":"Mod A","scenarioIds":["s1"]}"#).expect("alt");
        assert_eq!(wire, alt);
        assert_eq!(wire.scenario_ids, vec!["s1"]);
    }

    #[test]
    fn numbers_saturate_instead_of_failing() {
        let doc: ConfigDocument = serde_json::from_str(
            r#"{"bindPort": 70000, "publicPort": -3, "a2s": {"port": 2.9e3},
                "operating": {"aiLimit": -99999999999, "playerSaveTime": 18446744073709551615},
                "game": {"playerCountLimit": -5}}"#,
        )
        .expect("parse");
        assert_eq!(doc.network.bind_port, u16::MAX);
        assert_eq!(doc.network.public_port, 0);
        assert_eq!(doc.a2s.port, 2900);
        assert_eq!(doc.operating.ai_limit, i32::MIN);
        assert_eq!(doc.operating.player_save_time, u32::MAX);
        assert_eq!(doc.game.player_count_limit, 0);
    }
}
