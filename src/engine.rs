//! Mutation entry points for [`ConfigDocument`].
//!
//! Every function takes the current document and returns the next one. None of
//! them fail: bad input is clamped or ignored, and the platform/mod rules are
//! re-applied after each change.

use crate::models::{ConfigDocument, GameSettings, ModRef, Platform};
use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::debug;

pub const PORT_RANGE: RangeInclusive<i64> = 1..=65535;
pub const PLAYER_COUNT_RANGE: RangeInclusive<i64> = 1..=256;
pub const MAX_VIEW_DISTANCE_RANGE: RangeInclusive<i64> = 500..=10000;
pub const MIN_GRASS_DISTANCE_RANGE: RangeInclusive<i64> = 0..=150;
pub const NETWORK_VIEW_DISTANCE_RANGE: RangeInclusive<i64> = 500..=5000;
pub const PLAYER_SAVE_TIME_RANGE: RangeInclusive<i64> = 1..=86_400;
pub const AI_LIMIT_RANGE: RangeInclusive<i64> = -1..=10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkField {
    BindAddress,
    BindPort,
    PublicAddress,
    PublicPort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum A2sField {
    Address,
    Port,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameField {
    Name,
    Password,
    PasswordAdmin,
    ScenarioId,
    PlayerCountLimit,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePropertiesField {
    ServerMaxViewDistance,
    ServerMinGrassDistance,
    NetworkViewDistance,
    DisableThirdPerson,
    FastValidation,
    BattlEye,
    VonDisableUi,
    VonDisableDirectSpeechUi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingField {
    LobbyPlayerSynchronise,
    PlayerSaveTime,
    AiLimit,
}

/// A scalar field of the document, grouped by section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Network(NetworkField),
    A2s(A2sField),
    Game(GameField),
    GameProperties(GamePropertiesField),
    Operating(OperatingField),
}

impl Field {
    pub const ALL: [Field; 23] = [
        Field::Network(NetworkField::BindAddress),
        Field::Network(NetworkField::BindPort),
        Field::Network(NetworkField::PublicAddress),
        Field::Network(NetworkField::PublicPort),
        Field::A2s(A2sField::Address),
        Field::A2s(A2sField::Port),
        Field::Game(GameField::Name),
        Field::Game(GameField::Password),
        Field::Game(GameField::PasswordAdmin),
        Field::Game(GameField::ScenarioId),
        Field::Game(GameField::PlayerCountLimit),
        Field::Game(GameField::Visible),
        Field::GameProperties(GamePropertiesField::ServerMaxViewDistance),
        Field::GameProperties(GamePropertiesField::ServerMinGrassDistance),
        Field::GameProperties(GamePropertiesField::NetworkViewDistance),
        Field::GameProperties(GamePropertiesField::DisableThirdPerson),
        Field::GameProperties(GamePropertiesField::FastValidation),
        Field::GameProperties(GamePropertiesField::BattlEye),
        Field::GameProperties(GamePropertiesField::VonDisableUi),
        Field::GameProperties(GamePropertiesField::VonDisableDirectSpeechUi),
        Field::Operating(OperatingField::LobbyPlayerSynchronise),
        Field::Operating(OperatingField::PlayerSaveTime),
        Field::Operating(OperatingField::AiLimit),
    ];

    /// Dotted name of the field as used by form inputs.
    pub fn path(self) -> &'static str {
        match self {
            Field::Network(NetworkField::BindAddress) => "bindAddress",
            Field::Network(NetworkField::BindPort) => "bindPort",
            Field::Network(NetworkField::PublicAddress) => "publicAddress",
            Field::Network(NetworkField::PublicPort) => "publicPort",
            Field::A2s(A2sField::Address) => "a2s.address",
            Field::A2s(A2sField::Port) => "a2s.port",
            Field::Game(GameField::Name) => "game.name",
            Field::Game(GameField::Password) => "game.password",
            Field::Game(GameField::PasswordAdmin) => "game.passwordAdmin",
            Field::Game(GameField::ScenarioId) => "game.scenarioId",
            Field::Game(GameField::PlayerCountLimit) => "game.playerCountLimit",
            Field::Game(GameField::Visible) => "game.visible",
            Field::GameProperties(field) => match field {
                GamePropertiesField::ServerMaxViewDistance => {
                    "game.gameProperties.serverMaxViewDistance"
                }
                GamePropertiesField::ServerMinGrassDistance => {
                    "game.gameProperties.serverMinGrassDistance"
                }
                GamePropertiesField::NetworkViewDistance => {
                    "game.gameProperties.networkViewDistance"
                }
                GamePropertiesField::DisableThirdPerson => "game.gameProperties.disableThirdPerson",
                GamePropertiesField::FastValidation => "game.gameProperties.fastValidation",
                GamePropertiesField::BattlEye => "game.gameProperties.battlEye",
                GamePropertiesField::VonDisableUi => "game.gameProperties.VONDisableUI",
                GamePropertiesField::VonDisableDirectSpeechUi => {
                    "game.gameProperties.VONDisableDirectSpeechUI"
                }
            },
            Field::Operating(OperatingField::LobbyPlayerSynchronise) => {
                "operating.lobbyPlayerSynchronise"
            }
            Field::Operating(OperatingField::PlayerSaveTime) => "operating.playerSaveTime",
            Field::Operating(OperatingField::AiLimit) => "operating.aiLimit",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.path() == trimmed)
            .ok_or_else(|| format!("unknown field: {value}"))
    }
}

/// Raw value coming from a form control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Text(String),
    Checked(bool),
}

impl FieldInput {
    pub fn text(value: impl Into<String>) -> Self {
        FieldInput::Text(value.into())
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            FieldInput::Checked(checked) => Some(*checked),
            FieldInput::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => Some(true),
                "false" | "off" | "0" => Some(false),
                _ => None,
            },
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            FieldInput::Text(text) => parse_integer(text),
            FieldInput::Checked(_) => None,
        }
    }
}

/// Parses numeric form text. Fractions are truncated; empty or non-numeric
/// text yields `None`.
pub fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let parsed = trimmed.parse::<f64>().ok().filter(|value| value.is_finite())?;
    Some(parsed.trunc() as i64)
}

pub fn clamp_to(value: i64, range: &RangeInclusive<i64>) -> i64 {
    value.clamp(*range.start(), *range.end())
}

/// Writes one scalar field, leaving every other field untouched.
pub fn set_field(doc: &ConfigDocument, field: Field, input: &FieldInput) -> ConfigDocument {
    let mut next = doc.clone();
    let applied = match field {
        Field::Network(target) => {
            let network = &mut next.network;
            match target {
                NetworkField::BindAddress => write_text(&mut network.bind_address, input),
                NetworkField::BindPort => write_integer(&mut network.bind_port, input, &PORT_RANGE),
                NetworkField::PublicAddress => write_text(&mut network.public_address, input),
                NetworkField::PublicPort => {
                    write_integer(&mut network.public_port, input, &PORT_RANGE)
                }
            }
        }
        Field::A2s(target) => match target {
            A2sField::Address => write_text(&mut next.a2s.address, input),
            A2sField::Port => write_integer(&mut next.a2s.port, input, &PORT_RANGE),
        },
        Field::Game(target) => {
            let game = &mut next.game;
            match target {
                GameField::Name => write_text(&mut game.name, input),
                GameField::Password => write_text(&mut game.password, input),
                GameField::PasswordAdmin => write_text(&mut game.password_admin, input),
                GameField::ScenarioId => write_text(&mut game.scenario_id, input),
                GameField::PlayerCountLimit => {
                    write_integer(&mut game.player_count_limit, input, &PLAYER_COUNT_RANGE)
                }
                GameField::Visible => write_bool(&mut game.visible, input),
            }
        }
        Field::GameProperties(target) => {
            let props = &mut next.game.game_properties;
            match target {
                GamePropertiesField::ServerMaxViewDistance => write_integer(
                    &mut props.server_max_view_distance,
                    input,
                    &MAX_VIEW_DISTANCE_RANGE,
                ),
                GamePropertiesField::ServerMinGrassDistance => write_integer(
                    &mut props.server_min_grass_distance,
                    input,
                    &MIN_GRASS_DISTANCE_RANGE,
                ),
                GamePropertiesField::NetworkViewDistance => write_integer(
                    &mut props.network_view_distance,
                    input,
                    &NETWORK_VIEW_DISTANCE_RANGE,
                ),
                GamePropertiesField::DisableThirdPerson => {
                    write_bool(&mut props.disable_third_person, input)
                }
                GamePropertiesField::FastValidation => write_bool(&mut props.fast_validation, input),
                GamePropertiesField::BattlEye => write_bool(&mut props.battl_eye, input),
                GamePropertiesField::VonDisableUi => write_bool(&mut props.von_disable_ui, input),
                GamePropertiesField::VonDisableDirectSpeechUi => {
                    write_bool(&mut props.von_disable_direct_speech_ui, input)
                }
            }
        }
        Field::Operating(target) => {
            let operating = &mut next.operating;
            match target {
                OperatingField::LobbyPlayerSynchronise => {
                    write_bool(&mut operating.lobby_player_synchronise, input)
                }
                OperatingField::PlayerSaveTime => write_integer(
                    &mut operating.player_save_time,
                    input,
                    &PLAYER_SAVE_TIME_RANGE,
                ),
                OperatingField::AiLimit => {
                    write_integer(&mut operating.ai_limit, input, &AI_LIMIT_RANGE)
                }
            }
        }
    };

    if !applied {
        debug!(field = %field, ?input, "ignoring input that does not fit the field");
    }
    next
}

/// Adds the mod if absent, removes it if present (matched by `modId`).
pub fn toggle_mod(doc: &ConfigDocument, mod_ref: ModRef) -> ConfigDocument {
    let mut next = doc.clone();
    let mods = &mut next.game.mods;
    if let Some(index) = mods.iter().position(|entry| entry.mod_id == mod_ref.mod_id) {
        mods.remove(index);
    } else {
        mods.push(mod_ref);
    }
    enforce_platform_rules(&mut next.game);
    next
}

/// Replaces the mod selection as a whole. Later duplicates are dropped.
pub fn set_mods(doc: &ConfigDocument, mods: Vec<ModRef>) -> ConfigDocument {
    let mut next = doc.clone();
    next.game.mods = dedupe_mods(mods);
    enforce_platform_rules(&mut next.game);
    next
}

/// Flips one platform tag. The base platform is put back afterwards, and a
/// mod-incompatible platform stays off while any mod is selected.
pub fn toggle_platform(doc: &ConfigDocument, platform: Platform) -> ConfigDocument {
    let mut next = doc.clone();
    let game = &mut next.game;
    if game.supported_platforms.contains(&platform) {
        game.supported_platforms.retain(|entry| *entry != platform);
    } else {
        game.supported_platforms.push(platform);
    }

    if !game.supported_platforms.contains(&Platform::BASE) {
        game.supported_platforms.push(Platform::BASE);
    }

    if platform == Platform::MOD_INCOMPATIBLE && !game.mods.is_empty() {
        debug!(%platform, "platform stays disabled while mods are selected");
        game.supported_platforms
            .retain(|entry| *entry != Platform::MOD_INCOMPATIBLE);
    }
    next
}

/// Re-establishes every invariant on a document from outside the engine.
pub fn normalize(mut doc: ConfigDocument) -> ConfigDocument {
    let network = &mut doc.network;
    network.bind_port = clamp_port(network.bind_port);
    network.public_port = clamp_port(network.public_port);
    doc.a2s.port = clamp_port(doc.a2s.port);

    let game = &mut doc.game;
    game.player_count_limit = clamp_u32(game.player_count_limit, &PLAYER_COUNT_RANGE);
    let props = &mut game.game_properties;
    props.server_max_view_distance =
        clamp_u32(props.server_max_view_distance, &MAX_VIEW_DISTANCE_RANGE);
    props.server_min_grass_distance =
        clamp_u32(props.server_min_grass_distance, &MIN_GRASS_DISTANCE_RANGE);
    props.network_view_distance =
        clamp_u32(props.network_view_distance, &NETWORK_VIEW_DISTANCE_RANGE);
    game.mods = dedupe_mods(std::mem::take(&mut game.mods));
    enforce_platform_rules(game);

    let operating = &mut doc.operating;
    operating.player_save_time = clamp_u32(operating.player_save_time, &PLAYER_SAVE_TIME_RANGE);
    operating.ai_limit = clamp_to(i64::from(operating.ai_limit), &AI_LIMIT_RANGE) as i32;
    doc
}

fn enforce_platform_rules(game: &mut GameSettings) {
    let mut seen = HashSet::new();
    game.supported_platforms.retain(|platform| seen.insert(*platform));
    if !game.supported_platforms.contains(&Platform::BASE) {
        game.supported_platforms.push(Platform::BASE);
    }
    if !game.mods.is_empty() {
        game.supported_platforms
            .retain(|platform| *platform != Platform::MOD_INCOMPATIBLE);
    }
}

fn dedupe_mods(mods: Vec<ModRef>) -> Vec<ModRef> {
    let mut seen = HashSet::new();
    mods.into_iter()
        .filter(|entry| seen.insert(entry.mod_id.clone()))
        .collect()
}

fn write_text(target: &mut String, input: &FieldInput) -> bool {
    match input {
        FieldInput::Text(text) => {
            *target = text.clone();
            true
        }
        FieldInput::Checked(_) => false,
    }
}

fn write_bool(target: &mut bool, input: &FieldInput) -> bool {
    match input.as_bool() {
        Some(value) => {
            *target = value;
            true
        }
        None => false,
    }
}

fn write_integer<T>(target: &mut T, input: &FieldInput, range: &RangeInclusive<i64>) -> bool
where
    T: TryFrom<i64>,
{
    let Some(value) = input.as_integer() else {
        return false;
    };
    match T::try_from(clamp_to(value, range)) {
        Ok(clamped) => {
            *target = clamped;
            true
        }
        Err(_) => false,
    }
}

fn clamp_port(port: u16) -> u16 {
    clamp_to(i64::from(port), &PORT_RANGE) as u16
}

fn clamp_u32(value: u32, range: &RangeInclusive<i64>) -> u32 {
    clamp_to(i64::from(value), range) as u32
}
