use crate::forms::{FieldRequest, FieldValue, ModToggleRequest, PlatformToggleRequest};
use arscfg::{
    engine::{self, Field, FieldInput},
    models::{ConfigDocument, ModRef, Platform},
};

pub fn field_input(value: FieldValue) -> FieldInput {
    match value {
        FieldValue::Checked(checked) => FieldInput::Checked(checked),
        FieldValue::Number(number) => FieldInput::Text(number.to_string()),
        FieldValue::Text(text) => FieldInput::Text(text),
    }
}

/// Unknown field names are the caller's mistake; bad values are not.
pub fn apply_field_request(
    doc: &ConfigDocument,
    request: FieldRequest,
) -> Result<ConfigDocument, String> {
    let field: Field = request.field.parse()?;
    Ok(engine::set_field(doc, field, &field_input(request.value)))
}

pub fn apply_mod_toggle(
    doc: &ConfigDocument,
    request: ModToggleRequest,
) -> Result<ConfigDocument, String> {
    let mod_ref = normalize_mod_ref(request.into())?;
    Ok(engine::toggle_mod(doc, mod_ref))
}

pub fn apply_mod_selection(
    doc: &ConfigDocument,
    mods: Vec<ModRef>,
) -> Result<ConfigDocument, String> {
    let mods = mods
        .into_iter()
        .map(normalize_mod_ref)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(engine::set_mods(doc, mods))
}

pub fn apply_platform_toggle(
    doc: &ConfigDocument,
    request: PlatformToggleRequest,
) -> Result<ConfigDocument, String> {
    let platform: Platform = request.platform.parse()?;
    Ok(engine::toggle_platform(doc, platform))
}

/// `Content-Disposition` value that makes browsers save the body as `file_name`.
pub fn attachment_disposition(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}

fn normalize_mod_ref(mod_ref: ModRef) -> Result<ModRef, String> {
    let mod_id = mod_ref.mod_id.trim();
    if mod_id.is_empty() {
        return Err("modId must not be empty".to_string());
    }
    let name = match mod_ref.name.trim() {
        "" => mod_id,
        name => name,
    };
    Ok(ModRef {
        mod_id: mod_id.to_string(),
        name: name.to_string(),
        version: mod_ref.version.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_coerced_like_form_text() {
        let request: FieldRequest =
            serde_json::from_str(r#"{"field":"game.playerCountLimit","value":500}"#).expect("json");
        let doc = apply_field_request(&ConfigDocument::default(), request).expect("apply");
        assert_eq!(doc.game.player_count_limit, 256);
    }

    #[test]
    fn checkbox_values_arrive_as_bools() {
        let request: FieldRequest =
            serde_json::from_str(r#"{"field":"game.visible","value":false}"#).expect("json");
        let doc = apply_field_request(&ConfigDocument::default(), request).expect("apply");
        assert!(!doc.game.visible);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let request: FieldRequest =
            serde_json::from_str(r#"{"field":"game.nope","value":"x"}"#).expect("json");
        assert!(apply_field_request(&ConfigDocument::default(), request).is_err());
    }

    #[test]
    fn blank_mod_id_is_rejected() {
        let request = ModToggleRequest {
            mod_id: "  ".to_string(),
            name: "Nameless".to_string(),
            version: String::new(),
        };
        assert!(apply_mod_toggle(&ConfigDocument::default(), request).is_err());
    }

    #[test]
    fn mod_name_falls_back_to_id() {
        let request = ModToggleRequest {
            mod_id: " 59727DAE364DEADB ".to_string(),
            name: String::new(),
            version: String::new(),
        };
        let doc = apply_mod_toggle(&ConfigDocument::default(), request).expect("apply");
        assert_eq!(doc.game.mods, vec![ModRef::new("59727DAE364DEADB", "59727DAE364DEADB")]);
    }

    #[test]
    fn export_downloads_as_server_config_file() {
        assert_eq!(
            attachment_disposition(arscfg::export::EXPORT_FILE_NAME),
            "attachment; filename=\"arma_server_config.json\""
        );
    }
}
