//! Report-state entity schema for CSV import
//!
//! Every field is optional with a documented default; nothing in a state
//! row is a hard error.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::types::row::{RowIssue, RowOutcome};
use crate::types::schema::ImportSchema;

/// Raw state row as read from the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateRawRow {
    #[serde(alias = "name")]
    pub nombre: Option<String>,
    #[serde(alias = "description")]
    pub descripcion: Option<String>,
    pub color: Option<String>,
    #[serde(alias = "icon")]
    pub icono: Option<String>,
}

/// Fully resolved state candidate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
}

/// Normalize a hex color to `#RRGGBB`. Accepts an optional leading `#`
/// and any letter case; anything else is rejected.
fn parse_hex_color(s: &str) -> Option<String> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_uppercase()))
    } else {
        None
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// State import schema
#[derive(Debug, Clone, Copy)]
pub struct StateImport;

impl ImportSchema for StateImport {
    type Raw = StateRawRow;
    type Record = StateRecord;
    type Context = ();

    fn kind() -> &'static str {
        "state"
    }

    fn headers() -> &'static [&'static str] {
        &["nombre", "descripcion", "color", "icono"]
    }

    fn template_rows() -> Vec<StateRawRow> {
        vec![
            StateRawRow {
                nombre: Some("Nuevo".into()),
                descripcion: Some("Reporte recién recibido".into()),
                color: Some("#3B82F6".into()),
                icono: Some("inbox".into()),
            },
            StateRawRow {
                nombre: Some("Resuelto".into()),
                descripcion: Some("Reporte atendido y cerrado".into()),
                color: Some("#22C55E".into()),
                icono: Some("check-circle".into()),
            },
        ]
    }

    fn validate(raw: &StateRawRow, _ctx: &()) -> RowOutcome<StateRecord> {
        let mut warnings = Vec::new();

        let name = match trimmed(&raw.nombre) {
            Some(s) => s.to_string(),
            None => {
                warnings.push(RowIssue::new(
                    "nombre",
                    format!("Nombre vacío, se usará \"{}\"", defaults::DEFAULT_STATE_NAME),
                    None,
                ));
                defaults::DEFAULT_STATE_NAME.to_string()
            }
        };

        let description = match trimmed(&raw.descripcion) {
            Some(s) => s.to_string(),
            None => {
                warnings.push(RowIssue::new(
                    "descripcion",
                    "Descripción vacía, se importará vacía",
                    None,
                ));
                defaults::DEFAULT_STATE_DESCRIPTION.to_string()
            }
        };

        let color = match trimmed(&raw.color) {
            Some(s) => match parse_hex_color(s) {
                Some(c) => c,
                None => {
                    warnings.push(RowIssue::new(
                        "color",
                        format!(
                            "Color inválido \"{}\", se usará \"{}\"",
                            s,
                            defaults::DEFAULT_STATE_COLOR
                        ),
                        Some(s.to_string()),
                    ));
                    defaults::DEFAULT_STATE_COLOR.to_string()
                }
            },
            None => {
                warnings.push(RowIssue::new(
                    "color",
                    format!("Color vacío, se usará \"{}\"", defaults::DEFAULT_STATE_COLOR),
                    None,
                ));
                defaults::DEFAULT_STATE_COLOR.to_string()
            }
        };

        let icon = match trimmed(&raw.icono) {
            Some(s) => s.to_string(),
            None => {
                warnings.push(RowIssue::new(
                    "icono",
                    format!("Icono vacío, se usará \"{}\"", defaults::DEFAULT_STATE_ICON),
                    None,
                ));
                defaults::DEFAULT_STATE_ICON.to_string()
            }
        };

        RowOutcome::Valid {
            record: StateRecord {
                name,
                description,
                color,
                icon,
            },
            warnings,
        }
    }

    fn search_text(raw: &StateRawRow) -> Vec<&str> {
        [&raw.nombre, &raw.descripcion, &raw.color, &raw.icono]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .collect()
    }

    fn export_fields(raw: &StateRawRow) -> Vec<String> {
        [&raw.nombre, &raw.descripcion, &raw.color, &raw.icono]
            .into_iter()
            .map(|f| f.clone().unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> StateRawRow {
        StateRawRow {
            nombre: Some("En proceso".into()),
            descripcion: Some("El equipo está trabajando".into()),
            color: Some("#F59E0B".into()),
            icono: Some("wrench".into()),
        }
    }

    #[test]
    fn test_complete_row_has_no_warnings() {
        match StateImport::validate(&full_row(), &()) {
            RowOutcome::Valid { record, warnings } => {
                assert!(warnings.is_empty());
                assert_eq!(record.color, "#F59E0B");
            }
            RowOutcome::Invalid { .. } => panic!("state rows never hard-fail"),
        }
    }

    #[test]
    fn test_blank_color_defaults() {
        let mut raw = full_row();
        raw.color = None;
        match StateImport::validate(&raw, &()) {
            RowOutcome::Valid { record, warnings } => {
                assert_eq!(record.color, defaults::DEFAULT_STATE_COLOR);
                assert_eq!(warnings.len(), 1);
                assert_eq!(warnings[0].field, "color");
            }
            RowOutcome::Invalid { .. } => panic!("state rows never hard-fail"),
        }
    }

    #[test]
    fn test_malformed_color_is_soft_default_not_error() {
        let mut raw = full_row();
        raw.color = Some("notacolor".into());
        match StateImport::validate(&raw, &()) {
            RowOutcome::Valid { record, warnings } => {
                assert_eq!(record.color, defaults::DEFAULT_STATE_COLOR);
                assert_eq!(warnings[0].original_value.as_deref(), Some("notacolor"));
            }
            RowOutcome::Invalid { .. } => panic!("malformed color must stay soft"),
        }
    }

    #[test]
    fn test_color_without_hash_is_normalized() {
        let mut raw = full_row();
        raw.color = Some("3b82f6".into());
        match StateImport::validate(&raw, &()) {
            RowOutcome::Valid { record, warnings } => {
                assert_eq!(record.color, "#3B82F6");
                assert!(warnings.is_empty());
            }
            RowOutcome::Invalid { .. } => panic!("state rows never hard-fail"),
        }
    }

    #[test]
    fn test_fully_blank_row_gets_all_defaults() {
        match StateImport::validate(&StateRawRow::default(), &()) {
            RowOutcome::Valid { record, warnings } => {
                assert_eq!(record.name, defaults::DEFAULT_STATE_NAME);
                assert_eq!(record.color, defaults::DEFAULT_STATE_COLOR);
                assert_eq!(record.icon, defaults::DEFAULT_STATE_ICON);
                assert_eq!(warnings.len(), 4);
            }
            RowOutcome::Invalid { .. } => panic!("state rows never hard-fail"),
        }
    }

    #[test]
    fn test_parse_hex_color_rejects_short_and_garbage() {
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
        assert_eq!(parse_hex_color("#AABBCC"), Some("#AABBCC".to_string()));
    }
}
