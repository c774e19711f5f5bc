//! Layout Resolver: merges a template's placeholder schema with a
//! recipient's partial overrides into the final placeholder set.
//!
//! Pure and deterministic: no I/O, identical inputs give identical output,
//! schema ordering is preserved.

use std::collections::HashMap;

use crate::model::{Placeholder, PlaceholderOverride};

/// Shallow-merge per-recipient overrides over a placeholder schema.
///
/// For each schema placeholder, the override for its `key` (if any) replaces
/// only the fields it sets; everything else keeps the base value. Override
/// entries whose key matches no schema placeholder are inert: they are
/// skipped here and intentionally left untouched in storage.
pub fn resolve(
    schema: &[Placeholder],
    overrides: &HashMap<String, PlaceholderOverride>,
) -> Vec<Placeholder> {
    schema
        .iter()
        .map(|base| match overrides.get(&base.key) {
            Some(ov) => apply(base, ov),
            None => base.clone(),
        })
        .collect()
}

fn apply(base: &Placeholder, ov: &PlaceholderOverride) -> Placeholder {
    Placeholder {
        id: base.id.clone(),
        key: base.key.clone(),
        label: base.label.clone(),
        x: ov.x.unwrap_or(base.x),
        y: ov.y.unwrap_or(base.y),
        width: ov.width.unwrap_or(base.width),
        height: ov.height.unwrap_or(base.height),
        font_size: ov.font_size.unwrap_or(base.font_size),
        color: ov.color.clone().unwrap_or_else(|| base.color.clone()),
        align: ov.align.unwrap_or(base.align),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Align;
    use pretty_assertions::assert_eq;

    fn name_placeholder() -> Placeholder {
        Placeholder {
            id: "p1".into(),
            key: "recipient_name".into(),
            label: "获奖人姓名".into(),
            x: 400.0,
            y: 350.0,
            width: 300.0,
            height: 60.0,
            font_size: 48.0,
            color: "#333333".into(),
            align: Align::Center,
        }
    }

    fn date_placeholder() -> Placeholder {
        Placeholder {
            id: "p3".into(),
            key: "cert_date".into(),
            label: "颁发日期".into(),
            x: 600.0,
            y: 650.0,
            width: 200.0,
            height: 40.0,
            font_size: 24.0,
            color: "#666666".into(),
            align: Align::Right,
        }
    }

    #[test]
    fn merge_keeps_unset_fields() {
        // Scenario: override only y and fontSize
        let schema = vec![name_placeholder()];
        let mut overrides = HashMap::new();
        overrides.insert(
            "recipient_name".to_string(),
            PlaceholderOverride {
                y: Some(360.0),
                font_size: Some(52.0),
                ..Default::default()
            },
        );

        let resolved = resolve(&schema, &overrides);
        assert_eq!(resolved.len(), 1);
        let r = &resolved[0];
        assert_eq!(r.x, 400.0);
        assert_eq!(r.y, 360.0);
        assert_eq!(r.font_size, 52.0);
        assert_eq!(r.color, "#333333");
        assert_eq!(r.align, Align::Center);
    }

    #[test]
    fn override_is_minimal() {
        // Only fontSize differs from base; everything else must be equal
        let schema = vec![name_placeholder()];
        let mut overrides = HashMap::new();
        overrides.insert(
            "recipient_name".to_string(),
            PlaceholderOverride {
                font_size: Some(52.0),
                ..Default::default()
            },
        );

        let resolved = resolve(&schema, &overrides);
        let mut expected = name_placeholder();
        expected.font_size = 52.0;
        assert_eq!(resolved[0], expected);
    }

    #[test]
    fn unknown_keys_are_inert() {
        let schema = vec![name_placeholder()];
        let mut overrides = HashMap::new();
        overrides.insert(
            "deleted_field".to_string(),
            PlaceholderOverride {
                x: Some(0.0),
                ..Default::default()
            },
        );

        let resolved = resolve(&schema, &overrides);
        assert_eq!(resolved, vec![name_placeholder()]);
    }

    #[test]
    fn idempotent_and_order_preserving() {
        let schema = vec![name_placeholder(), date_placeholder()];
        let mut overrides = HashMap::new();
        overrides.insert(
            "cert_date".to_string(),
            PlaceholderOverride {
                color: Some("#000000".into()),
                ..Default::default()
            },
        );

        let once = resolve(&schema, &overrides);
        let twice = resolve(&schema, &overrides);
        assert_eq!(once, twice);
        assert_eq!(once[0].key, "recipient_name");
        assert_eq!(once[1].key, "cert_date");
    }

    #[test]
    fn empty_override_changes_nothing() {
        let schema = vec![name_placeholder()];
        let mut overrides = HashMap::new();
        overrides.insert("recipient_name".to_string(), PlaceholderOverride::default());
        assert_eq!(resolve(&schema, &overrides), schema);
    }
}
