//! Template registry, per-template placeholder schemas, and the
//! organization directory.
//!
//! Schemas are keyed by template code, so each template owns its layout.
//! Recipient-level adjustments layer on top via
//! [`PlaceholderOverride`](crate::model::PlaceholderOverride) at resolve
//! time and never live here.

use std::collections::HashMap;

use crate::error::CertError;
use crate::model::{Organization, Placeholder, Recipient, Template};

/// Holds templates (by unique uppercase code), their placeholder schemas,
/// and the organization directory.
///
/// `Clone` is cheap enough that long-running work (e.g. a render batch)
/// takes a snapshot instead of holding a registry lock.
#[derive(Debug, Default, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
    schemas: HashMap<String, Vec<Placeholder>>,
    organizations: Vec<Organization>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. The code is uppercase-normalized; a duplicate
    /// code is rejected.
    pub fn register(&mut self, mut template: Template) -> Result<(), CertError> {
        template.code = template.code.trim().to_uppercase();
        if template.code.is_empty() {
            return Err(CertError::Template("template code must not be empty".into()));
        }
        if self.template(&template.code).is_some() {
            return Err(CertError::Template(format!(
                "duplicate template code {}",
                template.code
            )));
        }
        self.templates.push(template);
        Ok(())
    }

    /// Look up a template by code (case-insensitive).
    pub fn template(&self, code: &str) -> Option<&Template> {
        let code = code.trim().to_uppercase();
        self.templates.iter().find(|t| t.code == code)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Remove a template. Its schema goes with it; recipients referencing
    /// the code keep their data and surface a configuration error at
    /// render time instead.
    pub fn remove_template(&mut self, code: &str) -> bool {
        let code = code.trim().to_uppercase();
        let before = self.templates.len();
        self.templates.retain(|t| t.code != code);
        self.schemas.remove(&code);
        self.templates.len() != before
    }

    /// Resolve the template a recipient references, surfacing an unknown
    /// code as a configuration error rather than panicking downstream.
    pub fn template_for(&self, recipient: &Recipient) -> Result<&Template, CertError> {
        self.template(&recipient.template_code).ok_or_else(|| {
            CertError::Template(format!(
                "recipient {} references unknown template code {}",
                recipient.id, recipient.template_code
            ))
        })
    }

    /// Replace the placeholder schema for a template. Keys must be unique
    /// within the schema; the template must exist.
    pub fn set_schema(
        &mut self,
        code: &str,
        placeholders: Vec<Placeholder>,
    ) -> Result<(), CertError> {
        let code = code.trim().to_uppercase();
        if self.template(&code).is_none() {
            return Err(CertError::Template(format!("unknown template code {}", code)));
        }
        ensure_unique_keys(&placeholders)?;
        self.schemas.insert(code, placeholders);
        Ok(())
    }

    /// The ordered placeholder schema for a template code. Empty when no
    /// schema has been configured.
    pub fn schema(&self, code: &str) -> &[Placeholder] {
        let code = code.trim().to_uppercase();
        self.schemas.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append one placeholder to a template's schema, rejecting key clashes.
    pub fn add_placeholder(
        &mut self,
        code: &str,
        placeholder: Placeholder,
    ) -> Result<(), CertError> {
        let code = code.trim().to_uppercase();
        if self.template(&code).is_none() {
            return Err(CertError::Template(format!("unknown template code {}", code)));
        }
        let schema = self.schemas.entry(code).or_default();
        if schema.iter().any(|p| p.key == placeholder.key) {
            return Err(CertError::Schema(format!(
                "duplicate placeholder key {}",
                placeholder.key
            )));
        }
        schema.push(placeholder);
        Ok(())
    }

    /// Remove a placeholder by id. Overrides pointing at its key become
    /// inert dead data on recipients; they are not purged.
    pub fn remove_placeholder(&mut self, code: &str, id: &str) -> bool {
        let code = code.trim().to_uppercase();
        match self.schemas.get_mut(&code) {
            Some(schema) => {
                let before = schema.len();
                schema.retain(|p| p.id != id);
                schema.len() != before
            }
            None => false,
        }
    }

    pub fn add_organization(&mut self, org: Organization) {
        self.organizations.push(org);
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn org_name(&self, id: &str) -> Option<&str> {
        self.organizations
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.name.as_str())
    }
}

pub(crate) fn ensure_unique_keys(placeholders: &[Placeholder]) -> Result<(), CertError> {
    let mut seen = std::collections::HashSet::new();
    for p in placeholders {
        if !seen.insert(p.key.as_str()) {
            return Err(CertError::Schema(format!(
                "duplicate placeholder key {}",
                p.key
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Align, Orientation, TemplateFormat};

    fn template(code: &str) -> Template {
        Template {
            id: "t1".into(),
            code: code.into(),
            name: "荣誉证书模板".into(),
            description: String::new(),
            orientation: Orientation::LandscapeA4,
            format: TemplateFormat::Png,
            background_image: String::new(),
        }
    }

    fn placeholder(id: &str, key: &str) -> Placeholder {
        Placeholder {
            id: id.into(),
            key: key.into(),
            label: key.into(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 40.0,
            font_size: 24.0,
            color: "#333333".into(),
            align: Align::Left,
        }
    }

    #[test]
    fn codes_are_uppercase_normalized() {
        let mut reg = TemplateRegistry::new();
        reg.register(template("honor_cert_blue_frame")).unwrap();
        assert!(reg.template("HONOR_CERT_BLUE_FRAME").is_some());
        assert!(reg.template("honor_cert_blue_frame").is_some());
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let mut reg = TemplateRegistry::new();
        reg.register(template("A")).unwrap();
        assert!(matches!(
            reg.register(template("a")),
            Err(CertError::Template(_))
        ));
    }

    #[test]
    fn schema_rejects_duplicate_keys() {
        let mut reg = TemplateRegistry::new();
        reg.register(template("A")).unwrap();
        let result = reg.set_schema(
            "A",
            vec![placeholder("p1", "recipient_name"), placeholder("p2", "recipient_name")],
        );
        assert!(matches!(result, Err(CertError::Schema(_))));
    }

    #[test]
    fn schema_for_unknown_template_is_an_error() {
        let mut reg = TemplateRegistry::new();
        assert!(matches!(
            reg.set_schema("NOPE", vec![]),
            Err(CertError::Template(_))
        ));
        assert!(reg.schema("NOPE").is_empty());
    }

    #[test]
    fn add_placeholder_preserves_order() {
        let mut reg = TemplateRegistry::new();
        reg.register(template("A")).unwrap();
        reg.add_placeholder("A", placeholder("p1", "recipient_name"))
            .unwrap();
        reg.add_placeholder("A", placeholder("p2", "cert_date")).unwrap();
        let keys: Vec<_> = reg.schema("A").iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["recipient_name", "cert_date"]);
    }
}
