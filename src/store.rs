//! In-memory recipient collection: the single shared mutable resource.
//!
//! Mutation happens through a small set of explicit operations: append
//! (seed/import), per-recipient override edits, the enabled toggle, and the
//! atomic batch status flip driven by bulk generation. Nothing here deletes
//! recipients implicitly.

use crate::error::QueryError;
use crate::model::{CertificateStatus, PlaceholderOverride, Recipient};

/// The recipient collection plus the public query contract.
#[derive(Debug, Default)]
pub struct RecipientStore {
    recipients: Vec<Recipient>,
}

impl RecipientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(recipients: Vec<Recipient>) -> Self {
        Self { recipients }
    }

    pub fn append(&mut self, recipient: Recipient) {
        self.recipients.push(recipient);
    }

    pub fn extend(&mut self, recipients: impl IntoIterator<Item = Recipient>) {
        self.recipients.extend(recipients);
    }

    pub fn get(&self, id: &str) -> Option<&Recipient> {
        self.recipients.iter().find(|r| r.id == id)
    }

    /// Administrative listing: sees every record, disabled ones included.
    pub fn list(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Case-insensitive substring filter over name, certificate number, and
    /// award title. An empty term matches everything. This is the
    /// "currently filtered set" bulk generation falls back to.
    pub fn search(&self, term: &str) -> Vec<&Recipient> {
        let term = term.trim().to_lowercase();
        self.recipients
            .iter()
            .filter(|r| {
                term.is_empty()
                    || r.name.to_lowercase().contains(&term)
                    || r.cert_number.to_lowercase().contains(&term)
                    || r.award_title.to_lowercase().contains(&term)
            })
            .collect()
    }

    /// True if any recipient already carries this certificate number.
    pub fn has_cert_number(&self, cert_number: &str) -> bool {
        self.recipients.iter().any(|r| r.cert_number == cert_number)
    }

    /// Set or replace one placeholder override on a recipient. An override
    /// keyed to a placeholder that no longer exists is kept as inert data.
    pub fn set_override(
        &mut self,
        id: &str,
        key: impl Into<String>,
        ov: PlaceholderOverride,
    ) -> bool {
        match self.recipients.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.overrides.insert(key.into(), ov);
                true
            }
            None => false,
        }
    }

    pub fn clear_override(&mut self, id: &str, key: &str) -> bool {
        match self.recipients.iter_mut().find(|r| r.id == id) {
            Some(r) => r.overrides.remove(key).is_some(),
            None => false,
        }
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.recipients.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// The atomic batch status flip: every listed recipient becomes
    /// `Generated` in one call. Status never reverts; ids outside the list
    /// are untouched. Returns how many records changed.
    pub fn mark_generated(&mut self, ids: &[String]) -> usize {
        let mut flipped = 0;
        for r in &mut self.recipients {
            if ids.iter().any(|id| *id == r.id) && r.status == CertificateStatus::Pending {
                r.status = CertificateStatus::Generated;
                flipped += 1;
            }
        }
        flipped
    }

    /// Public query contract: find the unique recipient where name, phone,
    /// and organization all match exactly.
    ///
    /// The result never reveals which field mismatched: any non-match is
    /// `NotFound`; a full match on a disabled record is `Disabled`.
    pub fn query(&self, name: &str, phone: &str, org_id: &str) -> Result<&Recipient, QueryError> {
        let hit = self
            .recipients
            .iter()
            .find(|r| r.name == name && r.phone == phone && r.org_id == org_id);
        match hit {
            Some(r) if r.enabled => Ok(r),
            Some(_) => Err(QueryError::Disabled),
            None => Err(QueryError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(id: &str, name: &str, phone: &str, org: &str) -> Recipient {
        Recipient {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            award_title: "中国民族民间舞".into(),
            award_rank: "金奖".into(),
            date: "2024-05-20".into(),
            cert_number: format!("DANCE-2024-{id}"),
            org_id: org.into(),
            template_code: "HONOR_CERT_BLUE_FRAME".into(),
            overrides: Default::default(),
            status: CertificateStatus::Pending,
            enabled: true,
        }
    }

    #[test]
    fn query_requires_exact_triple_match() {
        let store = RecipientStore::seeded(vec![recipient("1", "陈小舞", "13800000001", "1")]);
        assert!(store.query("陈小舞", "13800000001", "1").is_ok());
        assert_eq!(
            store.query("陈小舞", "13800000001", "2"),
            Err(QueryError::NotFound)
        );
        assert_eq!(
            store.query("陈小舞", "13800000002", "1"),
            Err(QueryError::NotFound)
        );
        assert_eq!(
            store.query("林梦圆", "13800000001", "1"),
            Err(QueryError::NotFound)
        );
    }

    #[test]
    fn query_does_not_reveal_which_field_mismatched() {
        let store = RecipientStore::seeded(vec![recipient("1", "陈小舞", "13800000001", "1")]);
        let wrong_name = store.query("某某", "13800000001", "1").unwrap_err();
        let wrong_phone = store.query("陈小舞", "13900000000", "1").unwrap_err();
        assert_eq!(wrong_name, wrong_phone);
    }

    #[test]
    fn disabled_is_distinct_from_not_found_only_on_full_match() {
        let mut store = RecipientStore::seeded(vec![recipient("1", "陈小舞", "13800000001", "1")]);
        store.set_enabled("1", false);
        assert_eq!(
            store.query("陈小舞", "13800000001", "1"),
            Err(QueryError::Disabled)
        );
        // Disabled record with a wrong field is still NotFound
        assert_eq!(
            store.query("陈小舞", "13800000001", "2"),
            Err(QueryError::NotFound)
        );
    }

    #[test]
    fn mark_generated_only_touches_listed_ids() {
        let mut store = RecipientStore::seeded(vec![
            recipient("1", "a", "13800000001", "1"),
            recipient("2", "b", "13800000002", "1"),
        ]);
        let flipped = store.mark_generated(&["1".to_string()]);
        assert_eq!(flipped, 1);
        assert_eq!(store.get("1").unwrap().status, CertificateStatus::Generated);
        assert_eq!(store.get("2").unwrap().status, CertificateStatus::Pending);
    }

    #[test]
    fn enabled_is_independent_of_status() {
        let mut store = RecipientStore::seeded(vec![recipient("1", "a", "13800000001", "1")]);
        store.mark_generated(&["1".to_string()]);
        store.set_enabled("1", false);
        let r = store.get("1").unwrap();
        assert_eq!(r.status, CertificateStatus::Generated);
        assert!(!r.enabled);
        // Admin listing still sees it
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn search_filters_name_number_and_award() {
        let store = RecipientStore::seeded(vec![
            recipient("1", "陈小舞", "13800000001", "1"),
            recipient("2", "林梦圆", "13800000002", "2"),
        ]);
        assert_eq!(store.search("陈小").len(), 1);
        assert_eq!(store.search("dance-2024").len(), 2);
        assert_eq!(store.search("").len(), 2);
    }
}
