//! Recipient import: parse, validate-all, then commit or fail as a unit.
//!
//! Validation never stops at the first problem; every row is checked and
//! every error reported, each tagged with its row and (where known) column.
//! Commit is all-or-nothing over the valid rows. A session carries a
//! generation counter so a validation result arriving after the dialog was
//! closed is recognized as stale and dropped.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::CertError;
use crate::model::{Recipient, RowRef, ValidationError};
use crate::registry::TemplateRegistry;
use crate::store::RecipientStore;

const MAX_NAME_CHARS: usize = 50;
const MAX_AWARD_TITLE_CHARS: usize = 100;
const MAX_AWARD_RANK_CHARS: usize = 20;
const MAX_CERT_NUMBER_CHARS: usize = 64;

/// One row as parsed from the uploaded file, fields still optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    /// 1-based data row number in the source file.
    pub row: u32,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub award_title: Option<String>,
    pub award_rank: Option<String>,
    pub date: Option<String>,
    pub cert_number: Option<String>,
    pub org_id: Option<String>,
    pub template_code: Option<String>,
}

/// A row that passed validation, all fields present and trimmed.
#[derive(Debug, Clone)]
pub struct ValidRow {
    /// Source row number, kept so commit failures stay attributable.
    pub row: u32,
    pub name: String,
    pub phone: String,
    pub award_title: String,
    pub award_rank: String,
    pub date: String,
    pub cert_number: String,
    pub org_id: String,
    pub template_code: String,
}

/// The full validation verdict for an uploaded file.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<ValidationError>,
    #[serde(skip)]
    pub valid_rows: Vec<ValidRow>,
}

/// Validate every row, collecting all errors.
///
/// A row missing any field gets one generic error and no per-field checks.
/// Complete rows are checked field by field; a row is valid only when no
/// error points at it.
pub fn validate_rows(rows: &[RawRow], registry: &TemplateRegistry) -> ValidationSummary {
    let mut errors = Vec::new();
    let mut valid_rows = Vec::new();

    if rows.is_empty() {
        errors.push(ValidationError::row(RowRef::Header, "文件中没有数据行"));
    }

    for raw in rows {
        let at = RowRef::Data(raw.row);
        let before = errors.len();

        let Some(complete) = complete_row(raw) else {
            errors.push(ValidationError::row(at, "行数据不完整，存在缺失字段"));
            continue;
        };

        check_required(&mut errors, at, "name", &complete.name);
        check_required(&mut errors, at, "phone", &complete.phone);
        check_required(&mut errors, at, "awardTitle", &complete.award_title);
        check_required(&mut errors, at, "awardRank", &complete.award_rank);
        check_required(&mut errors, at, "date", &complete.date);
        check_required(&mut errors, at, "certNumber", &complete.cert_number);
        check_required(&mut errors, at, "orgId", &complete.org_id);
        check_required(&mut errors, at, "templateCode", &complete.template_code);

        if !complete.phone.is_empty()
            && (complete.phone.len() != 11 || !complete.phone.chars().all(|c| c.is_ascii_digit()))
        {
            errors.push(ValidationError::column(at, "phone", "手机号必须为11位数字"));
        }
        check_length(&mut errors, at, "name", &complete.name, MAX_NAME_CHARS);
        check_length(
            &mut errors,
            at,
            "awardTitle",
            &complete.award_title,
            MAX_AWARD_TITLE_CHARS,
        );
        check_length(
            &mut errors,
            at,
            "awardRank",
            &complete.award_rank,
            MAX_AWARD_RANK_CHARS,
        );
        check_length(
            &mut errors,
            at,
            "certNumber",
            &complete.cert_number,
            MAX_CERT_NUMBER_CHARS,
        );
        if !complete.date.is_empty()
            && NaiveDate::parse_from_str(&complete.date, "%Y-%m-%d").is_err()
        {
            errors.push(ValidationError::column(at, "date", "日期格式应为YYYY-MM-DD"));
        }
        if !complete.template_code.is_empty()
            && registry.template(&complete.template_code).is_none()
        {
            errors.push(ValidationError::column(
                at,
                "templateCode",
                format!("模板编码不存在: {}", complete.template_code),
            ));
        }

        if errors.len() == before {
            valid_rows.push(complete);
        }
    }

    ValidationSummary {
        total: rows.len(),
        valid: valid_rows.len(),
        invalid: rows.len() - valid_rows.len(),
        errors,
        valid_rows,
    }
}

fn complete_row(raw: &RawRow) -> Option<ValidRow> {
    Some(ValidRow {
        row: raw.row,
        name: raw.name.clone()?.trim().to_string(),
        phone: raw.phone.clone()?.trim().to_string(),
        award_title: raw.award_title.clone()?.trim().to_string(),
        award_rank: raw.award_rank.clone()?.trim().to_string(),
        date: raw.date.clone()?.trim().to_string(),
        cert_number: raw.cert_number.clone()?.trim().to_string(),
        org_id: raw.org_id.clone()?.trim().to_string(),
        template_code: raw.template_code.clone()?.trim().to_string(),
    })
}

fn check_required(errors: &mut Vec<ValidationError>, at: RowRef, column: &str, value: &str) {
    if value.is_empty() {
        errors.push(ValidationError::column(at, column, "必填项不能为空"));
    }
}

fn check_length(
    errors: &mut Vec<ValidationError>,
    at: RowRef,
    column: &str,
    value: &str,
    max_chars: usize,
) {
    if value.chars().count() > max_chars {
        errors.push(ValidationError::column(
            at,
            column,
            format!("长度超出上限（{}字符）", max_chars),
        ));
    }
}

/// Where an import session currently stands.
#[derive(Debug, Clone)]
pub enum ImportStage {
    /// Waiting for a file.
    Upload,
    /// A file is being parsed/validated.
    Processing,
    /// Validation finished; awaiting confirm or close.
    Summary(ValidationSummary),
    Success { imported: usize },
    /// Commit failed; carries the errors that stopped it.
    Failed(Vec<ValidationError>),
}

/// One import dialog's lifecycle.
///
/// `begin` hands out a generation token; a `deliver` carrying a token from
/// a closed session is stale and ignored, so a slow validation can never
/// resurrect a dismissed dialog.
#[derive(Debug)]
pub struct ImportSession {
    stage: ImportStage,
    generation: u64,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            stage: ImportStage::Upload,
            generation: 0,
        }
    }

    pub fn stage(&self) -> &ImportStage {
        &self.stage
    }

    /// Start a new import. Returns the generation token to pass back with
    /// the validation result.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.stage = ImportStage::Processing;
        self.generation
    }

    /// Deliver a validation result. Returns false when the token is stale
    /// (the session moved on); the result is then dropped.
    pub fn deliver(&mut self, generation: u64, summary: ValidationSummary) -> bool {
        if generation != self.generation {
            return false;
        }
        self.stage = ImportStage::Summary(summary);
        true
    }

    /// Commit the valid rows of the delivered summary.
    ///
    /// All-or-nothing: a certificate number already present in the store
    /// (or duplicated within the file) fails the whole commit and nothing
    /// is appended; every collision is reported with its source row. On
    /// success every valid row becomes a fresh `Pending`, enabled
    /// recipient.
    pub fn confirm(&mut self, store: &mut RecipientStore) -> Result<usize, CertError> {
        let summary = match &self.stage {
            ImportStage::Summary(summary) => summary.clone(),
            _ => {
                return Err(CertError::Import(
                    "no validated import to confirm".into(),
                ));
            }
        };

        let mut seen = std::collections::HashSet::new();
        let mut collisions = Vec::new();
        for row in &summary.valid_rows {
            if store.has_cert_number(&row.cert_number) || !seen.insert(row.cert_number.as_str()) {
                collisions.push(ValidationError::column(
                    RowRef::Data(row.row),
                    "certNumber",
                    format!("证书编号已存在: {}", row.cert_number),
                ));
            }
        }
        if !collisions.is_empty() {
            let count = collisions.len();
            self.stage = ImportStage::Failed(collisions);
            return Err(CertError::Import(format!(
                "证书编号冲突（{}处），导入已取消",
                count
            )));
        }

        let recipients: Vec<Recipient> = summary
            .valid_rows
            .iter()
            .map(|row| Recipient {
                id: Uuid::new_v4().to_string(),
                name: row.name.clone(),
                phone: row.phone.clone(),
                award_title: row.award_title.clone(),
                award_rank: row.award_rank.clone(),
                date: row.date.clone(),
                cert_number: row.cert_number.clone(),
                org_id: row.org_id.clone(),
                template_code: row.template_code.clone(),
                overrides: Default::default(),
                status: Default::default(),
                enabled: true,
            })
            .collect();

        let imported = recipients.len();
        store.extend(recipients);
        self.stage = ImportStage::Success { imported };
        Ok(imported)
    }

    /// Close the dialog. Any in-flight validation becomes stale.
    pub fn close(&mut self) {
        self.generation += 1;
        self.stage = ImportStage::Upload;
    }
}
