//! Demo dataset: one template with its full placeholder schema, three
//! organizations, and a pair of recipients exercising the override and
//! status paths.

use std::collections::HashMap;

use crate::error::CertError;
use crate::model::{
    Align, CertificateStatus, Organization, Orientation, Placeholder, PlaceholderOverride,
    Recipient, Template, TemplateFormat,
};
use crate::registry::TemplateRegistry;
use crate::store::RecipientStore;

pub const TEMPLATE_CODE: &str = "HONOR_CERT_BLUE_FRAME";

/// A registry seeded with the demo template, its schema, and the
/// organization directory.
pub fn registry() -> Result<TemplateRegistry, CertError> {
    let mut reg = TemplateRegistry::new();

    for (id, name) in [
        ("1", "中舞艺协艺术中心"),
        ("2", "红舞鞋少儿芭蕾"),
        ("3", "盛世华章中国舞院"),
    ] {
        reg.add_organization(Organization {
            id: id.into(),
            name: name.into(),
        });
    }

    reg.register(Template {
        id: "t1".into(),
        code: TEMPLATE_CODE.into(),
        name: "荣誉证书（蓝框）".into(),
        description: "蓝色边框横版荣誉证书".into(),
        orientation: Orientation::LandscapeA4,
        format: TemplateFormat::Png,
        background_image:
            "https://images.unsplash.com/photo-1557683316-973673baf926?w=1240&q=80".into(),
    })?;

    reg.set_schema(
        TEMPLATE_CODE,
        vec![
            placeholder("p1", "recipient_name", "获奖人姓名", 400.0, 350.0, 300.0, 60.0, 48.0, "#333333", Align::Center),
            placeholder("p2", "award_subject", "获奖项目", 400.0, 450.0, 500.0, 40.0, 36.0, "#333333", Align::Center),
            placeholder("p6", "award_rank", "奖项等级", 400.0, 500.0, 300.0, 30.0, 30.0, "#d32f2f", Align::Center),
            placeholder("p3", "cert_date", "颁发日期", 600.0, 650.0, 200.0, 40.0, 24.0, "#666666", Align::Right),
            placeholder("p4", "cert_number", "证书编号", 100.0, 650.0, 250.0, 30.0, 18.0, "#999999", Align::Left),
            placeholder("p5", "organization_name", "颁发机构", 600.0, 600.0, 250.0, 40.0, 28.0, "#333333", Align::Right),
        ],
    )?;

    Ok(reg)
}

/// A store seeded with the two demo recipients.
pub fn store() -> RecipientStore {
    let mut overrides = HashMap::new();
    overrides.insert(
        "recipient_name".to_string(),
        PlaceholderOverride {
            y: Some(360.0),
            font_size: Some(52.0),
            ..Default::default()
        },
    );
    overrides.insert(
        "award_subject".to_string(),
        PlaceholderOverride {
            color: Some("#00695c".into()),
            ..Default::default()
        },
    );

    RecipientStore::seeded(vec![
        Recipient {
            id: "1".into(),
            name: "陈小舞".into(),
            phone: "13800000001".into(),
            award_title: "中国民族民间舞".into(),
            award_rank: "金奖".into(),
            date: "2024-05-20".into(),
            cert_number: "DANCE-2024-0001".into(),
            org_id: "1".into(),
            template_code: TEMPLATE_CODE.into(),
            overrides,
            status: CertificateStatus::Generated,
            enabled: true,
        },
        Recipient {
            id: "2".into(),
            name: "林梦圆".into(),
            phone: "13800000002".into(),
            award_title: "少儿芭蕾基础组".into(),
            award_rank: "银奖".into(),
            date: "2024-05-20".into(),
            cert_number: "DANCE-2024-0002".into(),
            org_id: "2".into(),
            template_code: TEMPLATE_CODE.into(),
            overrides: HashMap::new(),
            status: CertificateStatus::Pending,
            enabled: true,
        },
    ])
}

#[allow(clippy::too_many_arguments)]
fn placeholder(
    id: &str,
    key: &str,
    label: &str,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    font_size: f32,
    color: &str,
    align: Align,
) -> Placeholder {
    Placeholder {
        id: id.into(),
        key: key.into(),
        label: label.into(),
        x,
        y,
        width,
        height,
        font_size,
        color: color.into(),
        align,
    }
}
