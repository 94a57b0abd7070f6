//! Site-wide presentation settings, one singleton document.

use serde::{Deserialize, Serialize};

use crate::blob_store::{keys, BlobStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub title: String,
    pub subtitle: String,
    pub title_align: Alignment,
    pub subtitle_align: Alignment,
    pub copyright: String,
    pub about_text: String,
    pub banner_image: String,
    #[serde(rename = "wechatQRCode")]
    pub wechat_qr_code: String,
    #[serde(rename = "coffeeQRCode")]
    pub coffee_qr_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub title_align: Option<Alignment>,
    pub subtitle_align: Option<Alignment>,
    pub copyright: Option<String>,
    pub about_text: Option<String>,
    pub banner_image: Option<String>,
    #[serde(rename = "wechatQRCode")]
    pub wechat_qr_code: Option<String>,
    #[serde(rename = "coffeeQRCode")]
    pub coffee_qr_code: Option<String>,
}

#[derive(Clone)]
pub struct SettingsStore {
    blob: BlobStore,
}

impl SettingsStore {
    pub fn new(blob: BlobStore) -> Self {
        Self { blob }
    }

    pub async fn get(&self) -> SiteSettings {
        self.blob
            .get_or_init(keys::SETTINGS, default_settings())
            .await
            .value
    }

    /// Shallow-merge the patch over the stored settings and persist.
    pub async fn merge(&self, patch: SettingsPatch) -> SiteSettings {
        let mut settings = self.get().await;
        if let Some(title) = patch.title {
            settings.title = title;
        }
        if let Some(subtitle) = patch.subtitle {
            settings.subtitle = subtitle;
        }
        if let Some(title_align) = patch.title_align {
            settings.title_align = title_align;
        }
        if let Some(subtitle_align) = patch.subtitle_align {
            settings.subtitle_align = subtitle_align;
        }
        if let Some(copyright) = patch.copyright {
            settings.copyright = copyright;
        }
        if let Some(about_text) = patch.about_text {
            settings.about_text = about_text;
        }
        if let Some(banner_image) = patch.banner_image {
            settings.banner_image = banner_image;
        }
        if let Some(wechat_qr_code) = patch.wechat_qr_code {
            settings.wechat_qr_code = wechat_qr_code;
        }
        if let Some(coffee_qr_code) = patch.coffee_qr_code {
            settings.coffee_qr_code = coffee_qr_code;
        }
        self.blob.write(keys::SETTINGS, &settings).await;
        settings
    }
}

fn default_settings() -> SiteSettings {
    SiteSettings {
        title: "Nova's Corner".to_string(),
        subtitle: "Notes on AI, side projects, and everyday life".to_string(),
        title_align: Alignment::Center,
        subtitle_align: Alignment::Center,
        copyright: "© 2024 Nova. All rights reserved.".to_string(),
        about_text: "A quiet corner of the internet for machine learning notes and life logs."
            .to_string(),
        banner_image: "/images/banner.jpg".to_string(),
        wechat_qr_code: "/images/wechat-qr.png".to_string(),
        coffee_qr_code: "/images/coffee-qr.png".to_string(),
    }
}
