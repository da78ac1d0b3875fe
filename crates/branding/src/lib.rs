//! Tenant branding: the recognised config keys, their built-in defaults,
//! override resolution, and the provider contract that sources overrides at
//! runtime.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

/// The five recolorable keys; `set_color` rejects everything else.
pub const COLOR_KEYS: [ConfigKey; 5] = [
    ConfigKey::BackgroundColor,
    ConfigKey::SurfaceColor,
    ConfigKey::TextColor,
    ConfigKey::PrimaryColor,
    ConfigKey::SecondaryColor,
];

/// The five text keys editable from the admin panel.
pub const TEXT_KEYS: [ConfigKey; 5] = [
    ConfigKey::PlatformName,
    ConfigKey::Tagline,
    ConfigKey::ContactEmail,
    ConfigKey::ContactPhone,
    ConfigKey::WhatsappNumber,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    PlatformName,
    Tagline,
    ContactEmail,
    ContactPhone,
    WhatsappNumber,
    BackgroundColor,
    SurfaceColor,
    TextColor,
    PrimaryColor,
    SecondaryColor,
}

impl ConfigKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::PlatformName => "platform_name",
            ConfigKey::Tagline => "tagline",
            ConfigKey::ContactEmail => "contact_email",
            ConfigKey::ContactPhone => "contact_phone",
            ConfigKey::WhatsappNumber => "whatsapp_number",
            ConfigKey::BackgroundColor => "background_color",
            ConfigKey::SurfaceColor => "surface_color",
            ConfigKey::TextColor => "text_color",
            ConfigKey::PrimaryColor => "primary_color",
            ConfigKey::SecondaryColor => "secondary_color",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum BrandingError {
    #[error("branding provider error: {message}")]
    Provider { message: String },
    #[error("config key '{key}' is not recolorable")]
    NotRecolorable { key: ConfigKey },
}

/// Fully resolved branding values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandingConfig {
    pub platform_name: String,
    pub tagline: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub whatsapp_number: String,
    pub background_color: String,
    pub surface_color: String,
    pub text_color: String,
    pub primary_color: String,
    pub secondary_color: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            platform_name: "KRUZ".into(),
            tagline: "Smart Port Logistics Platform".into(),
            contact_email: "info@kruz.com".into(),
            contact_phone: "+1 (555) 123-4567".into(),
            whatsapp_number: "+15551234567".into(),
            background_color: "#020617".into(),
            surface_color: "#0f172a".into(),
            text_color: "#f1f5f9".into(),
            primary_color: "#84cc16".into(),
            secondary_color: "#3b82f6".into(),
        }
    }
}

impl BrandingConfig {
    pub fn value(&self, key: ConfigKey) -> &str {
        match key {
            ConfigKey::PlatformName => &self.platform_name,
            ConfigKey::Tagline => &self.tagline,
            ConfigKey::ContactEmail => &self.contact_email,
            ConfigKey::ContactPhone => &self.contact_phone,
            ConfigKey::WhatsappNumber => &self.whatsapp_number,
            ConfigKey::BackgroundColor => &self.background_color,
            ConfigKey::SurfaceColor => &self.surface_color,
            ConfigKey::TextColor => &self.text_color,
            ConfigKey::PrimaryColor => &self.primary_color,
            ConfigKey::SecondaryColor => &self.secondary_color,
        }
    }

    pub fn whatsapp_link(&self) -> String {
        whatsapp_link(&self.whatsapp_number)
    }
}

/// Per-tenant overrides; unknown keys in a source file are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
}

impl BrandingOverrides {
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::PlatformName => self.platform_name.as_deref(),
            ConfigKey::Tagline => self.tagline.as_deref(),
            ConfigKey::ContactEmail => self.contact_email.as_deref(),
            ConfigKey::ContactPhone => self.contact_phone.as_deref(),
            ConfigKey::WhatsappNumber => self.whatsapp_number.as_deref(),
            ConfigKey::BackgroundColor => self.background_color.as_deref(),
            ConfigKey::SurfaceColor => self.surface_color.as_deref(),
            ConfigKey::TextColor => self.text_color.as_deref(),
            ConfigKey::PrimaryColor => self.primary_color.as_deref(),
            ConfigKey::SecondaryColor => self.secondary_color.as_deref(),
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = Some(value.into());
        match key {
            ConfigKey::PlatformName => self.platform_name = value,
            ConfigKey::Tagline => self.tagline = value,
            ConfigKey::ContactEmail => self.contact_email = value,
            ConfigKey::ContactPhone => self.contact_phone = value,
            ConfigKey::WhatsappNumber => self.whatsapp_number = value,
            ConfigKey::BackgroundColor => self.background_color = value,
            ConfigKey::SurfaceColor => self.surface_color = value,
            ConfigKey::TextColor => self.text_color = value,
            ConfigKey::PrimaryColor => self.primary_color = value,
            ConfigKey::SecondaryColor => self.secondary_color = value,
        }
    }

    /// Layers these overrides over the built-in defaults.
    pub fn resolve(&self) -> BrandingConfig {
        let defaults = BrandingConfig::default();
        BrandingConfig {
            platform_name: self.platform_name.clone().unwrap_or(defaults.platform_name),
            tagline: self.tagline.clone().unwrap_or(defaults.tagline),
            contact_email: self.contact_email.clone().unwrap_or(defaults.contact_email),
            contact_phone: self.contact_phone.clone().unwrap_or(defaults.contact_phone),
            whatsapp_number: self
                .whatsapp_number
                .clone()
                .unwrap_or(defaults.whatsapp_number),
            background_color: self
                .background_color
                .clone()
                .unwrap_or(defaults.background_color),
            surface_color: self.surface_color.clone().unwrap_or(defaults.surface_color),
            text_color: self.text_color.clone().unwrap_or(defaults.text_color),
            primary_color: self.primary_color.clone().unwrap_or(defaults.primary_color),
            secondary_color: self
                .secondary_color
                .clone()
                .unwrap_or(defaults.secondary_color),
        }
    }
}

/// Chat link for a display-formatted number: keep digits and any leading
/// `+`, then drop the first `+` for the wa.me path.
pub fn whatsapp_link(number: &str) -> String {
    let digits: String = number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("https://wa.me/{}", digits.replacen('+', "", 1))
}

/// Source of tenant overrides. `watch` pushes a fresh overrides value
/// whenever branding changes.
#[async_trait]
pub trait BrandingProvider: Send + Sync {
    async fn load(&self) -> Result<BrandingOverrides, BrandingError>;
    fn watch(&self) -> watch::Receiver<BrandingOverrides>;
    async fn set_color(&self, key: ConfigKey, value: &str) -> Result<(), BrandingError>;
}

/// In-process provider backed by a watch channel; serves fixed overrides
/// plus any color edits made through it.
pub struct StaticBranding {
    overrides: watch::Sender<BrandingOverrides>,
}

impl StaticBranding {
    pub fn new(overrides: BrandingOverrides) -> Self {
        let (tx, _) = watch::channel(overrides);
        Self { overrides: tx }
    }
}

impl Default for StaticBranding {
    fn default() -> Self {
        Self::new(BrandingOverrides::default())
    }
}

#[async_trait]
impl BrandingProvider for StaticBranding {
    async fn load(&self) -> Result<BrandingOverrides, BrandingError> {
        Ok(self.overrides.borrow().clone())
    }

    fn watch(&self) -> watch::Receiver<BrandingOverrides> {
        self.overrides.subscribe()
    }

    async fn set_color(&self, key: ConfigKey, value: &str) -> Result<(), BrandingError> {
        if !COLOR_KEYS.contains(&key) {
            return Err(BrandingError::NotRecolorable { key });
        }
        self.overrides
            .send_modify(|overrides| overrides.set(key, value));
        Ok(())
    }
}
