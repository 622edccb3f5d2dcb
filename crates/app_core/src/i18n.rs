//! Internationalization support using Fluent
//!
//! Translations are compiled into the binary; `ja` is both the default and
//! the fallback for missing messages.

pub use fluent::FluentArgs;
use fluent::{FluentBundle, FluentResource};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

const EMBEDDED: &[(&str, &str)] = &[
    ("ja", include_str!("../locales/ja/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager
pub struct I18n {
    bundles: RwLock<HashMap<String, Arc<FluentBundle<FluentResource>>>>,
    current_locale: RwLock<String>,
    fallback_locale: String,
}

impl I18n {
    /// Create a new I18n manager with default locale
    pub fn new(default_locale: &str) -> Self {
        Self {
            bundles: RwLock::new(HashMap::new()),
            current_locale: RwLock::new(default_locale.to_string()),
            fallback_locale: "ja".to_string(),
        }
    }

    /// Manager with the built-in translations, set to `locale` if available
    pub fn with_embedded(locale: &str) -> anyhow::Result<Self> {
        let i18n = Self::new(crate::preferences::DEFAULT_LANGUAGE);
        i18n.load_embedded()?;
        if !i18n.set_locale(locale) {
            tracing::warn!("Unknown locale {}, staying on {}", locale, i18n.current_locale());
        }
        Ok(i18n)
    }

    /// Load the translations compiled into the binary
    pub fn load_embedded(&self) -> anyhow::Result<()> {
        for (locale, source) in EMBEDDED {
            self.load_source(locale, source)?;
        }
        Ok(())
    }

    /// Parse one `.ftl` source into the bundle for `locale`
    pub fn load_source(&self, locale: &str, source: &str) -> anyhow::Result<()> {
        let lang_id: LanguageIdentifier = locale
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid locale {}: {}", locale, e))?;

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Fluent parse errors in {}: {:?}", locale, errors))?;

        let mut bundle = FluentBundle::new(vec![lang_id]);
        // egui would draw the bidi isolation marks as boxes
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Fluent bundle errors: {:?}", errors))?;

        self.bundles.write().insert(locale.to_string(), Arc::new(bundle));
        tracing::info!("Loaded locale: {}", locale);

        Ok(())
    }

    /// Set the current locale
    pub fn set_locale(&self, locale: &str) -> bool {
        if self.bundles.read().contains_key(locale) {
            *self.current_locale.write() = locale.to_string();
            true
        } else {
            false
        }
    }

    /// Get the current locale
    pub fn current_locale(&self) -> String {
        self.current_locale.read().clone()
    }

    /// Get a localized string
    pub fn get(&self, key: &str) -> String {
        self.get_with_args(key, None)
    }

    /// Get a localized string with arguments
    pub fn get_with_args(&self, key: &str, args: Option<&FluentArgs>) -> String {
        let bundles = self.bundles.read();
        let current = self.current_locale.read().clone();

        let format = |locale: &str| -> Option<String> {
            let bundle = bundles.get(locale)?;
            let pattern = bundle.get_message(key)?.value()?;
            let mut errors = Vec::new();
            let result = bundle.format_pattern(pattern, args, &mut errors);
            errors.is_empty().then(|| result.into_owned())
        };

        format(&current)
            .or_else(|| {
                if current != self.fallback_locale {
                    format(&self.fallback_locale)
                } else {
                    None
                }
            })
            // Return key as fallback
            .unwrap_or_else(|| key.to_string())
    }

    /// Get available locales
    pub fn available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.bundles.read().keys().cloned().collect();
        locales.sort();
        locales
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("ja")
    }
}

/// Convenience macro for getting localized strings
#[macro_export]
macro_rules! t {
    ($i18n:expr, $key:expr) => {
        $i18n.get($key)
    };
    ($i18n:expr, $key:expr, $($arg_name:ident = $arg_value:expr),+ $(,)?) => {{
        let mut args = $crate::i18n::FluentArgs::new();
        $(
            args.set(stringify!($arg_name), $arg_value);
        )+
        $i18n.get_with_args($key, Some(&args))
    }};
}
