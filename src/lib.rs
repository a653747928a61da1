#![doc = include_str!("../README.md")]

//! # bevy-lingo
//!
//! A localization plugin for [Bevy](https://bevyengine.org/) built around
//! dotted key paths:
//!
//! - **Key-path lookup**: `t("status.pending")` walks a nested catalog tree
//! - **Soft fallback**: an unresolved key returns the key itself, so UI text
//!   is always renderable
//! - **Placeholders**: `{name}` tokens replaced from caller-supplied values
//! - **Runtime language switching**: validated against the loaded catalog
//! - **WASM compatible**: catalogs bundled at build time for web deployment
//! - **Zero setup**: ships a built-in Japanese catalog; projects add a
//!   `messages/` folder to extend or replace it
//!
//! ## Quick Start
//!
//! ```rust
//! use bevy::prelude::*;
//! use bevy_lingo::{I18n, I18nPlugin};
//!
//! fn show_status(i18n: Res<I18n>) {
//!     let label = i18n.t("status.pending");
//!     // spawn some UI text with `label`...
//! }
//!
//! App::new()
//!     .add_plugins(I18nPlugin::default())
//!     .add_systems(Update, show_status);
//! ```

use std::collections::HashMap;

use bevy::prelude::*;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

/// Configuration for the I18n plugin.
///
/// Controls how catalogs are loaded and which language starts active.
///
/// # Example
///
/// ```rust
/// use bevy_lingo::I18nConfig;
///
/// let config = I18nConfig {
///     messages_folder: "locales".to_string(),
///     default_lang: "ja".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Resource)]
pub struct I18nConfig {
    /// Whether to use bundled catalogs (true) or filesystem loading (false).
    /// Automatically set to `true` for WASM targets or when the `bundle-only`
    /// feature is enabled.
    pub use_bundled_translations: bool,
    /// Path to the folder containing per-language catalog files.
    /// Default: "messages"
    pub messages_folder: String,
    /// Language active at startup. Must name a language present in the
    /// catalog; unknown values fall back to the built-in language.
    /// Default: "ja"
    pub default_lang: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            use_bundled_translations: cfg!(target_arch = "wasm32") || cfg!(feature = "bundle-only"),
            messages_folder: "messages".to_string(),
            default_lang: BUILTIN_LANG.to_string(),
        }
    }
}

// ---------- Bevy Plugin ----------

/// Main plugin for key-path localization.
///
/// Loads the catalog at startup and provides the [`I18n`] resource for
/// resolving localized strings.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_lingo::{I18nPlugin, I18nConfig};
///
/// // Default configuration
/// App::new().add_plugins(I18nPlugin::default());
///
/// // Custom configuration
/// App::new().add_plugins(I18nPlugin::with_config(I18nConfig {
///     default_lang: "ja".to_string(),
///     ..Default::default()
/// }));
/// ```
#[derive(Default)]
pub struct I18nPlugin {
    /// Configuration for the plugin
    pub config: I18nConfig,
}

impl I18nPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: I18nConfig) -> Self {
        Self { config }
    }
}

impl Plugin for I18nPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone()).init_resource::<I18n>();
    }
}

// ---------- Catalog model ----------

/// One node of a locale table: either leaf text or a nested branch.
///
/// Catalog files are plain JSON objects whose values are strings or further
/// objects:
///
/// ```json
/// {
///   "pending": "待機中",
///   "detail": {
///     "queued": "キュー待ち"
///   }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TableNode {
    /// A translatable text value
    Text(String),
    /// A nested table of key-value pairs
    Branch(HashMap<String, TableNode>),
}

/// One language's full table, keyed by top-level branch name (the catalog
/// file stems, e.g. `status`, `errors`, `ui`).
pub type LocaleTable = HashMap<String, TableNode>;
/// A mapping of language identifiers to their tables.
pub type LangMap = HashMap<String, LocaleTable>;

/// The whole catalog. Built once at startup, immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    /// Map of language identifiers to their catalog trees
    pub langs: LangMap,
}

// ---------- I18n resource ----------

/// Main resource for resolving localized strings in Bevy systems.
///
/// Lookups address the active language's table with dot-separated key paths.
/// A path that does not resolve to text returns the key itself (with a
/// warning), so callers always get a displayable string.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_lingo::I18n;
///
/// fn greet(i18n: Res<I18n>) {
///     let text = i18n.t_with_args("ui.greeting", &[("name", &"Taro")]);
///     println!("{text}");
/// }
/// ```
#[derive(Resource)]
pub struct I18n {
    /// The loaded catalog
    translations: Translations,
    /// Currently active language; always a key of `translations.langs`
    current_lang: String,
    /// Sorted list of available languages
    locale_list: Vec<String>,
}

impl FromWorld for I18n {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<I18nConfig>().cloned().unwrap_or_default();
        Self::from_config(&config)
    }
}

impl I18n {
    /// Builds the resource outside of an `App`, loading catalogs per `config`.
    ///
    /// ```rust
    /// use bevy_lingo::{I18n, I18nConfig};
    ///
    /// let i18n = I18n::from_config(&I18nConfig::default());
    /// assert_eq!(i18n.t("status.pending"), "待機中");
    /// ```
    #[must_use]
    pub fn from_config(config: &I18nConfig) -> Self {
        Self::from_parts(load_catalog(config), &config.default_lang)
    }

    fn from_parts(translations: Translations, default_lang: &str) -> Self {
        let mut locale_list: Vec<String> = translations.langs.keys().cloned().collect();
        locale_list.sort_unstable();

        let current_lang = if translations.langs.contains_key(default_lang) {
            default_lang.to_string()
        } else {
            warn!("Default language '{default_lang}' is not in the catalog, using '{BUILTIN_LANG}'");
            BUILTIN_LANG.to_string()
        };

        Self {
            translations,
            current_lang,
            locale_list,
        }
    }

    /// Resolves a dot-separated key path to localized text.
    ///
    /// Splits `key` on `.` and walks the active language's table one segment
    /// at a time. If the path lands on a text entry, that text is returned.
    /// Anything else (a missing segment, or a path that does not end on a
    /// text entry) logs a warning and returns `key` unchanged, so missing
    /// translations surface as raw keys in the UI instead of failing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bevy_lingo::{I18n, I18nConfig};
    ///
    /// let i18n = I18n::from_config(&I18nConfig::default());
    /// assert_eq!(i18n.t("ui.upload"), "アップロード");
    /// assert_eq!(i18n.t("ui.nonexistent"), "ui.nonexistent");
    /// ```
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        match self.lookup(key) {
            Some(TableNode::Text(text)) => text.clone(),
            Some(TableNode::Branch(_)) => {
                warn!("Translation key '{key}' is a branch, not a text entry");
                key.to_string()
            }
            None => {
                warn!("Translation key not found: {key}");
                key.to_string()
            }
        }
    }

    /// Resolves a key path and substitutes `{name}` placeholders.
    ///
    /// Each `(name, value)` pair replaces every `{name}` token in the
    /// resolved text, with the value coerced via [`ToString`]. Tokens
    /// without a matching pair are left literal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bevy_lingo::{I18n, I18nConfig};
    ///
    /// let i18n = I18n::from_config(&I18nConfig::default());
    /// assert_eq!(
    ///     i18n.t_with_args("ui.greeting", &[("name", &"Taro")]),
    ///     "こんにちは、Taroさん"
    /// );
    /// ```
    #[must_use]
    pub fn t_with_args(&self, key: &str, args: &[(&str, &dyn ToString)]) -> String {
        let template = self.t(key);
        if args.is_empty() {
            return template;
        }
        replace_placeholders(&template, args)
    }

    /// Returns the branch at `key`, for bulk access to a sub-tree.
    ///
    /// `None` if the path does not resolve or names a text entry. Use this
    /// instead of [`I18n::t`] for key paths that address a whole branch,
    /// e.g. to enumerate every status label at once.
    ///
    /// ```rust
    /// use bevy_lingo::{I18n, I18nConfig};
    ///
    /// let i18n = I18n::from_config(&I18nConfig::default());
    /// let status = i18n.subtree("status").unwrap();
    /// assert!(status.contains_key("pending"));
    /// ```
    #[must_use]
    pub fn subtree(&self, key: &str) -> Option<&LocaleTable> {
        match self.lookup(key)? {
            TableNode::Branch(branch) => Some(branch),
            TableNode::Text(_) => None,
        }
    }

    /// Sets the active language.
    ///
    /// Warns and leaves the current language unchanged if `locale` is not
    /// present in the catalog; subsequent lookups keep using the old table.
    pub fn set_lang(&mut self, locale: &str) {
        if !self.translations.langs.contains_key(locale) {
            warn!("Locale '{locale}' not available");
            return;
        }
        self.current_lang = locale.to_string();
    }

    /// Gets the active language identifier.
    #[must_use]
    pub fn get_lang(&self) -> &str {
        &self.current_lang
    }

    /// Gets a sorted list of all languages in the catalog.
    #[must_use]
    pub fn available_languages(&self) -> &[String] {
        &self.locale_list
    }

    fn lookup(&self, key: &str) -> Option<&TableNode> {
        let table = self.translations.langs.get(&self.current_lang)?;
        let mut segments = key.split('.');
        let mut node = table.get(segments.next()?)?;
        for segment in segments {
            match node {
                TableNode::Branch(branch) => node = branch.get(segment)?,
                TableNode::Text(_) => return None,
            }
        }
        Some(node)
    }
}

// ---------- App extension ----------

/// Extension trait for `App` to switch languages without fetching the
/// [`I18n`] resource by hand.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use bevy_lingo::{I18nPlugin, LanguageAppExt};
///
/// let mut app = App::new();
/// app.add_plugins(I18nPlugin::default());
/// app.set_lang_i18n("ja");
/// ```
pub trait LanguageAppExt {
    /// Sets the active language; warns if it is not in the catalog.
    fn set_lang_i18n(&mut self, locale: &str);
}

impl LanguageAppExt for App {
    fn set_lang_i18n(&mut self, locale: &str) {
        if let Some(mut i18n) = self.world_mut().get_resource_mut::<I18n>() {
            i18n.set_lang(locale);
        }
    }
}

// ---------- Loaders ----------

/// Language shipped with the crate; always present in the catalog.
const BUILTIN_LANG: &str = "ja";

/// Built-in catalog files, embedded so lookups work with zero setup.
const BUILTIN_FILES: &[(&str, &str)] = &[
    ("status", include_str!("../messages/ja/status.json")),
    ("errors", include_str!("../messages/ja/errors.json")),
    ("ui", include_str!("../messages/ja/ui.json")),
];

// Seed the built-in language, then overlay project catalogs. A project
// language with the same identifier replaces the built-in table wholesale.
fn load_catalog(config: &I18nConfig) -> Translations {
    let mut translations = builtin_catalog();

    let loaded = if config.use_bundled_translations {
        load_bundled_catalog(&config.messages_folder)
    } else {
        load_filesystem_catalog(&config.messages_folder)
    };
    for (lang, table) in loaded {
        translations.langs.insert(lang, table);
    }

    translations
}

fn builtin_catalog() -> Translations {
    let mut table = LocaleTable::new();
    for (name, raw) in BUILTIN_FILES {
        match serde_json::from_str::<HashMap<String, TableNode>>(raw) {
            Ok(tree) => {
                table.insert((*name).to_string(), TableNode::Branch(tree));
            }
            Err(e) => eprintln!("Built-in catalog file '{name}' is invalid: {e}"),
        }
    }

    let mut langs = LangMap::new();
    langs.insert(BUILTIN_LANG.to_string(), table);
    Translations { langs }
}

// Catalogs bundled by build.rs at compile time.
fn load_bundled_catalog(messages_folder: &str) -> LangMap {
    const BUNDLED_CATALOG: &str = include_str!(concat!(env!("OUT_DIR"), "/catalog.json"));

    match serde_json::from_str::<LangMap>(BUNDLED_CATALOG) {
        // An empty bundle is normal when no messages/ folder was present at
        // build time.
        Ok(langs) if langs.is_empty() => bundled_fallback(messages_folder),
        Ok(langs) => langs,
        Err(e) => {
            eprintln!("Failed to parse bundled catalog: {e}");
            LangMap::new()
        }
    }
}

#[cfg(all(not(target_arch = "wasm32"), not(feature = "bundle-only")))]
fn bundled_fallback(messages_folder: &str) -> LangMap {
    load_filesystem_catalog(messages_folder)
}

#[cfg(any(target_arch = "wasm32", feature = "bundle-only"))]
fn bundled_fallback(_messages_folder: &str) -> LangMap {
    LangMap::new()
}

// Filesystem loading (dev/desktop mode)
#[cfg(not(target_arch = "wasm32"))]
fn load_filesystem_catalog(folder: &str) -> LangMap {
    match read_catalog_dir(folder) {
        Ok(langs) => langs,
        Err(e) => {
            eprintln!("Failed to load catalogs from '{folder}': {e}");
            LangMap::new()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_filesystem_catalog(folder: &str) -> LangMap {
    eprintln!("Filesystem catalogs are not available on WASM; using the bundled catalog");
    load_bundled_catalog(folder)
}

// Reads messages/<lang>/<name>.json; each file's root object becomes the
// <name> branch of that language's table. Bad files are skipped, not fatal.
#[cfg(not(target_arch = "wasm32"))]
fn read_catalog_dir(folder: &str) -> std::io::Result<LangMap> {
    use std::fs;
    use std::path::Path;

    let dir = Path::new(folder);
    if !dir.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{folder} folder not found"),
        ));
    }

    let mut langs = LangMap::new();

    for lang_entry in fs::read_dir(dir)? {
        let lang_dir = lang_entry?;
        if !lang_dir.file_type()?.is_dir() {
            continue;
        }
        let lang = lang_dir.file_name().to_string_lossy().to_string();
        let mut table = LocaleTable::new();

        for file_entry in fs::read_dir(lang_dir.path())? {
            let path = file_entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<HashMap<String, TableNode>>(&content) {
                Ok(tree) => {
                    table.insert(stem.to_string(), TableNode::Branch(tree));
                }
                Err(e) => eprintln!("Skipping catalog file {}: {e}", path.display()),
            }
        }

        langs.insert(lang, table);
    }

    Ok(langs)
}

// ---------- Text helpers ----------

static ARG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Replaces `{name}` tokens from `args`; unmatched tokens stay literal.
fn replace_placeholders(template: &str, args: &[(&str, &dyn ToString)]) -> String {
    ARG_RE
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match args.iter().find(|(arg, _)| *arg == name) {
                Some((_, value)) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

// ---------- Tests ----------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: serde_json::Value) -> LocaleTable {
        serde_json::from_value(value).unwrap()
    }

    fn test_i18n() -> I18n {
        let mut langs = LangMap::new();
        langs.insert(
            "ja".to_string(),
            table(json!({
                "status": {
                    "pending": "待機中",
                    "detail": { "queued": "キュー待ち" }
                },
                "ui": {
                    "greeting": "こんにちは、{name}さん",
                    "items": "{count}件のファイル",
                    "upload": "アップロード"
                }
            })),
        );
        langs.insert(
            "en".to_string(),
            table(json!({
                "status": { "pending": "Pending" },
                "ui": { "greeting": "Hello, {name}!" }
            })),
        );
        I18n::from_parts(Translations { langs }, "ja")
    }

    #[test]
    fn leaf_lookup() {
        assert_eq!(test_i18n().t("status.pending"), "待機中");
    }

    #[test]
    fn nested_leaf_lookup() {
        assert_eq!(test_i18n().t("status.detail.queued"), "キュー待ち");
    }

    #[test]
    fn missing_leaf_returns_key() {
        assert_eq!(test_i18n().t("status.unknown"), "status.unknown");
    }

    #[test]
    fn missing_root_returns_key() {
        assert_eq!(test_i18n().t("nope.pending"), "nope.pending");
    }

    #[test]
    fn descending_through_text_returns_key() {
        assert_eq!(test_i18n().t("status.pending.extra"), "status.pending.extra");
    }

    #[test]
    fn branch_path_returns_key() {
        assert_eq!(test_i18n().t("status"), "status");
    }

    #[test]
    fn empty_key_returns_key() {
        assert_eq!(test_i18n().t(""), "");
    }

    #[test]
    fn subtree_returns_branch() {
        let i18n = test_i18n();
        let status = i18n.subtree("status").unwrap();
        assert!(status.contains_key("pending"));
        assert!(status.contains_key("detail"));
    }

    #[test]
    fn subtree_rejects_leaves_and_missing_paths() {
        let i18n = test_i18n();
        assert!(i18n.subtree("status.pending").is_none());
        assert!(i18n.subtree("nope").is_none());
    }

    #[test]
    fn placeholder_substitution() {
        let text = test_i18n().t_with_args("ui.greeting", &[("name", &"Taro")]);
        assert_eq!(text, "こんにちは、Taroさん");
    }

    #[test]
    fn placeholder_coerces_values() {
        let text = test_i18n().t_with_args("ui.items", &[("count", &5)]);
        assert_eq!(text, "5件のファイル");
    }

    #[test]
    fn unmatched_placeholder_stays_literal() {
        let text = test_i18n().t_with_args("ui.greeting", &[("other", &"x")]);
        assert_eq!(text, "こんにちは、{name}さん");
    }

    #[test]
    fn empty_args_keep_template_verbatim() {
        assert_eq!(test_i18n().t_with_args("ui.greeting", &[]), "こんにちは、{name}さん");
    }

    #[test]
    fn repeated_tokens_all_replaced() {
        let text = replace_placeholders("{x} and {x}", &[("x", &"A")]);
        assert_eq!(text, "A and A");
    }

    #[test]
    fn set_lang_switches_table() {
        let mut i18n = test_i18n();
        i18n.set_lang("en");
        assert_eq!(i18n.get_lang(), "en");
        assert_eq!(i18n.t("status.pending"), "Pending");
        assert_eq!(
            i18n.t_with_args("ui.greeting", &[("name", &"Taro")]),
            "Hello, Taro!"
        );
    }

    #[test]
    fn set_lang_unknown_is_a_noop() {
        let mut i18n = test_i18n();
        i18n.set_lang("fr");
        assert_eq!(i18n.get_lang(), "ja");
        assert_eq!(i18n.t("status.pending"), "待機中");
    }

    #[test]
    fn unknown_default_lang_falls_back_to_builtin() {
        let mut langs = LangMap::new();
        langs.insert("ja".to_string(), table(json!({ "ui": { "save": "保存" } })));
        let i18n = I18n::from_parts(Translations { langs }, "xx");
        assert_eq!(i18n.get_lang(), "ja");
    }

    #[test]
    fn available_languages_sorted() {
        assert_eq!(test_i18n().available_languages(), ["en", "ja"]);
    }

    #[test]
    fn builtin_catalog_resolves() {
        let i18n = I18n::from_parts(builtin_catalog(), BUILTIN_LANG);
        assert_eq!(i18n.t("status.pending"), "待機中");
        assert_eq!(i18n.t("errors.FILE_NOT_FOUND"), "ファイルが見つかりません");
        assert_eq!(i18n.t("ui.upload"), "アップロード");
        assert_eq!(
            i18n.t_with_args("ui.greeting", &[("name", &"Taro")]),
            "こんにちは、Taroさん"
        );
    }
}
