use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

fn main() -> Result<()> {
    let out_path = Path::new(&env::var("OUT_DIR")?).join("catalog.json");

    // The catalog file must exist even when empty so include_str! works.
    let Some(messages_dir) = find_messages_dir()? else {
        println!("cargo:warning=No messages/ folder found; bundling an empty catalog");
        fs::write(&out_path, "{}")?;
        return Ok(());
    };

    let catalog = bundle_catalog(&messages_dir)?;
    fs::write(&out_path, serde_json::to_string_pretty(&catalog)?)?;

    println!("cargo:rerun-if-changed=messages");
    Ok(())
}

/// Merge every `<lang>/<name>.json` under `messages_dir` into a single
/// `{ lang: { name: <tree> } }` document.
fn bundle_catalog(messages_dir: &Path) -> Result<Value> {
    let mut langs = Map::new();

    for lang_entry in fs::read_dir(messages_dir)? {
        let lang_dir = lang_entry?;
        if !lang_dir.file_type()?.is_dir() {
            continue;
        }
        let lang = lang_dir.file_name().to_string_lossy().to_string();
        let mut files = Map::new();

        for file_entry in fs::read_dir(lang_dir.path())? {
            let path = file_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let tree: Value = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            files.insert(stem.to_string(), tree);
        }

        langs.insert(lang, Value::Object(files));
    }

    Ok(Value::Object(langs))
}

/// Locate the consuming project's `messages/` folder: walk up from OUT_DIR
/// first (covers workspace layouts), then from the current directory.
fn find_messages_dir() -> Result<Option<PathBuf>> {
    if let Ok(out_dir) = env::var("OUT_DIR") {
        let mut current = PathBuf::from(out_dir);
        while current.pop() {
            let candidate = current.join("messages");
            if candidate.is_dir() {
                return Ok(Some(candidate));
            }
        }
    }

    let mut current = env::current_dir()?;
    loop {
        let candidate = current.join("messages");
        if candidate.is_dir() {
            return Ok(Some(candidate));
        }
        if !current.pop() {
            break;
        }
    }

    Ok(None)
}
