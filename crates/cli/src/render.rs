//! Finds the image a reply refers to.

use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use stratus_config::PresentationConfig;

static IMAGE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w./-]+\.(png|jpg|jpeg)").expect("image pattern compiles"));

/// The first image path mentioned in `reply` that exists, else the fallback
/// file if that exists.
pub fn find_image(reply: &str, presentation: &PresentationConfig) -> Option<PathBuf> {
    find_image_in(reply, presentation, Path::new("."))
}

fn find_image_in(reply: &str, presentation: &PresentationConfig, base: &Path) -> Option<PathBuf> {
    IMAGE_PATH
        .find_iter(reply)
        .map(|m| base.join(m.as_str()))
        .find(|p| p.is_file())
        .or_else(|| {
            let fallback = base.join(&presentation.fallback_image);
            fallback.is_file().then_some(fallback)
        })
}
