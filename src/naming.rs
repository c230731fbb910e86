//! Output file naming.
//!
//! Every artifact is named `{base}_{suffix}.{ext}`. The base comes from the
//! user's custom name when one is given, otherwise from the uploaded file's
//! name; either way the final extension is dropped:
//! - `"photo.HEIC"`, no custom name → `photo`
//! - custom `"myphoto.png"` → `myphoto`
//! - custom `"  "` → falls back to the original name
//! - `"archive.tar.gz"` → `archive.tar`
//! - `"../shots/evil.png"` → `evil`
//!
//! Only the last path component of a name is used, so a base name never
//! points outside the output directory or nests inside the archive.

/// Remove the final `.ext` from a name.
///
/// The extension is the non-empty run after the last dot, provided it holds no
/// `/`. A trailing dot, or a dot that only appears before a path separator, is
/// left alone.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => {
            let ext = &name[dot + 1..];
            if ext.is_empty() || ext.contains('/') {
                name
            } else {
                &name[..dot]
            }
        }
        None => name,
    }
}

/// The part of `name` after the last forward or back slash.
fn last_component(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Derive the base name shared by all artifacts of one export.
///
/// Directory parts are dropped, and a name of only `.` or `..` counts as
/// blank.
pub fn base_name(custom_name: Option<&str>, original_file_name: &str) -> String {
    let usable = |name: &str| {
        let name = last_component(name.trim()).trim();
        (!matches!(name, "" | "." | "..")).then(|| name.to_string())
    };
    let chosen = custom_name
        .and_then(usable)
        .or_else(|| usable(original_file_name))
        .unwrap_or_default();
    strip_extension(&chosen).to_string()
}

/// `{base}_{suffix}.{ext}`
pub fn artifact_file_name(base: &str, suffix: &str, extension: &str) -> String {
    format!("{base}_{suffix}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_name_loses_extension() {
        assert_eq!(base_name(None, "photo.HEIC"), "photo");
    }

    #[test]
    fn custom_name_loses_extension() {
        assert_eq!(base_name(Some("myphoto.png"), "photo.HEIC"), "myphoto");
    }

    #[test]
    fn blank_custom_name_falls_back() {
        assert_eq!(base_name(Some("   "), "holiday.jpg"), "holiday");
        assert_eq!(base_name(Some(""), "holiday.jpg"), "holiday");
    }

    #[test]
    fn custom_name_is_trimmed() {
        assert_eq!(base_name(Some("  banner  "), "x.jpg"), "banner");
    }

    #[test]
    fn directories_are_dropped_from_custom_name() {
        assert_eq!(base_name(Some("/tmp/shots/evil"), "x.jpg"), "evil");
        assert_eq!(base_name(Some("../evil.png"), "x.jpg"), "evil");
        assert_eq!(base_name(Some("..\\..\\evil"), "x.jpg"), "evil");
        assert_eq!(base_name(Some("C:\\out\\banner.jpg"), "x.jpg"), "banner");
    }

    #[test]
    fn pure_directory_names_fall_back() {
        assert_eq!(base_name(Some(".."), "holiday.jpg"), "holiday");
        assert_eq!(base_name(Some("shots/"), "holiday.jpg"), "holiday");
        assert_eq!(base_name(Some("../"), "holiday.jpg"), "holiday");
    }

    #[test]
    fn original_name_is_reduced_too() {
        assert_eq!(base_name(None, "uploads/photo.HEIC"), "photo");
    }

    #[test]
    fn only_last_extension_is_removed() {
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn names_without_extension_are_unchanged() {
        assert_eq!(strip_extension("README"), "README");
        assert_eq!(strip_extension("trailing."), "trailing.");
        assert_eq!(strip_extension("v1.2/photo"), "v1.2/photo");
    }

    #[test]
    fn dotfile_strips_to_empty() {
        assert_eq!(strip_extension(".hidden"), "");
    }

    #[test]
    fn artifact_name_pattern() {
        assert_eq!(artifact_file_name("photo", "1x1_circle", "png"), "photo_1x1_circle.png");
    }
}
