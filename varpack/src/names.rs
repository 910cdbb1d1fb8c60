//! Name sanitization plus file and archive naming.

use chrono::{Datelike, NaiveDate};

use crate::target::{OutputFormat, IMPLICIT_SIZE};

/// Base name used when a node name sanitizes to nothing.
pub const DEFAULT_BASE_NAME: &str = "COMPONENT";

/// Uppercase identifier made only of ASCII letters and digits.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Folder name safe for use inside an archive path.
///
/// Leading and trailing slashes are removed, each whitespace run becomes one
/// `_`, and anything outside `[A-Za-z0-9_.-]` becomes `_`.
pub fn sanitize_folder_name(name: &str) -> String {
    let trimmed = name.trim().trim_matches('/');
    let mut out = String::with_capacity(trimmed.len());
    let mut in_whitespace = false;

    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            out.push(c);
        } else {
            out.push('_');
        }
    }

    out
}

/// Drop a trailing `/qualifier` from a variant-style name.
pub fn strip_variant_suffix(name: &str) -> &str {
    name.split('/').next().unwrap_or_default()
}

/// Archive path for one rendering.
///
/// `size` is omitted when it is the implicit 24 and `include_size_24` is off.
pub fn file_path(
    base_name: &str,
    size: &str,
    path_segments: &[String],
    include_size_24: bool,
    format: OutputFormat,
) -> String {
    let include_size = !size.is_empty() && (size != IMPLICIT_SIZE || include_size_24);
    let file_name = if include_size {
        format!(
            "{}{}_{}.{}",
            base_name,
            size,
            format.token(),
            format.extension()
        )
    } else {
        format!("{}_{}.{}", base_name, format.token(), format.extension())
    };

    let folders = path_segments
        .iter()
        .map(|segment| sanitize_folder_name(segment))
        .collect::<Vec<_>>();

    if folders.is_empty() {
        file_name
    } else {
        format!("{}/{}", folders.join("/"), file_name)
    }
}

/// `<YYYY>_<MM>_<DD>_<tag>_<format>.zip`
pub fn archive_name(date: NaiveDate, product_tag: &str, format: OutputFormat) -> String {
    format!(
        "{:04}_{:02}_{:02}_{}_{}.zip",
        date.year(),
        date.month(),
        date.day(),
        product_tag,
        format.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  arrow left "), "ARROWLEFT");
        assert_eq!(sanitize_name("Icon / Close-2"), "ICONCLOSE2");
        assert_eq!(sanitize_name("Ünïcode ✓"), "NCODE");
        assert_eq!(sanitize_name(""), "");
    }

    #[test]
    fn test_sanitize_folder_name() {
        assert_eq!(sanitize_folder_name("/Icons/"), "Icons");
        assert_eq!(sanitize_folder_name(" My   Icons "), "My_Icons");
        assert_eq!(sanitize_folder_name("v1.2 (beta)"), "v1.2__beta_");
        assert_eq!(sanitize_folder_name("a-b_c"), "a-b_c");
    }

    #[test]
    fn test_strip_variant_suffix() {
        assert_eq!(strip_variant_suffix("Arrow/Size=24"), "Arrow");
        assert_eq!(strip_variant_suffix("Arrow"), "Arrow");
        assert_eq!(strip_variant_suffix("/x"), "");
    }

    #[test]
    fn test_file_path_size_rules() {
        let raster = OutputFormat::Raster;
        assert_eq!(file_path("ICON", "24", &[], false, raster), "ICON_PNG.png");
        assert_eq!(file_path("ICON", "24", &[], true, raster), "ICON24_PNG.png");
        assert_eq!(file_path("ICON", "32", &[], false, raster), "ICON32_PNG.png");
        assert_eq!(file_path("ICON", "", &[], true, raster), "ICON_PNG.png");
        assert_eq!(
            file_path("ICON", "16", &[], false, OutputFormat::Vector),
            "ICON16_SVG.svg"
        );
    }

    #[test]
    fn test_file_path_segments() {
        let segments = vec!["Nav Icons".to_string(), "Arrows".to_string()];
        assert_eq!(
            file_path("ARROW", "16", &segments, false, OutputFormat::Raster),
            "Nav_Icons/Arrows/ARROW16_PNG.png"
        );
    }

    #[test]
    fn test_archive_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            archive_name(date, "VCL_EXPORT", OutputFormat::Raster),
            "2024_03_07_VCL_EXPORT_Raster.zip"
        );
        assert_eq!(
            archive_name(date, "VCL_EXPORT", OutputFormat::Vector),
            "2024_03_07_VCL_EXPORT_Vector.zip"
        );
    }
}
