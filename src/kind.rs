//! Human-readable type labels and name predicates.

use std::path::Path;

pub const FOLDER_KIND: &str = "Folder";

/// Directory extensions that are presented as a single opaque item.
const PACKAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("app", "Application"),
    ("appex", "App Extension"),
    ("bundle", "Bundle"),
    ("framework", "Framework"),
    ("kext", "Kernel Extension"),
    ("photoslibrary", "Photos Library"),
    ("pkg", "Installer package"),
    ("plugin", "Plug-in"),
    ("xcodeproj", "Xcode Project"),
    ("xcworkspace", "Xcode Workspace"),
];

const FILE_KINDS: &[(&str, &str)] = &[
    ("7z", "7-Zip archive"),
    ("bmp", "BMP image"),
    ("c", "C source"),
    ("css", "CSS style sheet"),
    ("csv", "CSV document"),
    ("doc", "Microsoft Word document"),
    ("docx", "Microsoft Word document"),
    ("gif", "GIF image"),
    ("gz", "gzip compressed archive"),
    ("heic", "HEIF image"),
    ("htm", "HTML text"),
    ("html", "HTML text"),
    ("icns", "Apple icon image"),
    ("ico", "Windows icon image"),
    ("jpeg", "JPEG image"),
    ("jpg", "JPEG image"),
    ("js", "JavaScript script"),
    ("json", "JSON document"),
    ("md", "Markdown document"),
    ("mov", "QuickTime movie"),
    ("mp3", "MP3 audio"),
    ("mp4", "MPEG-4 movie"),
    ("pdf", "PDF document"),
    ("png", "PNG image"),
    ("py", "Python script"),
    ("rs", "Rust source"),
    ("sh", "Shell script"),
    ("svg", "SVG image"),
    ("tar", "tar archive"),
    ("tif", "TIFF image"),
    ("tiff", "TIFF image"),
    ("toml", "TOML document"),
    ("txt", "Plain Text"),
    ("wav", "Waveform audio"),
    ("xls", "Microsoft Excel spreadsheet"),
    ("xlsx", "Microsoft Excel spreadsheet"),
    ("xml", "XML text"),
    ("yaml", "YAML document"),
    ("yml", "YAML document"),
    ("zip", "ZIP archive"),
];

/// Raster formats worth decoding directly for a thumbnail.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "gif", "bmp", "ico", "icns"];

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Label for an item named `name`.
pub fn describe(name: &str, is_directory: bool) -> String {
    if is_directory {
        return FOLDER_KIND.to_string();
    }
    let Some(ext) = extension(name) else {
        return "File".to_string();
    };
    FILE_KINDS
        .iter()
        .chain(PACKAGE_EXTENSIONS)
        .find(|(known, _)| *known == ext)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| format!("{} file", ext.to_uppercase()))
}

/// Directories such as `Foo.app` that are shown as one opaque item.
pub fn is_package(name: &str) -> bool {
    extension(name).is_some_and(|ext| PACKAGE_EXTENSIONS.iter().any(|(known, _)| *known == ext))
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn is_image(name: &str) -> bool {
    extension(name).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Archive sources are recognised by extension alone.
pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}
