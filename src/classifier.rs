//! Clasificación de archivos por extensión.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Tipo semántico de un archivo, usado para elegir la estrategia de limpieza.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    Video,
    Audio,
    Pdf,
    Document,
    Ebook,
    Archive,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Image,
        Category::Video,
        Category::Audio,
        Category::Pdf,
        Category::Document,
        Category::Ebook,
        Category::Archive,
        Category::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Pdf => "pdf",
            Category::Document => "document",
            Category::Ebook => "ebook",
            Category::Archive => "archive",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| value.eq_ignore_ascii_case(category.as_str()))
            .ok_or_else(|| format!("Categoría desconocida: {value}"))
    }
}

/// Subtipo de un archivo comprimido, derivado de la última extensión.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    Zip,
    Tar,
    Gzip,
    Bzip2,
    Xz,
    Other,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Self {
        match lowercase_extension(path).as_deref() {
            Some("zip") => ArchiveKind::Zip,
            Some("tar") => ArchiveKind::Tar,
            Some("gz") => ArchiveKind::Gzip,
            Some("bz2") => ArchiveKind::Bzip2,
            Some("xz") => ArchiveKind::Xz,
            _ => ArchiveKind::Other,
        }
    }
}

// Una extensión pertenece a una sola categoría; `webp` queda en imágenes.
const EXTENSION_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Image,
        &["jpg", "jpeg", "png", "gif", "webp", "tiff", "bmp", "heic"],
    ),
    (
        Category::Video,
        &["mp4", "mov", "avi", "mkv", "webm", "3gp", "flv", "mpeg"],
    ),
    (
        Category::Audio,
        &["mp3", "wav", "flac", "aac", "ogg", "m4a", "wma", "alac", "oga"],
    ),
    (Category::Pdf, &["pdf"]),
    (
        Category::Document,
        &[
            "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "txt", "csv",
        ],
    ),
    (Category::Ebook, &["epub", "mobi", "azw3", "fb2"]),
    (
        Category::Archive,
        &["zip", "rar", "7z", "tar", "gz", "bz2", "xz"],
    ),
];

/// Devuelve la categoría asociada al sufijo del nombre. Nunca falla.
pub fn classify(file_name: &str) -> Category {
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return Category::Unknown;
    };
    let extension = extension.to_lowercase();

    EXTENSION_TABLE
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension.as_str()))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Unknown)
}

pub fn classify_path(path: &Path) -> Category {
    path.file_name()
        .map(|name| classify(&name.to_string_lossy()))
        .unwrap_or(Category::Unknown)
}

/// Extensiones reconocidas para una categoría.
pub fn supported_extensions(category: Category) -> &'static [&'static str] {
    EXTENSION_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == category)
        .map(|(_, extensions)| *extensions)
        .unwrap_or(&[])
}

pub(crate) fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify("photo.JPG"), Category::Image);
        assert_eq!(classify("Report.Pdf"), Category::Pdf);
        assert_eq!(classify("book.EPUB"), Category::Ebook);
    }

    #[test]
    fn classify_is_total() {
        assert_eq!(classify(""), Category::Unknown);
        assert_eq!(classify("README"), Category::Unknown);
        assert_eq!(classify("archive."), Category::Unknown);
        assert_eq!(classify("binary.exe"), Category::Unknown);
        assert_eq!(classify(".hidden"), Category::Unknown);
    }

    #[test]
    fn classify_uses_last_suffix() {
        assert_eq!(classify("backup.tar.gz"), Category::Archive);
        assert_eq!(classify("notes.txt"), Category::Document);
        assert_eq!(classify("clip.webm"), Category::Video);
        assert_eq!(classify("song.oga"), Category::Audio);
    }

    #[test]
    fn every_extension_maps_to_one_category() {
        let mut seen = std::collections::HashSet::new();
        for (_, extensions) in EXTENSION_TABLE {
            for extension in extensions.iter() {
                assert!(seen.insert(*extension), "extensión duplicada: {extension}");
            }
        }
        assert_eq!(classify("image.webp"), Category::Image);
    }

    #[test]
    fn archive_kind_follows_last_extension() {
        assert_eq!(ArchiveKind::from_path(Path::new("a.zip")), ArchiveKind::Zip);
        assert_eq!(ArchiveKind::from_path(Path::new("a.TAR")), ArchiveKind::Tar);
        assert_eq!(
            ArchiveKind::from_path(Path::new("a.tar.gz")),
            ArchiveKind::Gzip
        );
        assert_eq!(ArchiveKind::from_path(Path::new("a.bz2")), ArchiveKind::Bzip2);
        assert_eq!(ArchiveKind::from_path(Path::new("a.xz")), ArchiveKind::Xz);
        assert_eq!(ArchiveKind::from_path(Path::new("a.7z")), ArchiveKind::Other);
    }

    #[test]
    fn supported_extensions_agree_with_classify() {
        for category in Category::ALL {
            for extension in supported_extensions(category) {
                assert_eq!(classify(&format!("file.{extension}")), category);
            }
        }
        assert!(supported_extensions(Category::Unknown).is_empty());
        assert_eq!(supported_extensions(Category::Pdf), &["pdf"]);
    }

    #[test]
    fn category_round_trips_through_strings() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("spreadsheet".parse::<Category>().is_err());
    }
}
