use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::error::{Error, ErrorKind};

/// Extension a file is considered to have when its name carries none.
pub const NO_EXTENSION: &str = "none";

/// The category a cataloged file is classified into.
///
/// Classification is a pure function of the (lowercase) extension: the same
/// extension always maps to the same kind, and anything unrecognized falls
/// through to [`Outros`](Self::Outros). The lowercase label returned by
/// [`as_str`](Self::as_str) is also the value persisted in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKind {
    /// Raster and vector images (jpg, png, svg, ...)
    Imagem,
    /// Video containers (mp4, mkv, ...)
    Video,
    /// Audio (mp3, flac, ...)
    Audio,
    /// Documents and spreadsheets (pdf, docx, xlsx, ...)
    Documento,
    /// Compressed archives (zip, rar, ...)
    Arquivo,
    /// Executables and scripts (exe, sh, ...)
    Executavel,
    /// Source code and markup (js, py, html, ...)
    Codigo,
    /// Everything else
    Outros,
}

impl FileKind {
    /// All categories, in display order.
    pub const ALL: [FileKind; 8] = [
        FileKind::Imagem,
        FileKind::Video,
        FileKind::Audio,
        FileKind::Documento,
        FileKind::Arquivo,
        FileKind::Executavel,
        FileKind::Codigo,
        FileKind::Outros,
    ];

    /// Classify a file by its extension (case-insensitive, first match wins).
    pub fn from_extension(extension: &str) -> Self {
        let extension = extension.to_ascii_lowercase();
        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" => Self::Imagem,
            "mp4" | "mkv" | "avi" | "mov" | "webm" => Self::Video,
            "mp3" | "wav" | "flac" | "aac" | "ogg" => Self::Audio,
            "pdf" | "doc" | "docx" | "txt" | "md" | "xls" | "xlsx" | "ppt" => Self::Documento,
            "zip" | "rar" | "7z" | "tar" | "gz" => Self::Arquivo,
            "exe" | "msi" | "bat" | "sh" | "bin" => Self::Executavel,
            "js" | "ts" | "html" | "css" | "json" | "py" | "java" => Self::Codigo,
            _ => Self::Outros,
        }
    }

    /// Returns the persisted (and displayed) label for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imagem => "imagem",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Documento => "documento",
            Self::Arquivo => "arquivo",
            Self::Executavel => "executavel",
            Self::Codigo => "codigo",
            Self::Outros => "outros",
        }
    }
}

impl FromStr for FileKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "imagem" => Self::Imagem,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "documento" => Self::Documento,
            "arquivo" => Self::Arquivo,
            "executavel" => Self::Executavel,
            "codigo" => Self::Codigo,
            "outros" => Self::Outros,
            _ => exn::bail!(ErrorKind::InvalidData("file kind")),
        })
    }
}

impl Display for FileKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Extract the lowercase extension from a file name.
///
/// The extension is everything after the *last* dot. A name without a dot,
/// or ending in a dot, yields [`NO_EXTENSION`]. Dotfiles such as
/// `.gitignore` yield `"gitignore"` — the catalog mirrors how the listing
/// presents them rather than second-guessing hidden-file conventions.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => NO_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("jpg", FileKind::Imagem)]
    #[case("jpeg", FileKind::Imagem)]
    #[case("png", FileKind::Imagem)]
    #[case("gif", FileKind::Imagem)]
    #[case("webp", FileKind::Imagem)]
    #[case("svg", FileKind::Imagem)]
    #[case("bmp", FileKind::Imagem)]
    #[case("mp4", FileKind::Video)]
    #[case("mkv", FileKind::Video)]
    #[case("avi", FileKind::Video)]
    #[case("mov", FileKind::Video)]
    #[case("webm", FileKind::Video)]
    #[case("mp3", FileKind::Audio)]
    #[case("wav", FileKind::Audio)]
    #[case("flac", FileKind::Audio)]
    #[case("aac", FileKind::Audio)]
    #[case("ogg", FileKind::Audio)]
    #[case("pdf", FileKind::Documento)]
    #[case("doc", FileKind::Documento)]
    #[case("docx", FileKind::Documento)]
    #[case("txt", FileKind::Documento)]
    #[case("md", FileKind::Documento)]
    #[case("xls", FileKind::Documento)]
    #[case("xlsx", FileKind::Documento)]
    #[case("ppt", FileKind::Documento)]
    #[case("zip", FileKind::Arquivo)]
    #[case("rar", FileKind::Arquivo)]
    #[case("7z", FileKind::Arquivo)]
    #[case("tar", FileKind::Arquivo)]
    #[case("gz", FileKind::Arquivo)]
    #[case("exe", FileKind::Executavel)]
    #[case("msi", FileKind::Executavel)]
    #[case("bat", FileKind::Executavel)]
    #[case("sh", FileKind::Executavel)]
    #[case("bin", FileKind::Executavel)]
    #[case("js", FileKind::Codigo)]
    #[case("ts", FileKind::Codigo)]
    #[case("html", FileKind::Codigo)]
    #[case("css", FileKind::Codigo)]
    #[case("json", FileKind::Codigo)]
    #[case("py", FileKind::Codigo)]
    #[case("java", FileKind::Codigo)]
    fn test_known_extensions(#[case] extension: &str, #[case] expected: FileKind) {
        assert_eq!(FileKind::from_extension(extension), expected);
    }

    #[rstest]
    #[case("JPG", FileKind::Imagem)]
    #[case("Mp4", FileKind::Video)]
    #[case("PDF", FileKind::Documento)]
    #[case("sH", FileKind::Executavel)]
    fn test_mixed_case_extensions(#[case] extension: &str, #[case] expected: FileKind) {
        assert_eq!(FileKind::from_extension(extension), expected);
    }

    #[rstest]
    #[case("iso")]
    #[case("dat")]
    #[case("none")]
    #[case("")]
    fn test_unknown_extensions_fall_through(#[case] extension: &str) {
        assert_eq!(FileKind::from_extension(extension), FileKind::Outros);
    }

    #[rstest]
    #[case("ferias2019.JPG", "jpg")]
    #[case("archive.tar.gz", "gz")]
    #[case("README", "none")]
    #[case("trailing.", "none")]
    #[case(".gitignore", "gitignore")]
    fn test_extension_of(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(extension_of(name), expected);
    }

    #[test]
    fn test_label_round_trip() {
        for kind in FileKind::ALL {
            assert_eq!(kind.as_str().parse::<FileKind>().unwrap(), kind);
        }
        assert!("documents".parse::<FileKind>().is_err());
    }
}
