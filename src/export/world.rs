//! Minimal in-memory `typst::World` for compiling the generated document.
//!
//! There is exactly one virtual source file and no package resolution; fonts
//! come from the usual system directories.

use std::fs;
use std::path::{Path, PathBuf};

use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::layout::PagedDocument;
use typst::syntax::{FileId, Source, VirtualPath};
use typst::text::{Font, FontBook, FontInfo};
use typst::utils::LazyHash;
use typst::{Library, World};

use super::ExportError;

/// Compile typst source text to PDF bytes.
pub fn compile(source_text: &str) -> Result<Vec<u8>, ExportError> {
    let world = DocumentWorld::new(source_text);
    let result = typst::compile::<PagedDocument>(&world);

    let document = result.output.map_err(|errors| {
        let mut msg = String::new();
        for diag in errors.iter() {
            msg.push_str(&format!("error: {}\n", diag.message));
        }
        ExportError::Compile(msg)
    })?;

    typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default()).map_err(|errors| {
        let mut msg = String::new();
        for diag in errors.iter() {
            msg.push_str(&format!("pdf error: {}\n", diag.message));
        }
        ExportError::Pdf(msg)
    })
}

struct DocumentWorld {
    main_id: FileId,
    source: Source,
    library: LazyHash<Library>,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
}

impl DocumentWorld {
    fn new(source_text: &str) -> Self {
        let mut book = FontBook::new();
        let mut fonts = Vec::new();

        let font_dirs = [
            PathBuf::from("/usr/share/fonts"),
            PathBuf::from("/usr/local/share/fonts"),
            home_dir().map(|h| h.join(".fonts")).unwrap_or_default(),
            home_dir().map(|h| h.join(".local/share/fonts")).unwrap_or_default(),
        ];
        for dir in &font_dirs {
            if dir.is_dir() {
                load_fonts_from_dir(dir, &mut book, &mut fonts);
            }
        }

        let main_id = FileId::new(None, VirtualPath::new("/documentation.typ"));
        Self {
            main_id,
            source: Source::new(main_id, source_text.to_string()),
            library: LazyHash::new(Library::default()),
            book: LazyHash::new(book),
            fonts,
        }
    }
}

impl World for DocumentWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main_id
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main_id {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(PathBuf::from(format!("{:?}", id.vpath()))))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(PathBuf::from(format!("{:?}", id.vpath()))))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        use chrono::{Datelike, Local, Timelike, Utc};
        let naive = if let Some(hours) = offset {
            (Utc::now() + chrono::Duration::hours(hours)).naive_utc()
        } else {
            Local::now().naive_local()
        };
        Datetime::from_ymd_hms(
            naive.year(),
            naive.month() as u8,
            naive.day() as u8,
            naive.hour() as u8,
            naive.minute() as u8,
            naive.second() as u8,
        )
    }
}

/// Load fonts from a directory recursively.
fn load_fonts_from_dir(dir: &Path, book: &mut FontBook, fonts: &mut Vec<Font>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_fonts_from_dir(&path, book, fonts);
        } else if is_font_file(&path)
            && let Ok(data) = fs::read(&path)
        {
            let bytes = Bytes::new(data);
            for (i, info) in FontInfo::iter(&bytes).enumerate() {
                book.push(info);
                if let Some(font) = Font::new(bytes.clone(), i as u32) {
                    fonts.push(font);
                }
            }
        }
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_lowercase().as_str(), "ttf" | "otf" | "ttc"))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
