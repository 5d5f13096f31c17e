//! §6.2 "Inputs the engine consumes" — the pasteboard is an external
//! collaborator; this crate only depends on the trait, never a concrete OS
//! implementation (AppKit/Win32/X11 pasteboard access lives in the
//! embedding application).

/// One of the two privacy markers a pasteboard item may advertise (§4.E
/// step 1). Items carrying either are never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteboardMarker {
    Concealed,
    Transient,
}

/// The raw payload kinds a pasteboard can be asked for (§4.E step 2
/// classification order: files, image, text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteboardDataKind {
    FileUrls,
    Tiff,
    Png,
    Jpeg,
}

/// §6.2: `change_count() -> i64`, `data(type) -> bytes?`, `string() ->
/// string?`, `marker_present(markers) -> bool`, `frontmost_app() -> (name?,
/// bundle_id?)`.
pub trait Pasteboard: Send + Sync {
    fn change_count(&self) -> i64;
    fn data(&self, kind: PasteboardDataKind) -> Option<Vec<u8>>;
    fn string(&self) -> Option<String>;
    fn marker_present(&self, marker: PasteboardMarker) -> bool;
    /// `(source_app_name, source_app_id)`.
    fn frontmost_app(&self) -> (Option<String>, Option<String>);
}

/// A no-op pasteboard used for host applications that only ever call
/// `save_text`/`save_image`/`save_file_list` directly and have no polling
/// loop of their own (and in tests).
#[derive(Debug, Default)]
pub struct NullPasteboard;

impl Pasteboard for NullPasteboard {
    fn change_count(&self) -> i64 {
        0
    }
    fn data(&self, _kind: PasteboardDataKind) -> Option<Vec<u8>> {
        None
    }
    fn string(&self) -> Option<String> {
        None
    }
    fn marker_present(&self, _marker: PasteboardMarker) -> bool {
        false
    }
    fn frontmost_app(&self) -> (Option<String>, Option<String>) {
        (None, None)
    }
}
