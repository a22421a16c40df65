use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use rocket::fs::TempFile;

/// Image extensions accepted for uploaded photos, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Stem used when nothing of the client's filename survives sanitising.
const FALLBACK_STEM: &str = "photo";

/// Longest stem kept from a client filename, leaving room for the generated
/// prefix within a 255-byte filename.
pub const MAX_STEM_CHARS: usize = 100;

/// An uploaded photo that has not been stored yet.
#[rocket::async_trait]
pub trait PhotoUpload: Send {
    /// The filename the client supplied. Untrusted.
    fn client_name(&self) -> Option<&str>;

    /// Write the photo's contents to `path`.
    async fn store_at(&mut self, path: &Path) -> io::Result<()>;
}

#[rocket::async_trait]
impl<'v> PhotoUpload for TempFile<'v> {
    fn client_name(&self) -> Option<&str> {
        self.raw_name()
            .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str())
    }

    async fn store_at(&mut self, path: &Path) -> io::Result<()> {
        // Copy rather than persist: the temp dir may be on another filesystem.
        self.copy_to(path).await
    }
}

/// The lowercased extension of `filename` if it is an allowed image type.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Reduce an untrusted filename stem to `[A-Za-z0-9_.-]`.
///
/// Path separators and whitespace become `_`, everything else outside the
/// safe set is dropped, and leading/trailing dots and underscores are trimmed
/// so the result can never name a parent or hidden file. At most
/// [`MAX_STEM_CHARS`] characters are kept.
pub fn sanitize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '.' => out.push(c),
            '_' | '/' | '\\' => out.push('_'),
            c if c.is_whitespace() => out.push('_'),
            _ => {}
        }
    }
    // Collapse runs of underscores left by separators and whitespace.
    let mut collapsed = String::with_capacity(out.len());
    for c in out.chars() {
        if !(c == '_' && collapsed.ends_with('_')) {
            collapsed.push(c);
        }
    }
    let trimmed = collapsed.trim_matches(|c: char| c == '.' || c == '_');
    let trimmed = match trimmed.char_indices().nth(MAX_STEM_CHARS) {
        Some((cut, _)) => trimmed[..cut].trim_end_matches(|c: char| c == '.' || c == '_'),
        None => trimmed,
    };
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// The name a photo is stored under in the uploads directory.
///
/// `batch` is a random token shared by one submission's photos and `index`
/// is the photo's position in the upload, so names never collide even for
/// identical client filenames submitted in the same second.
pub fn stored_name(
    client_name: &str,
    at: DateTime<Utc>,
    batch: &str,
    index: usize,
) -> Option<String> {
    let ext = allowed_extension(client_name)?;
    // Browsers may send a full path; only the last component is meaningful.
    let base = client_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(client_name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    Some(format!(
        "{}_{batch}_{index}_{}.{ext}",
        at.format("%Y%m%d_%H%M%S"),
        sanitize_stem(stem)
    ))
}

/// A fresh random token for one batch of uploads.
pub fn batch_token() -> String {
    format!("{:08x}", rand::random::<u32>())
}
