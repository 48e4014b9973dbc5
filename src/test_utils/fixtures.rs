//! Archive fixtures.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Zip archive laid out like a vendor plugin download: one top-level
/// directory named `slug` holding `files` (`(relative path, contents)`).
///
/// # Panics
///
/// If the in-memory archive cannot be written.
pub fn plugin_zip(slug: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let options = SimpleFileOptions::default();
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory(format!("{slug}/"), options).expect("add plugin directory");
    for (path, contents) in files {
        writer.start_file(format!("{slug}/{path}"), options).expect("start zip entry");
        writer.write_all(contents.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}
