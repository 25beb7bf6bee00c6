//! Fixture archives for the integration tests.
#![allow(dead_code)]

use std::io::{Cursor, Write};

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Build a ZIP archive in memory. Names ending in `/` become directory entries.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip_with(entries, CompressionMethod::Deflated)
}

pub fn build_zip_with(entries: &[(&str, &[u8])], method: CompressionMethod) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);

    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }

    writer.finish().unwrap().into_inner()
}

/// Persist archive bytes to a temporary `.nupkg` file.
pub fn write_package(bytes: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".nupkg").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// Flip every byte of the first occurrence of `needle`.
pub fn corrupt(bytes: &mut [u8], needle: &[u8]) {
    let start = bytes
        .windows(needle.len())
        .position(|window| window == needle)
        .expect("needle not present in archive");
    for byte in &mut bytes[start..start + needle.len()] {
        *byte = !*byte;
    }
}

/// Overwrite the first byte of `name`'s stored data with `0xFF`.
///
/// For a deflated entry that sets the reserved block type, so inflation fails.
pub fn corrupt_entry_data(bytes: &mut [u8], name: &str) {
    let header = bytes
        .windows(4)
        .enumerate()
        .filter(|(_, window)| *window == b"PK\x03\x04")
        .map(|(offset, _)| offset)
        .find(|&offset| bytes[offset + 30..].starts_with(name.as_bytes()))
        .expect("local header not present in archive");
    let name_len = u16::from_le_bytes([bytes[header + 26], bytes[header + 27]]) as usize;
    let extra_len = u16::from_le_bytes([bytes[header + 28], bytes[header + 29]]) as usize;
    bytes[header + 30 + name_len + extra_len] = 0xFF;
}

pub fn nuspec(metadata: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata>
    {metadata}
  </metadata>
</package>"#
    )
}

/// Manifest for `Foo 1.2.3` with a single ungrouped dependency on `Bar`.
pub fn foo_nuspec() -> String {
    nuspec(
        r#"<id>Foo</id>
    <version>1.2.3</version>
    <authors>Contoso</authors>
    <description>Foo does things.</description>
    <dependencies>
      <dependency id="Bar" version="[1.0.0,2.0.0)" />
    </dependencies>"#,
    )
}

pub const ICON_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR fake icon";
pub const README_TEXT: &str = "# Foo\n\nA package that does things.\n";

/// The canonical package: manifest, one assembly, readme and icon.
pub fn foo_package() -> Vec<u8> {
    let nuspec = foo_nuspec();
    let dll = vec![0x4Du8; 500];
    build_zip(&[
        ("Foo.nuspec", nuspec.as_bytes()),
        ("lib/net6.0/Foo.dll", &dll),
        ("README.md", README_TEXT.as_bytes()),
        ("icon.png", ICON_BYTES),
    ])
}
