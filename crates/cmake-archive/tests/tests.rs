use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use cmake_archive::{
    Error, ErrorKind, ExtractOptions, extract, normalize, unpack,
};
use flate2::write::GzEncoder;
use tar::{EntryType, Header};
use tempfile::tempdir;

enum Item<'a> {
    Dir(&'a str, u32),
    File(&'a str, u32, &'a [u8]),
    Symlink(&'a str, &'a str),
    /// Written byte-for-byte into the header, bypassing tar's own path checks.
    RawFile(&'a str, &'a [u8]),
}

fn tar_bytes(items: &[Item<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for item in items {
        let mut header = Header::new_gnu();
        match *item {
            Item::Dir(path, mode) => {
                header.set_path(path).unwrap();
                header.set_entry_type(EntryType::Directory);
                header.set_mode(mode);
                header.set_size(0);
                header.set_cksum();
                builder.append(&header, std::io::empty()).unwrap();
            }
            Item::File(path, mode, data) => {
                header.set_path(path).unwrap();
                header.set_entry_type(EntryType::Regular);
                header.set_mode(mode);
                header.set_size(data.len() as u64);
                header.set_cksum();
                builder.append(&header, data).unwrap();
            }
            Item::Symlink(path, target) => {
                header.set_path(path).unwrap();
                header.set_entry_type(EntryType::Symlink);
                header.set_link_name(target).unwrap();
                header.set_mode(0o777);
                header.set_size(0);
                header.set_cksum();
                builder.append(&header, std::io::empty()).unwrap();
            }
            Item::RawFile(name, data) => {
                header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
                header.set_entry_type(EntryType::Regular);
                header.set_mode(0o644);
                header.set_size(data.len() as u64);
                header.set_cksum();
                builder.append(&header, data).unwrap();
            }
        }
    }
    builder.into_inner().unwrap()
}

fn write_tar(path: &Path, items: &[Item<'_>]) {
    fs::write(path, tar_bytes(items)).unwrap();
}

fn write_tar_gz(path: &Path, items: &[Item<'_>]) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), flate2::Compression::default());
    encoder.write_all(&tar_bytes(items)).unwrap();
    encoder.finish().unwrap();
}

fn write_zip(path: &Path, files: &[(&str, u32, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for &(name, mode, data) in files {
        let options = zip::write::SimpleFileOptions::default().unix_permissions(mode);
        if name.ends_with('/') {
            writer.add_directory(name, options).unwrap();
        } else {
            writer.start_file(name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap();
}

fn release_layout() -> Vec<Item<'static>> {
    vec![
        Item::Dir("cmake-3.28.1-linux-x86_64/", 0o755),
        Item::Dir("cmake-3.28.1-linux-x86_64/bin/", 0o755),
        Item::File("cmake-3.28.1-linux-x86_64/bin/tool", 0o755, b"#!/bin/sh\necho tool\n"),
        Item::Dir("cmake-3.28.1-linux-x86_64/lib/", 0o755),
        Item::File("cmake-3.28.1-linux-x86_64/lib/data.txt", 0o644, b"data"),
    ]
}

#[cfg(unix)]
fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[test]
fn nested_compression_extracts_and_normalizes() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("file.tar.gz");
    write_tar_gz(&archive, &release_layout());
    let target = dir.path().join("target");

    let report = extract(&archive, &target, &ExtractOptions::default()).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.directories, 3);

    let bin = normalize(&target).unwrap();

    assert_eq!(bin, target.join("bin"));
    assert!(target.join("bin/tool").is_file());
    assert_eq!(fs::read(target.join("lib/data.txt")).unwrap(), b"data");
    assert!(!target.join("file.tar").exists());
    assert!(!dir.path().join("file.tar").exists());
    assert!(!target.join("cmake-3.28.1-linux-x86_64").exists());

    #[cfg(unix)]
    {
        assert_eq!(mode_of(&target.join("bin/tool")), 0o755);
        assert_eq!(mode_of(&target.join("lib/data.txt")), 0o644);
    }
}

#[test]
fn tgz_is_gzip_over_tar() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake-3.28.1-macos-universal.tgz");
    write_tar_gz(&archive, &release_layout());
    let target = dir.path().join("target");

    extract(&archive, &target, &ExtractOptions::default()).unwrap();
    normalize(&target).unwrap();

    assert!(target.join("bin/tool").is_file());
}

#[test]
fn plain_tar_extracts() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake.tar");
    write_tar(&archive, &release_layout());
    let target = dir.path().join("target");

    extract(&archive, &target, &ExtractOptions::default()).unwrap();

    assert!(
        target
            .join("cmake-3.28.1-linux-x86_64/lib/data.txt")
            .is_file()
    );
}

#[test]
fn path_traversal_is_rejected() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("evil.tar");
    write_tar(
        &archive,
        &[Item::RawFile("../../etc/passwd", b"root::0:0::/:/bin/sh")],
    );
    let destination = dir.path().join("a/b/dest");

    let err = unpack(&archive, &destination, &ExtractOptions::default()).unwrap_err();

    assert!(matches!(err, Error::PathTraversal { .. }));
    assert_eq!(err.kind(), ErrorKind::PathTraversal);
    assert!(!dir.path().join("etc").exists());
    assert!(!dir.path().join("a/etc").exists());
    assert_eq!(fs::read_dir(&destination).unwrap().count(), 0);
}

#[test]
fn traversal_aborts_extract_without_touching_target() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("evil.tar.gz");
    write_tar_gz(
        &archive,
        &[
            Item::File("ok.txt", 0o644, b"fine"),
            Item::RawFile("../escape.txt", b"nope"),
        ],
    );
    let target = dir.path().join("target");

    let err = extract(&archive, &target, &ExtractOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathTraversal);
    assert!(!target.join("ok.txt").exists());
    assert!(!dir.path().join("escape.txt").exists());
}

#[test]
fn missing_canonical_root() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("nobin.tar.gz");
    write_tar_gz(
        &archive,
        &[
            Item::Dir("pkg/", 0o755),
            Item::File("pkg/lib/libfoo.a", 0o644, b"!<arch>"),
        ],
    );
    let target = dir.path().join("target");

    extract(&archive, &target, &ExtractOptions::default()).unwrap();
    let err = normalize(&target).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CanonicalRootNotFound);
}

#[test]
#[tracing_test::traced_test]
fn unsupported_entries_are_skipped() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("links.tar");
    write_tar(
        &archive,
        &[
            Item::Symlink("bin/cmake-link", "cmake"),
            Item::File("bin/cmake", 0o755, b"binary"),
            Item::File("share/after.txt", 0o644, b"read after the link"),
        ],
    );
    let destination = dir.path().join("dest");

    let report = unpack(&archive, &destination, &ExtractOptions::default()).unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "bin/cmake-link");
    assert_eq!(report.files, 2);
    assert!(fs::symlink_metadata(destination.join("bin/cmake-link")).is_err());
    assert_eq!(fs::read(destination.join("bin/cmake")).unwrap(), b"binary");
    assert_eq!(
        fs::read(destination.join("share/after.txt")).unwrap(),
        b"read after the link"
    );
    logs_assert(|lines: &[&str]| {
        match lines
            .iter()
            .filter(|line| line.contains("skipping unsupported archive entry"))
            .count()
        {
            1 => Ok(()),
            n => Err(format!("expected one skip warning, found {n}")),
        }
    });
}

#[test]
#[tracing_test::traced_test]
fn zip_symlinks_are_skipped() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake-3.28.1-macos-universal.zip");
    let mut writer = zip::ZipWriter::new(File::create(&archive).unwrap());
    let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
    writer.start_file("bin/cmake", options).unwrap();
    writer.write_all(b"binary").unwrap();
    writer
        .add_symlink_from_path("bin/cmake3", "cmake", options)
        .unwrap();
    writer.start_file("bin/ctest", options).unwrap();
    writer.write_all(b"tests").unwrap();
    writer.finish().unwrap();
    let destination = dir.path().join("dest");

    let report = unpack(&archive, &destination, &ExtractOptions::default()).unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "bin/cmake3");
    assert!(fs::symlink_metadata(destination.join("bin/cmake3")).is_err());
    assert_eq!(fs::read(destination.join("bin/ctest")).unwrap(), b"tests");
    assert!(logs_contain("skipping unsupported archive entry"));
}

#[test]
fn zip_restores_modes() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake-3.28.1-windows-x86_64.zip");
    write_zip(
        &archive,
        &[
            ("cmake-3.28.1/", 0o755, b""),
            ("cmake-3.28.1/bin/", 0o755, b""),
            ("cmake-3.28.1/bin/cmake", 0o755, b"MZ"),
            ("cmake-3.28.1/doc/notes.txt", 0o644, b"notes"),
        ],
    );
    let target = dir.path().join("target");

    extract(&archive, &target, &ExtractOptions::default()).unwrap();
    normalize(&target).unwrap();

    assert_eq!(fs::read(target.join("bin/cmake")).unwrap(), b"MZ");
    assert!(target.join("doc/notes.txt").is_file());
    #[cfg(unix)]
    {
        assert_eq!(mode_of(&target.join("bin/cmake")), 0o755);
        assert_eq!(mode_of(&target.join("doc/notes.txt")), 0o644);
    }
}

#[test]
fn posix_support_off_leaves_modes_alone() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake.zip");
    write_zip(&archive, &[("bin/cmake", 0o700, b"x")]);
    let target = dir.path().join("target");

    extract(
        &archive,
        &target,
        &ExtractOptions::default().supports_posix(false),
    )
    .unwrap();

    assert!(target.join("bin/cmake").is_file());
    #[cfg(unix)]
    assert_ne!(mode_of(&target.join("bin/cmake")), 0o700);
}

#[test]
fn jar_is_read_as_zip() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("plugin.jar");
    write_zip(
        &archive,
        &[
            ("META-INF/MANIFEST.MF", 0o644, b"Manifest-Version: 1.0\n"),
            ("bin/run", 0o755, b"run"),
        ],
    );
    let target = dir.path().join("target");

    extract(&archive, &target, &ExtractOptions::default()).unwrap();

    assert!(target.join("META-INF/MANIFEST.MF").is_file());
    assert!(target.join("bin/run").is_file());
}

#[test]
fn unknown_suffix_is_unsupported() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake-3.28.1.tar.bz2");
    fs::write(&archive, b"BZh91AY&SY").unwrap();
    let target = dir.path().join("target");

    let err = extract(&archive, &target, &ExtractOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    assert!(!target.exists());
}

#[test]
fn unpack_sniffs_unknown_extension() {
    let dir = tempdir().unwrap();
    let tarball = dir.path().join("download.bin");
    write_tar(&tarball, &[Item::File("bin/cmake", 0o755, b"elf")]);
    let zipball = dir.path().join("download.dat");
    write_zip(&zipball, &[("bin/cmake.exe", 0o755, b"MZ")]);

    unpack(&tarball, dir.path().join("from-tar"), &ExtractOptions::default()).unwrap();
    unpack(&zipball, dir.path().join("from-zip"), &ExtractOptions::default()).unwrap();

    assert!(dir.path().join("from-tar/bin/cmake").is_file());
    assert!(dir.path().join("from-zip/bin/cmake.exe").is_file());

    let junk = dir.path().join("junk.bin");
    fs::write(&junk, b"nothing to see").unwrap();
    let err = unpack(&junk, dir.path().join("junk"), &ExtractOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

#[test]
fn compressed_single_file_is_placed_as_is() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake.gz");
    let mut encoder = GzEncoder::new(File::create(&archive).unwrap(), flate2::Compression::fast());
    encoder.write_all(b"standalone binary").unwrap();
    encoder.finish().unwrap();
    let target = dir.path().join("target");

    let report = extract(&archive, &target, &ExtractOptions::default()).unwrap();

    assert_eq!(report.files, 1);
    assert_eq!(fs::read(target.join("cmake")).unwrap(), b"standalone binary");
}

#[test]
fn staging_next_to_target_is_cleaned_up() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake.tar.gz");
    write_tar_gz(&archive, &release_layout());
    let staging = dir.path().join("staging");
    let target = dir.path().join("target");

    extract(
        &archive,
        &target,
        &ExtractOptions::default().staging_dir(&staging),
    )
    .unwrap();

    assert!(target.join("cmake-3.28.1-linux-x86_64/bin/tool").is_file());
    assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
}

#[test]
fn normalize_is_idempotent() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("cmake.tar.gz");
    write_tar_gz(&archive, &release_layout());
    let target = dir.path().join("target");
    extract(&archive, &target, &ExtractOptions::default()).unwrap();
    normalize(&target).unwrap();

    let before = snapshot(&target);
    normalize(&target).unwrap();
    assert_eq!(snapshot(&target), before);
}

#[cfg(unix)]
fn read_only_share() -> Vec<Item<'static>> {
    vec![
        Item::Dir("pkg/", 0o755),
        Item::Dir("pkg/bin/", 0o755),
        Item::File("pkg/bin/tool", 0o755, b"tool"),
        Item::Dir("pkg/share/", 0o555),
        Item::File("pkg/share/x.txt", 0o644, b"x"),
    ]
}

#[cfg(unix)]
fn assert_read_only_share(target: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let share = target.join("share");
    assert_eq!(mode_of(&share), 0o555);
    assert_eq!(fs::read(share.join("x.txt")).unwrap(), b"x");
    assert!(target.join("bin/tool").is_file());
    assert!(!target.join("pkg").exists());
    fs::set_permissions(&share, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn read_only_directories_survive_copy_promotion() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("pkg.tar.gz");
    write_tar_gz(&archive, &read_only_share());
    let target = dir.path().join("target");

    extract(&archive, &target, &ExtractOptions::default()).unwrap();
    assert_eq!(normalize(&target).unwrap(), target.join("bin"));

    assert_read_only_share(&target);
}

#[cfg(unix)]
#[test]
fn read_only_directories_survive_rename_promotion() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("pkg.tar.gz");
    write_tar_gz(&archive, &read_only_share());
    let staging = dir.path().join("staging");
    let target = dir.path().join("target");

    extract(
        &archive,
        &target,
        &ExtractOptions::default().staging_dir(&staging),
    )
    .unwrap();
    assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
    normalize(&target).unwrap();

    assert_read_only_share(&target);
}

#[cfg(unix)]
#[test]
fn read_only_canonical_root_is_hoisted() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("pkg.tar");
    write_tar(
        &archive,
        &[
            Item::Dir("outer/", 0o555),
            Item::Dir("outer/pkg/", 0o555),
            Item::Dir("outer/pkg/bin/", 0o755),
            Item::File("outer/pkg/bin/tool", 0o755, b"tool"),
        ],
    );
    let target = dir.path().join("target");

    extract(&archive, &target, &ExtractOptions::default()).unwrap();
    normalize(&target).unwrap();

    assert!(target.join("bin/tool").is_file());
    assert!(!target.join("outer").exists());
    assert_eq!(fs::read_dir(&target).unwrap().count(), 1);
}

fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
            if path.is_dir() {
                out.push((rel, Vec::new()));
                stack.push(path);
            } else {
                out.push((rel, fs::read(&path).unwrap()));
            }
        }
    }
    out.sort();
    out
}
