//! Writers for building `.deb` fixtures at test time.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::ar::MAGIC;
use crate::codec::Codec;
use crate::tar::BLOCK;

/// A `tar` stream of regular files, with a `./` directory entry first.
pub fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    push_tar_entry(&mut out, "./", b'5', b"");
    for (name, data) in files {
        push_tar_entry(&mut out, name, b'0', data);
    }
    out.resize(out.len() + 2 * BLOCK, 0);
    out
}

fn push_tar_entry(out: &mut Vec<u8>, name: &str, flag: u8, data: &[u8]) {
    let mut header = [0u8; BLOCK];
    let name = name.as_bytes();
    let len = name.len().min(100);
    header[..len].copy_from_slice(&name[..len]);
    let mode: &[u8] = if flag == b'5' { b"0000755" } else { b"0000644" };
    header[100..107].copy_from_slice(mode);
    header[108..115].copy_from_slice(b"0000000");
    header[116..123].copy_from_slice(b"0000000");
    header[124..135].copy_from_slice(format!("{:011o}", data.len()).as_bytes());
    header[136..147].copy_from_slice(b"00000000000");
    header[156] = flag;
    header[257..263].copy_from_slice(b"ustar\0");
    header[263..265].copy_from_slice(b"00");
    header[265..269].copy_from_slice(b"root");
    header[297..301].copy_from_slice(b"root");

    header[148..156].fill(b' ');
    let sum: u32 = header.iter().map(|&b| u32::from(b)).sum();
    header[148..155].copy_from_slice(format!("{sum:06o}\0").as_bytes());

    out.extend_from_slice(&header);
    out.extend_from_slice(data);
    out.resize(out.len().div_ceil(BLOCK) * BLOCK, 0);
}

/// An `ar` archive with GNU-style names.
pub fn ar_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    for (name, data) in members {
        let header = format!(
            "{:<16}{:<12}{:<6}{:<6}{:<8}{:<10}`\n",
            name,
            0,
            0,
            0,
            "100644",
            data.len()
        );
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(data);
        if data.len() % 2 == 1 {
            out.push(b'\n');
        }
    }
    out
}

pub fn compress(codec: Codec, data: &[u8]) -> io::Result<Vec<u8>> {
    match codec {
        Codec::Plain => Ok(data.to_vec()),
        Codec::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        Codec::Xz => {
            let mut out = Vec::new();
            lzma_rs::xz_compress(&mut &data[..], &mut out)?;
            Ok(out)
        }
        Codec::Lzma => {
            let mut out = Vec::new();
            lzma_rs::lzma_compress(&mut &data[..], &mut out)?;
            Ok(out)
        }
        Codec::Zstd => zstd::encode_all(data, 0),
    }
}

/// Bytes of a `.deb` whose control archive (compressed with `codec`) holds
/// `control_text` as `./control`.
pub fn build_deb(control_text: &str, codec: Codec) -> io::Result<Vec<u8>> {
    let control_tar = tar_bytes(&[
        ("./control", control_text.as_bytes()),
        ("./md5sums", b"d41d8cd98f00b204e9800998ecf8427e  usr/share/doc/README\n"),
    ]);
    let control_member = format!("control.tar{}", codec.extension());
    let data_tar = compress(Codec::Gzip, &tar_bytes(&[]))?;
    Ok(ar_bytes(&[
        ("debian-binary", b"2.0\n"),
        (&control_member, &compress(codec, &control_tar)?),
        ("data.tar.gz", &data_tar),
    ]))
}

/// Write a gzip-compressed `.deb` with `control_text` to `dir/file_name`.
pub fn write_deb(dir: &Path, file_name: &str, control_text: &str) -> io::Result<PathBuf> {
    write_deb_with(dir, file_name, control_text, Codec::Gzip)
}

pub fn write_deb_with(
    dir: &Path,
    file_name: &str,
    control_text: &str,
    codec: Codec,
) -> io::Result<PathBuf> {
    let path = dir.join(file_name);
    std::fs::write(&path, build_deb(control_text, codec)?)?;
    Ok(path)
}

/// Minimal control text for `package`, with an optional `Depends` value.
pub fn control_text(package: &str, version: &str, depends: Option<&str>) -> String {
    let mut text = format!(
        "Package: {package}\nVersion: {version}\nArchitecture: all\nMaintainer: Test <test@example.org>\n"
    );
    if let Some(depends) = depends {
        text.push_str(&format!("Depends: {depends}\n"));
    }
    text.push_str(&format!("Description: {package} test fixture\n Generated for tests.\n"));
    text
}

/// Write `<package>_<version>_all.deb` into `dir`.
pub fn write_package(
    dir: &Path,
    package: &str,
    version: &str,
    depends: Option<&str>,
) -> io::Result<PathBuf> {
    write_deb(
        dir,
        &format!("{package}_{version}_all.deb"),
        &control_text(package, version, depends),
    )
}
