use flate2::read::GzDecoder;
use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::Path,
    time::Duration,
};

use crate::{
    error::{BootstrapError, Result},
    host::ArchiveFetcher,
};

/// Downloads over HTTPS with a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
        }
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        log::info!("downloading {url} -> {}", dest.display());

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| BootstrapError::download(url, e))?;

        let mut resp = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| BootstrapError::download(url, e))?;

        let file = File::create(dest).map_err(|e| BootstrapError::download(url, e))?;
        let mut writer = BufWriter::new(file);
        let written = resp
            .copy_to(&mut writer)
            .map_err(|e| BootstrapError::download(url, e))?;
        io::Write::flush(&mut writer).map_err(|e| BootstrapError::download(url, e))?;

        log::debug!("downloaded {written} bytes from {url}");
        Ok(())
    }
}

/// Unpacks a `.tar.gz` into `dest`. Entries escaping `dest` are rejected by `tar`.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> io::Result<()> {
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    fs::create_dir_all(dest)?;
    tar.unpack(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use tempfile::tempdir;

    fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let gz = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
        let mut builder = tar::Builder::new(gz);
        for (name, body) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *body).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn unpacks_files_and_directories() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        let archive = dir.join("dist.tar.gz");
        write_archive(
            &archive,
            &[
                ("DynamoDBLocal.jar", &b"jar"[..]),
                ("DynamoDBLocal_lib/libsqlite4java.so", &b"so"[..]),
            ],
        );

        extract_tar_gz(&archive, dir).unwrap();
        assert_eq!(fs::read(dir.join("DynamoDBLocal.jar")).unwrap(), b"jar");
        assert!(dir.join("DynamoDBLocal_lib/libsqlite4java.so").is_file());
    }

    #[test]
    fn truncated_archive_is_an_error() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        let archive = dir.join("partial.tar.gz");
        fs::write(&archive, [0x1f, 0x8b, 0x08, 0x00]).unwrap();

        assert!(extract_tar_gz(&archive, dir).is_err());
    }

    #[test]
    fn unreachable_url_is_a_download_error() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        let err = HttpFetcher::default()
            .fetch("http://127.0.0.1:9/dist.tar.gz", &dir.join("dist.tar.gz"))
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Download { .. }));
    }
}
