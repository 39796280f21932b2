// io.rs
// Scene documents on disk: plain or gzip-compressed JSON

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde_json::Value;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::profile_scope;

/// Leading bytes of every gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn invalid_data<E: Into<Box<dyn std::error::Error + Send + Sync>>>(err: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, err)
}

/// Whether `path` asks for gzip output by its extension.
pub fn wants_gzip<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Write a scene document. The file is written next to `path` first and
/// renamed into place, so an interrupted save never truncates the old file.
pub fn save_scene<P: AsRef<Path>>(path: P, data: &Value, compress: bool) -> std::io::Result<()> {
    profile_scope!("save_scene");
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension({
        let mut os = path.extension().map(|e| e.to_os_string()).unwrap_or_default();
        os.push(".tmp");
        os
    });
    {
        let file = std::fs::File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        if compress {
            let mut encoder = GzEncoder::new(&mut writer, Compression::fast());
            serde_json::to_writer(&mut encoder, data).map_err(invalid_data)?;
            encoder.finish()?;
        } else {
            serde_json::to_writer_pretty(&mut writer, data).map_err(invalid_data)?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read a scene document, detecting gzip by its magic bytes rather than
/// the file name.
pub fn load_scene<P: AsRef<Path>>(path: P) -> std::io::Result<Value> {
    profile_scope!("load_scene");
    let raw = std::fs::read(path.as_ref())?;
    let parsed = if raw.starts_with(&GZIP_MAGIC) {
        serde_json::from_reader(GzDecoder::new(raw.as_slice()))
    } else {
        serde_json::from_slice(&raw)
    };
    parsed.map_err(invalid_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("em_sandbox_io_{}_{name}", std::process::id()))
    }

    #[test]
    fn plain_and_gzip_round_trip() {
        let doc = json!({ "objects": [{ "type": "particle", "x": 1.5 }] });
        for (name, compress) in [("plain.json", false), ("packed.json.gz", true)] {
            let path = scratch(name);
            save_scene(&path, &doc, compress).unwrap();
            let raw = std::fs::read(&path).unwrap();
            assert_eq!(raw.starts_with(&GZIP_MAGIC), compress);
            assert_eq!(load_scene(&path).unwrap(), doc);
            std::fs::remove_file(&path).unwrap();
        }
    }

    #[test]
    fn garbage_is_invalid_data() {
        let path = scratch("garbage.json");
        std::fs::write(&path, b"not json").unwrap();
        let err = load_scene(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn truncated_gzip_is_invalid_data() {
        let path = scratch("truncated.json.gz");
        std::fs::write(&path, [0x1f, 0x8b, 0x08, 0x00]).unwrap();
        let err = load_scene(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn gzip_extension_detection() {
        assert!(wants_gzip("out/scene.json.gz"));
        assert!(wants_gzip("scene.GZ"));
        assert!(!wants_gzip("scene.json"));
    }
}
