
use anyhow::Context;
use std::io::{BufWriter, Write};
use std::fs::File;
use std::path::Path;

/// Serializes anything serde can handle into a pretty-printed JSON file.
/// Output is gzip compressed when the path ends with ".gz".
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if the file cannot be created or written
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize + ?Sized>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let file = File::create(out_filename)
        .with_context(|| format!("Error while creating {out_filename:?}:"))?;
    let file: Box<dyn Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(flate2::write::GzEncoder::new(file, flate2::Compression::best()))
    } else {
        Box::new(file)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[derive(serde::Serialize)]
    struct Dummy {
        gene: String,
        position: u64
    }

    #[test]
    fn test_save_json_gz() {
        let filename = std::env::temp_dir().join(format!("framewalk_rows_{}.json.gz", std::process::id()));
        let rows = vec![Dummy { gene: "GENE1".to_string(), position: 100 }];
        save_json(&rows, &filename).unwrap();

        let mut text = String::new();
        flate2::read::MultiGzDecoder::new(File::open(&filename).unwrap())
            .read_to_string(&mut text).unwrap();
        std::fs::remove_file(&filename).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["gene"], "GENE1");
        assert_eq!(value[0]["position"], 100);
    }
}
