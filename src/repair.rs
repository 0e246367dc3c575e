//! File-level image repair
//!
//! Opens the input image, creates the output image and runs the transcoder
//! between them. The output is never overwritten, and a partially written
//! output is removed when the run fails.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use crate::disc::{DiscError, TranscodeOptions, TranscodeReport, Transcoder};

/// Repair the multisession image at `input` into a new file at `output`
///
/// # Arguments
/// * `input` - Existing multisession ISO image
/// * `output` - Path of the image to create; must not exist yet
/// * `options` - Transcoding settings
///
/// # Returns
/// * `Ok(TranscodeReport)` - The output image was written completely
/// * `Err(DiscError)` - Nothing is left at `output` unless it existed beforehand
pub fn repair_image(
    input: &Path,
    output: &Path,
    options: &TranscodeOptions,
) -> Result<TranscodeReport, DiscError> {
    if !input.exists() {
        return Err(DiscError::InputNotFound(input.to_path_buf()));
    }
    if output.exists() {
        return Err(DiscError::OutputExists(output.to_path_buf()));
    }

    let reader = BufReader::new(File::open(input)?);

    // create_new also catches a file that appeared after the check above
    let file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(DiscError::OutputExists(output.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("Repairing {} into {}", input.display(), output.display());

    match transcode_file(reader, file, options) {
        Ok(report) => Ok(report),
        Err(e) => {
            remove_partial_output(output);
            Err(e)
        }
    }
}

fn transcode_file(
    reader: BufReader<File>,
    file: File,
    options: &TranscodeOptions,
) -> Result<TranscodeReport, DiscError> {
    let transcoder = Transcoder::new(reader, BufWriter::new(file), options)?;
    let (report, writer) = transcoder.run()?;
    writer.into_inner().map_err(|e| e.into_error())?;
    Ok(report)
}

fn remove_partial_output(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => log::info!("Removed partial output {}", output.display()),
        Err(e) => log::warn!(
            "Failed to remove partial output {}: {}",
            output.display(),
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::SECTOR_SIZE;
    use std::io::Write;

    fn create_test_image(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("multisession.iso");
        let mut file = File::create(&path).unwrap();

        // Lead-in with session-linking junk
        file.write_all(&vec![0x42u8; 16 * SECTOR_SIZE]).unwrap();

        // PVD pointing at a type L path table in sector 20
        let mut pvd = vec![0u8; SECTOR_SIZE];
        pvd[0] = 1;
        pvd[1..6].copy_from_slice(b"CD001");
        pvd[6] = 1;
        pvd[140..144].copy_from_slice(&20u32.to_le_bytes());
        file.write_all(&pvd).unwrap();

        // Terminator
        let mut terminator = vec![0u8; SECTOR_SIZE];
        terminator[0] = 255;
        terminator[1..6].copy_from_slice(b"CD001");
        terminator[6] = 1;
        file.write_all(&terminator).unwrap();

        file.write_all(b"PATH TABLE").unwrap();
        file.flush().unwrap();

        path
    }

    #[test]
    fn test_repair_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = create_test_image(dir.path());
        let output = dir.path().join("fixed.iso");

        let report = repair_image(&input, &output, &TranscodeOptions::default()).unwrap();
        assert_eq!(report.gap_sectors, 2);

        let original = fs::read(&input).unwrap();
        let repaired = fs::read(&output).unwrap();
        assert_eq!(repaired.len(), 20 * SECTOR_SIZE + b"PATH TABLE".len());
        assert!(repaired[..16 * SECTOR_SIZE].iter().all(|&b| b == 0));
        assert_eq!(
            &repaired[16 * SECTOR_SIZE..18 * SECTOR_SIZE],
            &original[16 * SECTOR_SIZE..18 * SECTOR_SIZE]
        );
        assert!(repaired[18 * SECTOR_SIZE..20 * SECTOR_SIZE]
            .iter()
            .all(|&b| b == 0));
        assert_eq!(&repaired[20 * SECTOR_SIZE..], b"PATH TABLE");
    }

    #[test]
    fn test_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let input = create_test_image(dir.path());
        let output = dir.path().join("taken.iso");
        fs::write(&output, b"keep me").unwrap();

        let result = repair_image(&input, &output, &TranscodeOptions::default());
        assert!(matches!(result, Err(DiscError::OutputExists(_))));
        assert_eq!(fs::read(&output).unwrap(), b"keep me");
    }

    #[test]
    fn test_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("fixed.iso");

        let result = repair_image(
            &dir.path().join("missing.iso"),
            &output,
            &TranscodeOptions::default(),
        );
        assert!(matches!(result, Err(DiscError::InputNotFound(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_partial_output_removed() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("short.iso");
        fs::write(&input, vec![0u8; 17 * SECTOR_SIZE]).unwrap();
        let output = dir.path().join("fixed.iso");

        let result = repair_image(&input, &output, &TranscodeOptions::default());
        assert!(matches!(
            result,
            Err(DiscError::MissingTerminator { sector: 17 })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_partial_output_removed_after_read_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory opens on Unix but fails on the first read
        let input = dir.path().join("not-an-image");
        fs::create_dir(&input).unwrap();
        let output = dir.path().join("fixed.iso");

        let result = repair_image(&input, &output, &TranscodeOptions::default());
        assert!(matches!(result, Err(DiscError::IoError(_))));
        assert!(!output.exists());
    }
}
