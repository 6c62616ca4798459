use jobup_engine::document::DocumentProducer;
use rand::Rng;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const TAG_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Makes the résumé's bytes differ on every run without changing how it
/// renders: the source is copied and a randomized comment line is appended
/// past the trailer. Readers ignore content after `%%EOF`.
pub struct PdfRefresher {
    output: PathBuf,
}

impl PdfRefresher {
    pub fn new(output: PathBuf) -> Self {
        Self { output }
    }
}

impl DocumentProducer for PdfRefresher {
    fn produce(&self, source: &Path) -> io::Result<PathBuf> {
        fs::copy(source, &self.output)?;
        let mut file = fs::OpenOptions::new().append(true).open(&self.output)?;
        writeln!(file)?;
        writeln!(file, "% {}", random_tag())?;
        info!("Saved modified document: {}", self.output.display());
        Ok(self.output.clone())
    }
}

fn random_tag() -> String {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(1..=5);
    (0..len)
        .map(|_| TAG_CHARSET[rng.gen_range(0..TAG_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_keeps_the_document_and_appends_a_trailer() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("resume.pdf");
        let body = b"%PDF-1.4\n1 0 obj\nendobj\n%%EOF\n";
        fs::write(&source, body).unwrap();

        let refresher = PdfRefresher::new(dir.path().join("resume-updated.pdf"));
        let produced = refresher.produce(&source).unwrap();

        assert_ne!(produced, source);
        let bytes = fs::read(&produced).unwrap();
        assert!(bytes.starts_with(body));
        assert!(bytes.len() > body.len());
        let trailer = String::from_utf8_lossy(&bytes[body.len()..]);
        assert!(trailer.trim_start().starts_with('%'));
    }

    #[test]
    fn tags_stay_within_the_hidden_charset() {
        for _ in 0..50 {
            let tag = random_tag();
            assert!((1..=5).contains(&tag.len()));
            assert!(tag.bytes().all(|b| TAG_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn missing_source_is_an_error_for_the_caller_to_absorb() {
        let dir = tempfile::tempdir().unwrap();
        let refresher = PdfRefresher::new(dir.path().join("out.pdf"));
        assert!(refresher.produce(&dir.path().join("nope.pdf")).is_err());
    }
}
